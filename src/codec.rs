//! Text encoding for inbound lines and outbound commands.
//!
//! A session either uses one fixed encoding in both directions or
//! auto-detects per line: a line that is valid UTF-8 is taken as UTF-8,
//! anything else is decoded with a fallback derived from the process locale.
//! Decoding is strict in every mode. Bytes that the chosen encoding cannot
//! map are reported as [`SessionError::Decoding`] rather than replaced.

use std::borrow::Cow;

use encoding::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::{Result, SessionError, WriteFailure};

/// Converts between wire bytes and text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextCodec {
    /// Use this encoding for every line in both directions.
    Fixed(&'static Encoding),
    /// UTF-8 when the line decodes as UTF-8, `fallback` otherwise.
    /// Outbound text is always UTF-8.
    Auto {
        /// Encoding for lines that are not valid UTF-8.
        fallback: &'static Encoding,
    },
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::auto()
    }
}

impl TextCodec {
    /// Auto-detection with the locale-derived fallback.
    pub fn auto() -> Self {
        Self::Auto {
            fallback: locale_fallback(),
        }
    }

    /// A fixed codec for a WHATWG encoding label such as `"utf-8"` or
    /// `"iso-8859-15"`.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self::Fixed)
            .ok_or_else(|| SessionError::UnknownEncoding(label.to_owned()))
    }

    /// `None` selects auto-detection.
    pub fn from_label(label: Option<&str>) -> Result<Self> {
        match label {
            Some(label) => Self::for_label(label),
            None => Ok(Self::auto()),
        }
    }

    /// Name of the encoding used for outbound text.
    pub fn name(&self) -> &'static str {
        self.output_encoding().name()
    }

    fn output_encoding(&self) -> &'static Encoding {
        match self {
            Self::Fixed(encoding) => encoding.output_encoding(),
            Self::Auto { .. } => UTF_8,
        }
    }

    /// Decode one line.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        let encoding = match self {
            Self::Fixed(encoding) => *encoding,
            Self::Auto { fallback } => match std::str::from_utf8(bytes) {
                Ok(text) => return Ok(Cow::Borrowed(text)),
                Err(_) => *fallback,
            },
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(SessionError::Decoding {
                encoding: encoding.name(),
            })
    }

    /// Encode outbound text.
    pub fn encode<'a>(&self, text: &'a str) -> Result<Cow<'a, [u8]>, WriteFailure> {
        let (bytes, used, had_errors) = self.output_encoding().encode(text);
        if had_errors {
            return Err(WriteFailure::Unencodable(used.name()));
        }
        Ok(bytes)
    }
}

/// Fallback encoding named by the locale environment (`LC_ALL`, `LC_CTYPE`,
/// `LANG`, first one set wins), e.g. `de_DE.ISO-8859-15@euro`.
///
/// A locale without a charset, or one naming UTF-8, falls back to
/// windows-1252 since UTF-8 has already been tried by then.
pub fn locale_fallback() -> &'static Encoding {
    let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty());

    locale
        .as_deref()
        .and_then(charset_of_locale)
        .filter(|encoding| *encoding != UTF_8)
        .unwrap_or(WINDOWS_1252)
}

fn charset_of_locale(locale: &str) -> Option<&'static Encoding> {
    let (_, charset) = locale.split_once('.')?;
    let charset = charset.split('@').next().unwrap_or(charset);
    Encoding::for_label(charset.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding::{ISO_8859_15, SHIFT_JIS};

    #[test]
    fn test_auto_prefers_utf8() {
        let codec = TextCodec::Auto { fallback: WINDOWS_1252 };
        assert_eq!(codec.decode("héllo".as_bytes()).unwrap(), "héllo");
    }

    #[test]
    fn test_auto_falls_back() {
        let codec = TextCodec::Auto { fallback: WINDOWS_1252 };
        // "héllo" in latin-1 is not valid UTF-8
        assert_eq!(codec.decode(b"h\xe9llo").unwrap(), "héllo");
    }

    #[test]
    fn test_fixed_rejects_invalid_bytes() {
        let codec = TextCodec::Fixed(UTF_8);
        let err = codec.decode(b"h\xe9llo").unwrap_err();
        assert!(matches!(err, SessionError::Decoding { encoding: "UTF-8" }));
    }

    #[test]
    fn test_fixed_multibyte() {
        let codec = TextCodec::Fixed(SHIFT_JIS);
        let (bytes, _, _) = SHIFT_JIS.encode("日本");
        assert_eq!(codec.decode(&bytes).unwrap(), "日本");
        assert_eq!(codec.encode("日本").unwrap(), bytes);
    }

    #[test]
    fn test_encode_unrepresentable() {
        let codec = TextCodec::Fixed(ISO_8859_15);
        assert!(matches!(
            codec.encode("日本"),
            Err(WriteFailure::Unencodable("ISO-8859-15"))
        ));
    }

    #[test]
    fn test_for_label() {
        assert_eq!(TextCodec::for_label("latin1").unwrap(), TextCodec::Fixed(WINDOWS_1252));
        assert!(matches!(
            TextCodec::for_label("klingon"),
            Err(SessionError::UnknownEncoding(_))
        ));
        assert!(matches!(TextCodec::from_label(None).unwrap(), TextCodec::Auto { .. }));
    }

    #[test]
    fn test_charset_of_locale() {
        assert_eq!(charset_of_locale("de_DE.ISO-8859-15@euro"), Some(ISO_8859_15));
        assert_eq!(charset_of_locale("en_US.UTF-8"), Some(UTF_8));
        assert_eq!(charset_of_locale("C"), None);
    }

    #[test]
    fn test_auto_outputs_utf8() {
        let codec = TextCodec::Auto { fallback: WINDOWS_1252 };
        assert_eq!(codec.name(), "UTF-8");
        assert_eq!(codec.encode("é").unwrap(), "é".as_bytes());
    }
}
