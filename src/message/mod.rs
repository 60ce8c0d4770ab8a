//! Decoded IRC messages.
//!
//! A [`Message`] is built once from a line and never changes afterwards.
//! Parameters keep wire order and the last one may contain spaces.

mod nom_parser;
mod serialize;

use std::str::FromStr;

use crate::codec::TextCodec;
use crate::error::{MessageParseError, Result};
use crate::prefix::Prefix;

use self::nom_parser::ParsedMessage;
pub(crate) use self::serialize::{write_cmd, write_cmd_freeform};

/// A decoded protocol message.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    #[cfg_attr(feature = "serde", serde(with = "prefix_as_str"))]
    prefix: Option<Prefix>,
    command: String,
    numeric: Option<u32>,
    params: Vec<String>,
}

impl Message {
    /// Build a message from parts.
    ///
    /// The command token is upper-cased; an all-digit token becomes the
    /// numeric code.
    pub fn new<C, I, P>(prefix: Option<Prefix>, command: C, params: I) -> Result<Self, MessageParseError>
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut command = command.into();
        if command.is_empty() || !command.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MessageParseError::InvalidCommand);
        }
        command.make_ascii_uppercase();
        let numeric = numeric_code(&command)?;
        Ok(Message {
            prefix,
            command,
            numeric,
            params: params.into_iter().map(Into::into).collect(),
        })
    }

    /// Parse one trimmed line of text.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }
        let parsed = ParsedMessage::parse(line)?;
        Message::new(
            parsed.prefix.map(Prefix::new_from_str),
            parsed.command,
            parsed.params,
        )
    }

    /// Decode one framed line using the session's text codec.
    ///
    /// Fails with [`SessionError::Decoding`](crate::SessionError::Decoding)
    /// when the bytes are not valid in the codec's encoding and with
    /// [`SessionError::MalformedLine`](crate::SessionError::MalformedLine)
    /// when the text does not follow the wire grammar.
    pub fn decode(line: &[u8], codec: &TextCodec) -> Result<Self> {
        let text = codec.decode(line)?;
        Ok(Message::parse(&text)?)
    }

    /// Origin of the message, if the line carried one.
    pub fn prefix(&self) -> Option<&Prefix> {
        self.prefix.as_ref()
    }

    /// Nick (or server name) of the origin; empty when there is no origin.
    pub fn source_nickname(&self) -> &str {
        self.prefix.as_ref().map_or("", Prefix::nick)
    }

    /// Upper-cased command token, e.g. `PRIVMSG` or `001`.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Numeric reply code, set only when the command token is all digits.
    pub fn numeric(&self) -> Option<u32> {
        self.numeric
    }

    /// All parameters in wire order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Parameter at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Parameter at `index`, or the empty string.
    pub(crate) fn arg_or_empty(&self, index: usize) -> &str {
        self.arg(index).unwrap_or("")
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

fn numeric_code(command: &str) -> Result<Option<u32>, MessageParseError> {
    if !command.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    command
        .parse()
        .map(Some)
        .map_err(|_| MessageParseError::NumericOutOfRange(command.to_owned()))
}

#[cfg(feature = "serde")]
mod prefix_as_str {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::prefix::Prefix;

    pub fn serialize<S: Serializer>(prefix: &Option<Prefix>, s: S) -> Result<S::Ok, S::Error> {
        match prefix {
            Some(p) => s.serialize_some(&p.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Prefix>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().map(Prefix::new_from_str))
    }
}
