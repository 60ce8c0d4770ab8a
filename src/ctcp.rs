//! CTCP payload detection.
//!
//! A PRIVMSG or NOTICE whose text starts and ends with `\x01` carries a
//! CTCP payload instead of chat text. `ACTION` payloads are `/me` messages
//! and belong to the conversation; anything else is a request (PRIVMSG) or
//! a reply (NOTICE) addressed to the client itself.

/// Delimiter around a CTCP payload.
pub const CTCP_DELIM: char = '\x01';

const ACTION: &str = "ACTION";

/// A CTCP payload borrowed from message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    payload: &'a str,
}

impl<'a> Ctcp<'a> {
    /// Returns the payload if `text` is bounded by the delimiter at both ends.
    pub fn parse(text: &'a str) -> Option<Self> {
        let payload = text.strip_prefix(CTCP_DELIM)?.strip_suffix(CTCP_DELIM)?;
        Some(Ctcp { payload })
    }

    /// Everything between the delimiters.
    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// The CTCP command word, e.g. `VERSION`.
    pub fn command(&self) -> &'a str {
        self.payload.split(' ').next().unwrap_or("")
    }

    /// Action text when the payload is an `ACTION`.
    pub fn action(&self) -> Option<&'a str> {
        let rest = self.payload.strip_prefix(ACTION)?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix(' ')
        }
    }
}

/// Wrap a payload in CTCP delimiters.
pub fn encode(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len() + 2);
    out.push(CTCP_DELIM);
    out.push_str(payload);
    out.push(CTCP_DELIM);
    out
}
