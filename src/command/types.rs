//! IRC command types.
//!
//! Typed forms of the commands a client sends. Anything else goes through
//! [`Command::Raw`].
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

use crate::ctcp;
use crate::error::MessageParseError;
use crate::message::Message;

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // === Connection Registration ===
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode * :realname`
    USER(String, String, String),
    /// `QUIT [message]`
    QUIT(Option<String>),

    // === Channel Operations ===
    /// `JOIN channels [keys]`
    JOIN(String, Option<String>),
    /// `PART channels [message]`
    PART(String, Option<String>),
    /// `MODE target [modes and arguments]`
    MODE(String, Vec<String>),
    /// `TOPIC channel [topic]`
    TOPIC(String, Option<String>),
    /// `NAMES [channels]`
    NAMES(Option<String>),
    /// `INVITE nickname channel`
    INVITE(String, String),
    /// `KICK channel user [comment]`
    KICK(String, String, Option<String>),

    // === Messaging ===
    /// `PRIVMSG target text`
    PRIVMSG(String, String),
    /// `NOTICE target text`
    NOTICE(String, String),

    // === Miscellaneous ===
    /// `MOTD [target]`
    MOTD(Option<String>),
    /// `PING token`
    PING(String),
    /// `PONG token`
    PONG(String),

    /// Any other command: name and parameters.
    Raw(String, Vec<String>),
}

impl Command {
    /// A CTCP `ACTION` (`/me`) to `target`.
    pub fn action(target: impl Into<String>, text: &str) -> Command {
        Command::PRIVMSG(target.into(), ctcp::encode(&format!("ACTION {}", text)))
    }

    /// A CTCP request such as `VERSION` to `target`.
    pub fn ctcp_request(target: impl Into<String>, payload: &str) -> Command {
        Command::PRIVMSG(target.into(), ctcp::encode(payload))
    }

    /// A CTCP reply to `target`.
    pub fn ctcp_reply(target: impl Into<String>, payload: &str) -> Command {
        Command::NOTICE(target.into(), ctcp::encode(payload))
    }

    /// The command word as sent on the wire.
    pub fn name(&self) -> &str {
        match self {
            Command::PASS(_) => "PASS",
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::QUIT(_) => "QUIT",
            Command::JOIN(..) => "JOIN",
            Command::PART(..) => "PART",
            Command::MODE(..) => "MODE",
            Command::TOPIC(..) => "TOPIC",
            Command::NAMES(_) => "NAMES",
            Command::INVITE(..) => "INVITE",
            Command::KICK(..) => "KICK",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
            Command::MOTD(_) => "MOTD",
            Command::PING(_) => "PING",
            Command::PONG(_) => "PONG",
            Command::Raw(name, _) => name.as_str(),
        }
    }

    /// Parameters in wire order.
    pub fn params(&self) -> Vec<&str> {
        fn with_opt<'a>(mut head: Vec<&'a str>, tail: &'a Option<String>) -> Vec<&'a str> {
            head.extend(tail.as_deref());
            head
        }

        match self {
            Command::PASS(p) | Command::NICK(p) | Command::PING(p) | Command::PONG(p) => {
                vec![p.as_str()]
            }
            Command::USER(user, mode, real) => vec![user.as_str(), mode.as_str(), "*", real.as_str()],
            Command::QUIT(msg) | Command::NAMES(msg) | Command::MOTD(msg) => with_opt(vec![], msg),
            Command::JOIN(chan, opt) | Command::PART(chan, opt) | Command::TOPIC(chan, opt) => {
                with_opt(vec![chan.as_str()], opt)
            }
            Command::MODE(target, args) => {
                let mut params = vec![target.as_str()];
                params.extend(args.iter().map(String::as_str));
                params
            }
            Command::INVITE(a, b) | Command::PRIVMSG(a, b) | Command::NOTICE(a, b) => {
                vec![a.as_str(), b.as_str()]
            }
            Command::KICK(chan, nick, reason) => with_opt(vec![chan.as_str(), nick.as_str()], reason),
            Command::Raw(_, args) => args.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the last parameter is always written as a trailing (`:`) one.
    pub(crate) fn has_freeform_trailing(&self) -> bool {
        matches!(
            self,
            Command::USER(..)
                | Command::PRIVMSG(..)
                | Command::NOTICE(..)
                | Command::QUIT(Some(_))
                | Command::PART(_, Some(_))
                | Command::TOPIC(_, Some(_))
                | Command::KICK(_, _, Some(_))
        )
    }

    /// Build the unprefixed message this command puts on the wire.
    pub fn to_message(&self) -> Result<Message, MessageParseError> {
        Message::new(None, self.name(), self.params())
    }
}
