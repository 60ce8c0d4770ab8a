//! IRC message prefix (origin) types.

use std::fmt;

/// The origin of a message: a server or a user.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Prefix {
    /// A server name, e.g. `irc.libera.chat`.
    ServerName(String),
    /// `nick!user@host`. User and host may be empty when the origin was
    /// given as a bare nick.
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix (without its leading `:`).
    ///
    /// A bare token is a nick unless it contains a `.`, which marks a server
    /// name. Never fails; malformed input still yields the best-effort split.
    pub fn new_from_str(s: &str) -> Prefix {
        match s.split_once('!') {
            Some((nick, rest)) => {
                let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
                Prefix::Nickname(nick.to_owned(), user.to_owned(), host.to_owned())
            }
            None => match s.split_once('@') {
                Some((nick, host)) => {
                    Prefix::Nickname(nick.to_owned(), String::new(), host.to_owned())
                }
                None if s.contains('.') => Prefix::ServerName(s.to_owned()),
                None => Prefix::Nickname(s.to_owned(), String::new(), String::new()),
            },
        }
    }

    /// The nick of a user origin, or the server name.
    ///
    /// Target resolution treats both the same way: the part before `!`.
    pub fn nick(&self) -> &str {
        match self {
            Prefix::ServerName(name) => name,
            Prefix::Nickname(nick, _, _) => nick,
        }
    }

    /// Returns true for server origins.
    pub fn is_server(&self) -> bool {
        matches!(self, Prefix::ServerName(_))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::new_from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Prefix;

    #[test]
    fn test_full_user_prefix() {
        let prefix = Prefix::new_from_str("nick!user@host.example");
        assert_eq!(
            prefix,
            Prefix::Nickname("nick".into(), "user".into(), "host.example".into())
        );
        assert_eq!(prefix.nick(), "nick");
        assert_eq!(prefix.to_string(), "nick!user@host.example");
    }

    #[test]
    fn test_server_prefix() {
        let prefix = Prefix::new_from_str("irc.example.net");
        assert!(prefix.is_server());
        assert_eq!(prefix.nick(), "irc.example.net");
    }

    #[test]
    fn test_bare_nick() {
        let prefix = Prefix::new_from_str("alice");
        assert_eq!(prefix.nick(), "alice");
        assert_eq!(prefix.to_string(), "alice");
    }

    #[test]
    fn test_nick_at_host() {
        let prefix = Prefix::new_from_str("alice@host");
        assert_eq!(prefix, Prefix::Nickname("alice".into(), String::new(), "host".into()));
        assert_eq!(prefix.to_string(), "alice@host");
    }
}
