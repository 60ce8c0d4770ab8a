//! Connection identity and settings.

/// Default plain-text IRC port.
pub const DEFAULT_PORT: u16 = 6667;

/// Everything a session needs to connect and register.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Desired nickname.
    pub nickname: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Server password, if required.
    pub password: Option<String>,
    /// Encoding label such as `utf-8` or `iso-8859-15`; `None` auto-detects.
    pub encoding: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            host: String::new(),
            port: DEFAULT_PORT,
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            password: None,
            encoding: None,
        }
    }
}

impl SessionConfig {
    /// Config for `host` on the default port.
    pub fn new(host: impl Into<String>) -> Self {
        SessionConfig {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set nick, username and real name in one go.
    pub fn with_identity(
        mut self,
        nickname: impl Into<String>,
        username: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        self.nickname = nickname.into();
        self.username = username.into();
        self.realname = realname.into();
        self
    }

    /// First identity field the handshake needs that is still empty.
    pub(crate) fn missing_identity(&self) -> Option<&'static str> {
        if self.nickname.is_empty() {
            Some("nickname")
        } else if self.username.is_empty() {
            Some("username")
        } else if self.realname.is_empty() {
            Some("realname")
        } else {
            None
        }
    }
}
