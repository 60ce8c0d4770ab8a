//! Conversation targets (buffers): the server, channels and private queries.
//!
//! Targets live in a [`TargetRegistry`] owned by the session and are
//! addressed by name. Identity is the case-folded name; the display name is
//! what the server last called it.

mod registry;

use std::collections::BTreeMap;
use std::fmt;

use crate::casemap::{irc_eq, irc_to_lower};

pub use self::registry::{resolve, TargetRegistry, SYSTEM_ORIGIN};

/// Tokens in a names reply that describe the listing rather than a member.
pub const NAMES_MARKERS: [&str; 3] = ["=", "@", "*"];

/// Status prefixes a server puts in front of a nick in a names reply.
const STATUS_PREFIXES: [char; 5] = ['~', '&', '@', '%', '+'];

/// Kind of conversation a target represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    /// The server itself; one per session.
    Server,
    /// A channel such as `#rust`.
    Channel,
    /// A private conversation with another user.
    Private,
}

/// A target name with its case-folded identity key.
#[derive(Clone, Debug)]
pub struct TargetName {
    display: String,
    key: String,
}

impl TargetName {
    /// Wrap a display name.
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let key = irc_to_lower(&display);
        TargetName { display, key }
    }

    /// Case-folded identity key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name as the server spelled it.
    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl PartialEq for TargetName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TargetName {}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// A conversation scope and the state accumulated for it.
#[derive(Clone, Debug)]
pub struct Target {
    name: TargetName,
    kind: TargetKind,
    /// Members keyed by folded bare nick; values keep the listed token.
    names: BTreeMap<String, String>,
    names_open: bool,
    topic: Option<String>,
}

impl Target {
    fn new(name: TargetName, kind: TargetKind) -> Self {
        Target {
            name,
            kind,
            names: BTreeMap::new(),
            names_open: false,
            topic: None,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Case-folded identity key.
    pub fn key(&self) -> &str {
        self.name.key()
    }

    /// What kind of conversation this is.
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Last known topic.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub(crate) fn set_topic(&mut self, topic: Option<String>) {
        self.topic = topic;
    }

    /// Members as listed by the server, status prefixes included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }

    /// Whether `nick` (without status prefix) is a member.
    pub fn has_name(&self, nick: &str) -> bool {
        self.names.contains_key(&irc_to_lower(bare_nick(nick)))
    }

    /// Whether a names listing is being accumulated.
    pub fn is_accumulating_names(&self) -> bool {
        self.names_open
    }

    pub(crate) fn add_name(&mut self, token: &str) {
        let bare = bare_nick(token);
        if bare.is_empty() || NAMES_MARKERS.contains(&token) {
            return;
        }
        self.names.insert(irc_to_lower(bare), token.to_owned());
    }

    pub(crate) fn remove_name(&mut self, nick: &str) -> bool {
        self.names.remove(&irc_to_lower(bare_nick(nick))).is_some()
    }

    /// Replace `old` by `new`, keeping the status prefix `old` was listed with.
    pub(crate) fn rename_name(&mut self, old: &str, new: &str) -> bool {
        let Some(token) = self.names.remove(&irc_to_lower(bare_nick(old))) else {
            return false;
        };
        let status_len = token.len() - bare_nick(&token).len();
        let renamed = format!("{}{}", &token[..status_len], new);
        self.names.insert(irc_to_lower(new), renamed);
        true
    }

    fn rekey(&mut self, name: TargetName) {
        self.name = name;
    }

    /// Whether this target is named `name`, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        irc_eq(self.name(), name)
    }
}

/// Strip the membership status prefix from a names token.
pub fn bare_nick(token: &str) -> &str {
    token.trim_start_matches(STATUS_PREFIXES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_name_identity() {
        let a = TargetName::new("#Rust");
        let b = TargetName::new("#rust");
        assert_eq!(a, b);
        assert_eq!(a.key(), "#rust");
        assert_eq!(a.as_str(), "#Rust");
    }

    #[test]
    fn test_names_keyed_by_bare_nick() {
        let mut target = Target::new(TargetName::new("#c"), TargetKind::Channel);
        target.add_name("@Alice");
        target.add_name("bob");
        target.add_name("=");
        assert!(target.has_name("alice"));
        assert!(target.has_name("@ALICE"));
        assert_eq!(target.names().collect::<Vec<_>>(), ["@Alice", "bob"]);
    }

    #[test]
    fn test_rename_keeps_status() {
        let mut target = Target::new(TargetName::new("#c"), TargetKind::Channel);
        target.add_name("+carol");
        assert!(target.rename_name("Carol", "caz"));
        assert_eq!(target.names().collect::<Vec<_>>(), ["+caz"]);
        assert!(!target.rename_name("nobody", "x"));
    }

    #[test]
    fn test_bare_nick() {
        assert_eq!(bare_nick("@+op"), "op");
        assert_eq!(bare_nick("plain"), "plain");
    }
}
