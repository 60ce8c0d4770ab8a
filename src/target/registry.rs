//! Arena of targets keyed by case-folded name.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use super::{Target, TargetKind, TargetName, NAMES_MARKERS};
use crate::casemap::{irc_eq, irc_to_lower};
use crate::chan::ChannelExt;
use crate::event::{Event, EventBus};

/// Origin token servers use for messages sent before registration.
pub const SYSTEM_ORIGIN: &str = "AUTH";

/// Work out which conversation a message belongs to.
///
/// `me` is the session's own nick and `host` the server host. Wildcard
/// tokens address the local identity; a token naming the local identity is
/// answered in the other party's conversation; empty or system tokens land
/// on the server target. Every comparison ignores case.
pub fn resolve(me: &str, host: &str, origin: &str, token: &str) -> TargetName {
    let mut effective = token;
    if effective.contains(['*', '?']) {
        effective = me;
    }
    if irc_eq(effective, me) {
        effective = if irc_eq(origin, me) { host } else { origin };
    }
    if effective.is_empty() || irc_eq(effective, SYSTEM_ORIGIN) {
        effective = host;
    }
    TargetName::new(effective)
}

/// Owns every known target of a session.
///
/// Lookups take any spelling of a name. Iteration follows creation order.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: HashMap<String, Target>,
    order: Vec<String>,
    server: Option<String>,
}

impl TargetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a target by any spelling of its name.
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.get(&irc_to_lower(name))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Target> {
        self.targets.get_mut(&irc_to_lower(name))
    }

    /// Whether a target with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The server target, once the handshake has been sent.
    pub fn server(&self) -> Option<&Target> {
        self.server.as_ref().and_then(|key| self.targets.get(key))
    }

    /// All targets in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.order.iter().filter_map(|key| self.targets.get(key))
    }

    /// Number of known targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are known.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Kind a target of this name has, or would have if created now.
    pub fn kind_of(&self, name: &TargetName) -> TargetKind {
        if let Some(target) = self.targets.get(name.key()) {
            return target.kind();
        }
        if self.server.as_deref() == Some(name.key()) {
            TargetKind::Server
        } else if name.as_str().is_channel_name() {
            TargetKind::Channel
        } else {
            TargetKind::Private
        }
    }

    /// Return the target called `name`, creating it on first sight.
    pub fn ensure(&mut self, name: &TargetName, kind: TargetKind, events: &mut EventBus) -> &mut Target {
        match self.targets.entry(name.key().to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(name = name.as_str(), ?kind, "target added");
                if kind == TargetKind::Server {
                    self.server = Some(entry.key().clone());
                }
                self.order.push(entry.key().clone());
                events.emit(Event::TargetAdded {
                    target: name.as_str().to_owned(),
                    kind,
                });
                entry.insert(Target::new(name.clone(), kind))
            }
        }
    }

    /// Create the server target for `host`, re-keying an existing one whose
    /// host changed since the last connection.
    pub fn ensure_server(&mut self, host: &str, events: &mut EventBus) {
        let name = TargetName::new(host);
        match self.server.clone() {
            Some(key) if key == name.key() => {
                self.rename(host, host, events);
            }
            Some(key) => {
                self.rekey(&key, name, events);
            }
            None => {
                self.ensure(&name, TargetKind::Server, events);
            }
        }
    }

    /// Forget a target. Unknown names are ignored.
    ///
    /// The server target is never removed here; it lives until [`clear`].
    ///
    /// [`clear`]: TargetRegistry::clear
    pub fn remove(&mut self, name: &str, events: &mut EventBus) -> Option<Target> {
        let key = irc_to_lower(name);
        if self.server.as_deref() == Some(key.as_str()) {
            debug!(name, "refusing to remove the server target");
            return None;
        }
        self.remove_key(&key, events)
    }

    fn remove_key(&mut self, key: &str, events: &mut EventBus) -> Option<Target> {
        let target = self.targets.remove(key)?;
        self.order.retain(|k| k != key);
        if self.server.as_deref() == Some(key) {
            self.server = None;
        }
        debug!(name = target.name(), "target removed");
        events.emit(Event::TargetRemoved {
            target: target.name().to_owned(),
        });
        Some(target)
    }

    /// Change the display text of a target without changing its identity.
    ///
    /// `display` must fold to the same key; anything else is a re-key and
    /// is ignored here.
    pub fn rename(&mut self, name: &str, display: &str, events: &mut EventBus) -> bool {
        let new_name = TargetName::new(display);
        let Some(target) = self.targets.get_mut(&irc_to_lower(name)) else {
            return false;
        };
        if target.key() != new_name.key() || target.name() == display {
            return false;
        }
        let old = target.name().to_owned();
        target.rekey(new_name);
        events.emit(Event::TargetRenamed {
            old,
            new: display.to_owned(),
        });
        true
    }

    /// Move a target to a new identity, e.g. a query partner changing nick.
    ///
    /// Refuses when a target already owns the new name.
    pub fn rekey(&mut self, name: &str, new_name: TargetName, events: &mut EventBus) -> bool {
        let old_key = irc_to_lower(name);
        if old_key == new_name.key() {
            return self.rename(name, new_name.as_str(), events);
        }
        if self.targets.contains_key(new_name.key()) {
            return false;
        }
        let Some(mut target) = self.targets.remove(&old_key) else {
            return false;
        };
        let old = target.name().to_owned();
        let new_key = new_name.key().to_owned();
        target.rekey(new_name);
        for key in self.order.iter_mut().filter(|k| **k == old_key) {
            key.clone_from(&new_key);
        }
        if self.server.as_deref() == Some(old_key.as_str()) {
            self.server = Some(new_key.clone());
        }
        debug!(old = old.as_str(), new = target.name(), "target re-keyed");
        events.emit(Event::TargetRenamed {
            old,
            new: target.name().to_owned(),
        });
        self.targets.insert(new_key, target);
        true
    }

    /// Start a fresh names listing for a target.
    pub fn begin_names(&mut self, name: &str) {
        if let Some(target) = self.get_mut(name) {
            target.names.clear();
            target.names_open = true;
        }
    }

    /// Add whitespace-separated tokens of a names reply, skipping markers.
    pub fn add_names<'a, I>(&mut self, name: &str, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(target) = self.get_mut(name) else {
            return;
        };
        for token in tokens {
            if !NAMES_MARKERS.contains(&token) {
                target.add_name(token);
            }
        }
    }

    /// Close the listing and publish the accumulated set.
    ///
    /// The set stays on the target until the next [`begin_names`](Self::begin_names).
    pub fn end_names(&mut self, name: &str, events: &mut EventBus) {
        let Some(target) = self.get_mut(name) else {
            return;
        };
        target.names_open = false;
        let names = target.names().map(str::to_owned).collect();
        events.emit(Event::NamesReceived {
            target: target.name().to_owned(),
            names,
        });
    }

    /// Names of targets whose member set holds `nick`, in creation order.
    pub fn targets_with_member(&self, nick: &str) -> Vec<String> {
        self.iter()
            .filter(|t| t.has_name(nick))
            .map(|t| t.name().to_owned())
            .collect()
    }

    /// Replace `old` by `new` in every member set; returns affected targets.
    pub(crate) fn rename_member(&mut self, old: &str, new: &str) -> Vec<String> {
        let affected = self.targets_with_member(old);
        for name in &affected {
            if let Some(target) = self.get_mut(name) {
                target.rename_name(old, new);
            }
        }
        affected
    }

    /// Drop `nick` from every member set; returns affected targets.
    pub(crate) fn remove_member(&mut self, nick: &str) -> Vec<String> {
        let affected = self.targets_with_member(nick);
        for name in &affected {
            if let Some(target) = self.get_mut(name) {
                target.remove_name(nick);
            }
        }
        affected
    }

    /// Remove every target, the server target last.
    pub fn clear(&mut self, events: &mut EventBus) {
        let server = self.server.clone();
        let keys: Vec<String> = self
            .order
            .iter()
            .filter(|k| Some(*k) != server.as_ref())
            .cloned()
            .collect();
        for key in keys.iter().chain(server.iter()) {
            self.remove_key(key, events);
        }
    }
}
