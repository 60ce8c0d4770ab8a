//! The session engine: lifecycle, inbound processing and outbound writes.
//!
//! A [`Session`] is sans-IO. It owns the framing buffer, the target
//! registry and the event queue, and talks to the network only through an
//! attached [`Connection`]. The caller reports transport progress with the
//! `on_transport_*` methods and hands over received bytes with
//! [`Session::on_data`]; everything the session learns comes back as
//! [`Event`]s.
//!
//! # Example
//!
//! ```
//! use slirc_client::{Event, MemoryConnection, Session, SessionConfig};
//!
//! let config = SessionConfig::new("irc.example.net").with_identity("ferris", "ferris", "Ferris");
//! let mut session = Session::with_config(config).unwrap();
//! let wire = MemoryConnection::new();
//! session.attach_connection(Box::new(wire.clone()));
//!
//! session.open().unwrap();
//! session.on_transport_connected().unwrap();
//! assert_eq!(wire.take_lines(), ["NICK ferris", "USER ferris 0 * :Ferris"]);
//!
//! session.on_data(b":irc.example.net 001 ferris :Welcome\r\n");
//! assert!(session.drain_events().any(|e| e == Event::Connected));
//! ```

mod config;
mod dispatch;
mod state;

use std::collections::vec_deque::Drain;
use std::io;

use tracing::{debug, trace, warn};

pub use self::config::{SessionConfig, DEFAULT_PORT};
pub use self::state::SessionState;
use crate::codec::TextCodec;
use crate::command::Command;
use crate::connection::Connection;
use crate::error::{Result, SessionError, WriteFailure};
use crate::event::{Event, EventBus};
use crate::line::LineFramer;
use crate::message::Message;
use crate::target::{Target, TargetRegistry};

/// One IRC connection's worth of client state.
pub struct Session {
    config: SessionConfig,
    codec: TextCodec,
    state: SessionState,
    /// Nick the server currently knows us by.
    nick: String,
    handshake_sent: bool,
    framer: LineFramer,
    registry: TargetRegistry,
    events: EventBus,
    motd: String,
    connection: Option<Box<dyn Connection>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("nick", &self.nick)
            .field("state", &self.state)
            .field("targets", &self.registry.len())
            .field("attached", &self.connection.is_some())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A disconnected session with an empty identity.
    pub fn new() -> Self {
        Session {
            config: SessionConfig::default(),
            codec: TextCodec::auto(),
            state: SessionState::Disconnected,
            nick: String::new(),
            handshake_sent: false,
            framer: LineFramer::new(),
            registry: TargetRegistry::new(),
            events: EventBus::new(),
            motd: String::new(),
            connection: None,
        }
    }

    /// A disconnected session using `config`.
    ///
    /// Fails with [`SessionError::UnknownEncoding`] for an unrecognised
    /// encoding label.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        let codec = TextCodec::from_label(config.encoding.as_deref())?;
        Ok(Session {
            nick: config.nickname.clone(),
            codec,
            config,
            ..Self::new()
        })
    }

    /// Current settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Server host.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Server port.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Nick the server knows us by, or the configured one before registration.
    pub fn nickname(&self) -> &str {
        &self.nick
    }

    /// Username (ident).
    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// Real name.
    pub fn realname(&self) -> &str {
        &self.config.realname
    }

    /// Codec used for inbound and outbound text.
    pub fn codec(&self) -> &TextCodec {
        &self.codec
    }

    fn check_unlocked(&self, field: &'static str) -> Result<()> {
        if self.state.is_live() {
            warn!("refusing to change {} while {:?}", field, self.state);
            return Err(SessionError::IdentityLocked(field));
        }
        Ok(())
    }

    /// Change the server host. Only while disconnected.
    pub fn set_host(&mut self, host: impl Into<String>) -> Result<()> {
        self.check_unlocked("host")?;
        self.config.host = host.into();
        Ok(())
    }

    /// Change the server port. Only while disconnected.
    pub fn set_port(&mut self, port: u16) -> Result<()> {
        self.check_unlocked("port")?;
        self.config.port = port;
        Ok(())
    }

    /// Change the username. Only while disconnected.
    pub fn set_username(&mut self, username: impl Into<String>) -> Result<()> {
        self.check_unlocked("username")?;
        self.config.username = username.into();
        Ok(())
    }

    /// Change the real name. Only while disconnected.
    pub fn set_realname(&mut self, realname: impl Into<String>) -> Result<()> {
        self.check_unlocked("realname")?;
        self.config.realname = realname.into();
        Ok(())
    }

    /// Change the server password. Only while disconnected.
    pub fn set_password(&mut self, password: Option<String>) -> Result<()> {
        self.check_unlocked("password")?;
        self.config.password = password;
        Ok(())
    }

    /// Change nick.
    ///
    /// Before the handshake this just updates the identity. Afterwards a
    /// `NICK` command is sent and the server's reply performs the rename.
    pub fn set_nickname(&mut self, nickname: impl Into<String>) -> Result<()> {
        let nickname = nickname.into();
        if self.handshake_sent {
            self.send(&Command::NICK(nickname.clone()))?;
        } else {
            self.nick.clone_from(&nickname);
        }
        self.config.nickname = nickname;
        Ok(())
    }

    /// Switch text encoding; `None` auto-detects. Takes effect on the next line.
    pub fn set_encoding(&mut self, label: Option<&str>) -> Result<()> {
        self.codec = TextCodec::from_label(label)?;
        self.config.encoding = label.map(str::to_owned);
        Ok(())
    }

    /// Hand the session a transport to write to, replacing any previous one.
    pub fn attach_connection(&mut self, connection: Box<dyn Connection>) {
        if self.connection.is_some() {
            debug!("replacing attached connection");
        }
        self.framer.clear();
        self.connection = Some(connection);
    }

    /// Whether a connection is attached.
    pub fn is_attached(&self) -> bool {
        self.connection.is_some()
    }

    fn set_state(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!("ignoring transition {:?} -> {:?}", self.state, next);
            return false;
        }
        debug!("session {:?} -> {:?}", self.state, next);
        self.state = next;
        true
    }

    /// Start connecting.
    ///
    /// Requires nick, username and real name. The handshake goes out once
    /// the transport reports readiness via
    /// [`on_transport_connected`](Self::on_transport_connected).
    pub fn open(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::InvalidState {
                operation: "open",
                state: self.state,
            });
        }
        if let Some(field) = self.config.missing_identity() {
            return Err(SessionError::MissingIdentity(field));
        }
        self.nick = self.config.nickname.clone();
        self.handshake_sent = false;
        self.set_state(SessionState::Connecting);
        self.events.emit(Event::Connecting);
        Ok(())
    }

    /// The transport is up: send `PASS`, `NICK` and `USER`, then create the
    /// server target.
    ///
    /// Ignored unless the session is connecting, e.g. after an early `close()`.
    pub fn on_transport_connected(&mut self) -> Result<()> {
        if self.state != SessionState::Connecting || self.handshake_sent {
            debug!("transport ready while {:?}; no handshake", self.state);
            return Ok(());
        }
        if let Some(password) = self.config.password.clone() {
            self.send(&Command::PASS(password))?;
        }
        self.send(&Command::NICK(self.config.nickname.clone()))?;
        self.send(&Command::USER(
            self.config.username.clone(),
            "0".to_owned(),
            self.config.realname.clone(),
        ))?;
        self.handshake_sent = true;
        self.registry.ensure_server(&self.config.host, &mut self.events);
        Ok(())
    }

    /// Feed bytes received from the transport.
    ///
    /// Complete lines are decoded and dispatched in order. Lines that fail
    /// to frame, decode or parse are skipped with an
    /// [`Event::LineRejected`]; the stream continues.
    pub fn on_data(&mut self, chunk: &[u8]) {
        self.framer.push(chunk);
        loop {
            match self.framer.next_line() {
                Ok(Some(line)) => self.handle_line(&line),
                Ok(None) => break,
                Err(e) => self.reject_line(e),
            }
        }
    }

    /// Decode and dispatch one line without a terminator.
    pub fn handle_line(&mut self, line: &[u8]) {
        trace!("<- {}", String::from_utf8_lossy(line));
        match Message::decode(line, &self.codec) {
            Ok(message) => self.dispatch(message),
            Err(e) => self.reject_line(e),
        }
    }

    fn reject_line(&mut self, error: SessionError) {
        warn!("dropping inbound line: {}", error);
        self.events.emit(Event::LineRejected {
            reason: error.to_string(),
        });
    }

    /// Ask the transport to shut down. Completion arrives through
    /// [`on_transport_disconnected`](Self::on_transport_disconnected).
    ///
    /// Without an attached connection the session is disconnected at once.
    pub fn close(&mut self) -> Result<()> {
        if matches!(
            self.state,
            SessionState::Disconnected | SessionState::Disconnecting
        ) {
            return Ok(());
        }
        self.set_state(SessionState::Disconnecting);
        match self.connection.as_mut().map(|c| c.shutdown()) {
            Some(Ok(())) => {}
            Some(Err(e)) => self.on_transport_error(e),
            None => self.finish_disconnect(None),
        }
        Ok(())
    }

    /// The transport is gone.
    pub fn on_transport_disconnected(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        self.finish_disconnect(None);
    }

    /// The transport failed. Ends the connection; nothing is retried.
    pub fn on_transport_error(&mut self, error: io::Error) {
        warn!("transport error: {}", error);
        if self.state == SessionState::Disconnected {
            return;
        }
        self.finish_disconnect(Some(error.to_string()));
    }

    fn finish_disconnect(&mut self, reason: Option<String>) {
        self.set_state(SessionState::Disconnected);
        self.connection = None;
        self.handshake_sent = false;
        self.framer.clear();
        self.motd.clear();
        self.events.emit(Event::Disconnected { reason });
    }

    /// Drop the connection and every target, the server target last.
    pub fn teardown(&mut self) {
        if self.state.is_live() {
            self.finish_disconnect(None);
        }
        self.registry.clear(&mut self.events);
    }

    /// Write one command to the attached connection.
    pub fn send(&mut self, command: &Command) -> Result<(), WriteFailure> {
        self.send_line(&command.to_string())
    }

    /// Write one already serialized line, without terminator.
    pub fn send_line(&mut self, line: &str) -> Result<(), WriteFailure> {
        let result = self.write_line(line);
        if let Err(e) = &result {
            warn!("failed to send {:?}: {}", line, e);
        }
        result
    }

    fn write_line(&mut self, line: &str) -> Result<(), WriteFailure> {
        if line.contains(['\r', '\n', '\0']) {
            return Err(WriteFailure::LineBreak);
        }
        let connection = self.connection.as_mut().ok_or(WriteFailure::NotAttached)?;
        let mut bytes = self.codec.encode(line)?.into_owned();
        bytes.extend_from_slice(b"\r\n");
        trace!("-> {}", line);
        let written = connection.write(&bytes)?;
        if written != bytes.len() {
            return Err(WriteFailure::Short {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }

    /// Take all queued events, oldest first.
    ///
    /// Only events emitted while no subscriber was open are queued.
    pub fn drain_events(&mut self) -> Drain<'_, Event> {
        self.events.drain()
    }

    /// Receive every event emitted from now on.
    ///
    /// While a receiver is open nothing accumulates in the
    /// [`drain_events`](Session::drain_events) queue.
    #[cfg(feature = "tokio")]
    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<Event> {
        self.events.subscribe()
    }

    /// Known targets.
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Look up a target by any spelling of its name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.registry.get(name)
    }

    /// The server target, once the handshake was sent.
    pub fn server_target(&self) -> Option<&Target> {
        self.registry.server()
    }

    /// All targets in creation order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.registry.iter()
    }
}
