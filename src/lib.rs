//! # slirc-client
//!
//! A sans-IO IRC client session engine: it turns a byte stream from an IRC
//! server into an ordered stream of events, and commands from the
//! application into wire lines.
//!
//! ## Features
//!
//! - Chunk-boundary independent line framing with a length cap
//! - Strict per-line text decoding with a configurable or locale-derived encoding
//! - Target (buffer) tracking for the server, channels and private queries
//! - Connection lifecycle with the `PASS`/`NICK`/`USER` handshake
//! - Dispatch of PING, numerics, membership changes, topics and CTCP
//! - Optional Tokio driver for TCP and TLS connections

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```rust
//! use slirc_client::{Command, Event, MemoryConnection, Session, SessionConfig};
//!
//! let config = SessionConfig::new("irc.example.net").with_identity("ferris", "ferris", "Ferris");
//! let mut session = Session::with_config(config).unwrap();
//! let wire = MemoryConnection::new();
//! session.attach_connection(Box::new(wire.clone()));
//!
//! session.open().unwrap();
//! session.on_transport_connected().unwrap();
//! session.on_data(b":irc.example.net 001 ferris :Welcome\r\n:ferris!f@h JOIN #rust\r\n");
//! session.send(&Command::PRIVMSG("#rust".into(), "hello".into())).unwrap();
//!
//! assert!(session.target("#Rust").is_some());
//! for event in session.drain_events() {
//!     if let Event::Joined { target, actor } = event {
//!         println!("{actor} joined {target}");
//!     }
//! }
//! ```

pub mod casemap;
pub mod chan;
pub mod codec;
pub mod command;
pub mod connection;
pub mod ctcp;
pub mod error;
pub mod event;
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;
pub mod session;
pub mod target;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod transport;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::codec::TextCodec;
pub use self::command::Command;
pub use self::connection::{Connection, MemoryConnection};
pub use self::ctcp::Ctcp;
pub use self::error::{MessageParseError, Result, SessionError, WriteFailure};
pub use self::event::{Event, EventBus};
pub use self::line::{LineFramer, MAX_IRC_LINE_LEN};
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::response::Response;
pub use self::session::{Session, SessionConfig, SessionState};
pub use self::target::{Target, TargetKind, TargetName, TargetRegistry};
#[cfg(feature = "tokio")]
pub use self::transport::{SessionHandle, Tls};
