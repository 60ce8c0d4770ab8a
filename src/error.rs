//! Error types for the IRC client session engine.
//!
//! [`SessionError`] is the top-level condition type. Per-line failures
//! ([`SessionError::MalformedLine`], [`SessionError::Decoding`]) never end a
//! session; only transport failures do.

use thiserror::Error;

use crate::session::SessionState;

/// Convenience type alias for Results using [`SessionError`].
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Top-level session errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// `open()` was called before the handshake identity was complete.
    #[error("missing identity: {0} is not set")]
    MissingIdentity(&'static str),

    /// The operation is not valid in the current connection state.
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        /// What was attempted.
        operation: &'static str,
        /// State at the time of the attempt.
        state: SessionState,
    },

    /// A handshake field was changed while a connection is live.
    #[error("{0} cannot change until the session is disconnected")]
    IdentityLocked(&'static str),

    /// An encoding label was not recognised.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// A single line could not be parsed.
    #[error("malformed line: {0}")]
    MalformedLine(#[from] MessageParseError),

    /// A single line could not be converted to text.
    #[error("line is not valid {encoding}")]
    Decoding {
        /// Name of the encoding that rejected the bytes.
        encoding: &'static str,
    },

    /// The framer buffered more than the allowed line length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Bytes buffered without a terminator.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// An outbound command was not delivered.
    #[error("write failed: {0}")]
    Write(#[from] WriteFailure),
}

/// Reasons an outbound command was not delivered.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteFailure {
    /// No connection is attached to the session.
    #[error("no connection attached")]
    NotAttached,

    /// A parameter contains CR, LF or NUL and would split the line.
    #[error("command contains a line break or NUL")]
    LineBreak,

    /// The text cannot be represented in the session encoding.
    #[error("text is not representable in {0}")]
    Unencodable(&'static str),

    /// The connection accepted fewer bytes than were offered.
    #[error("short write: {written} of {expected} bytes")]
    Short {
        /// Bytes accepted.
        written: usize,
        /// Bytes offered.
        expected: usize,
    },

    /// The connection reported an error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when parsing IRC messages.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty after trimming.
    #[error("empty message")]
    EmptyMessage,

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// A numeric command token does not fit a reply code.
    #[error("numeric out of range: {0}")]
    NumericOutOfRange(String),

    /// Parsing error with detailed context information.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Character position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
    },
}
