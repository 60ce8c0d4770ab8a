//! The byte transport a session writes to.
//!
//! A session never owns sockets. The surrounding application (or the
//! [`transport`](crate::transport) driver) attaches something that implements
//! [`Connection`] and feeds received bytes back through
//! [`Session::on_data`](crate::Session::on_data).

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

/// Outbound half of a transport.
pub trait Connection: Send {
    /// Offer `data` to the transport. Returns how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Begin a graceful shutdown. Completion is reported separately through
    /// [`Session::on_transport_disconnected`](crate::Session::on_transport_disconnected).
    fn shutdown(&mut self) -> io::Result<()>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    sent: Vec<u8>,
    shutdown: bool,
    fail: Option<io::ErrorKind>,
    write_limit: Option<usize>,
}

/// In-memory connection that records everything written to it.
///
/// Clones share the same buffer, so a test can keep one handle and attach
/// the other to a session.
#[derive(Clone, Debug, Default)]
pub struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnection {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Raw bytes written so far.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.lock().sent.clone()
    }

    /// Lines written so far, without terminators, and clear the record.
    pub fn take_lines(&self) -> Vec<String> {
        let sent = std::mem::take(&mut self.lock().sent);
        String::from_utf8_lossy(&sent)
            .split_terminator("\r\n")
            .map(str::to_owned)
            .collect()
    }

    /// Whether [`Connection::shutdown`] was called.
    pub fn is_shut_down(&self) -> bool {
        self.lock().shutdown
    }

    /// Make every following write fail with `kind`.
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.lock().fail = Some(kind);
    }

    /// Accept at most `limit` bytes per write.
    pub fn limit_writes(&self, limit: usize) {
        self.lock().write_limit = Some(limit);
    }
}

impl Connection for MemoryConnection {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if let Some(kind) = state.fail {
            return Err(io::Error::new(kind, "write refused"));
        }
        let n = state.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        state.sent.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.lock().shutdown = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_lines() {
        let conn = MemoryConnection::new();
        let mut attached = conn.clone();
        attached.write(b"NICK a\r\nUSER a 0 * :A\r\n").unwrap();
        assert_eq!(conn.take_lines(), ["NICK a", "USER a 0 * :A"]);
        assert!(conn.take_lines().is_empty());
    }

    #[test]
    fn test_failure_and_limit() {
        let conn = MemoryConnection::new();
        let mut attached = conn.clone();
        conn.limit_writes(3);
        assert_eq!(attached.write(b"PING x").unwrap(), 3);
        conn.fail_writes(io::ErrorKind::BrokenPipe);
        assert_eq!(attached.write(b"x").unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        attached.shutdown().unwrap();
        assert!(conn.is_shut_down());
    }
}
