//! Tokio driver: owns a [`Session`] in one task and runs it over TCP or TLS.
//!
//! The session is opened by the caller, then handed to [`connect`]. The
//! spawned task connects, attaches a queue-backed [`Connection`], sends the
//! handshake and feeds everything it reads into the session. Outbound bytes
//! go through a bounded queue drained by a separate writer task; a full
//! queue is reported as a write failure instead of buffering without limit.
//!
//! While the task owns the session, events reach the application only
//! through [`Session::subscribe`] receivers (taken before `connect`) or
//! [`SessionHandle::subscribe`].

use std::io;
use std::time::Duration;

use anyhow::Context;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TrySendError, UnboundedReceiver};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::command::Command;
use crate::connection::Connection;
use crate::error::WriteFailure;
use crate::event::Event;
use crate::line::MAX_IRC_LINE_LEN;
use crate::session::{Session, SessionState};

/// Outbound lines that may wait for the socket before writes start failing.
pub const WRITE_QUEUE_LEN: usize = 256;

const KEEPALIVE_TIME: Duration = Duration::from_secs(120);
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// TLS settings for [`connect`].
#[derive(Clone)]
pub struct Tls {
    /// Configured rustls connector.
    pub connector: TlsConnector,
    /// Name to verify the server certificate against.
    pub server_name: ServerName<'static>,
}

impl std::fmt::Debug for Tls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tls")
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

enum Request {
    Send(Command, oneshot::Sender<Result<(), WriteFailure>>),
    Subscribe(oneshot::Sender<UnboundedReceiver<Event>>),
    Close,
}

/// Cheap, cloneable access to a session owned by a driver task.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<Request>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Send(cmd, _) => f.debug_tuple("Send").field(cmd).finish(),
            Request::Subscribe(_) => f.write_str("Subscribe"),
            Request::Close => f.write_str("Close"),
        }
    }
}

impl SessionHandle {
    /// Send a command through the session's writer.
    pub async fn send(&self, command: Command) -> Result<(), WriteFailure> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(Request::Send(command, tx))
            .map_err(|_| WriteFailure::NotAttached)?;
        rx.await.unwrap_or(Err(WriteFailure::NotAttached))
    }

    /// Receive every event emitted from now on.
    ///
    /// Returns `None` once the driver task has finished.
    pub async fn subscribe(&self) -> Option<UnboundedReceiver<Event>> {
        let (tx, rx) = oneshot::channel();
        self.requests.send(Request::Subscribe(tx)).ok()?;
        rx.await.ok()
    }

    /// Ask the session to shut the connection down.
    pub fn close(&self) {
        if self.requests.send(Request::Close).is_err() {
            debug!("close requested after the driver finished");
        }
    }

    /// Whether the driver task is still running.
    pub fn is_running(&self) -> bool {
        !self.requests.is_closed()
    }
}

/// Spawn the driver for an opened session.
///
/// The returned task yields the session once the connection is over, so the
/// caller can inspect it or `open()` it again. Connection failures end the
/// task with a [`Event::Disconnected`] carrying the error.
pub fn connect(session: Session, tls: Option<Tls>) -> (SessionHandle, JoinHandle<Session>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(session, tls, rx));
    (SessionHandle { requests: tx }, task)
}

/// Wait for a driver task and recover its session.
pub async fn join(task: JoinHandle<Session>) -> anyhow::Result<Session> {
    task.await.context("session driver task failed")
}

async fn run(
    mut session: Session,
    tls: Option<Tls>,
    mut requests: mpsc::UnboundedReceiver<Request>,
) -> Session {
    if session.state() != SessionState::Connecting {
        warn!("driver started for a session that is {:?}", session.state());
        return session;
    }

    let address = (session.host().to_owned(), session.port());
    debug!("connecting to {}:{}", address.0, address.1);
    let tcp = tokio::select! {
        result = TcpStream::connect((address.0.as_str(), address.1)) => match result {
            Ok(tcp) => tcp,
            Err(e) => {
                session.on_transport_error(e);
                return session;
            }
        },
        _ = wait_for_close(&mut session, &mut requests) => {
            return session;
        }
    };

    if let Err(e) = enable_keepalive(&tcp) {
        warn!("failed to enable TCP keepalive: {}", e);
    }

    match tls {
        None => drive(session, tcp, requests).await,
        Some(tls) => match tls.connector.connect(tls.server_name, tcp).await {
            Ok(stream) => drive(session, stream, requests).await,
            Err(e) => {
                session.on_transport_error(e);
                session
            }
        },
    }
}

/// Serve requests until one asks to close; sends fail as nothing is attached.
async fn wait_for_close(session: &mut Session, requests: &mut mpsc::UnboundedReceiver<Request>) {
    while let Some(request) = requests.recv().await {
        if handle_request(session, request) {
            break;
        }
    }
    if let Err(e) = session.close() {
        debug!("close while connecting: {}", e);
    }
}

/// Returns true for a close request.
fn handle_request(session: &mut Session, request: Request) -> bool {
    match request {
        Request::Send(command, reply) => {
            let _ = reply.send(session.send(&command));
            false
        }
        Request::Subscribe(reply) => {
            let _ = reply.send(session.subscribe());
            false
        }
        Request::Close => true,
    }
}

fn enable_keepalive(stream: &TcpStream) -> anyhow::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_TIME)
        .with_interval(KEEPALIVE_INTERVAL);
    sock.set_tcp_keepalive(&keepalive)?;
    Ok(())
}

/// [`Connection`] that hands lines to the writer task.
struct QueueConnection {
    lines: Option<mpsc::Sender<Bytes>>,
}

impl Connection for QueueConnection {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let Some(lines) = &self.lines else {
            return Err(io::ErrorKind::NotConnected.into());
        };
        match lines.try_send(Bytes::copy_from_slice(data)) {
            Ok(()) => Ok(data.len()),
            Err(TrySendError::Full(_)) => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "write queue is full",
            )),
            Err(TrySendError::Closed(_)) => Err(io::ErrorKind::BrokenPipe.into()),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.lines = None;
        Ok(())
    }
}

async fn write_loop<S>(mut writer: WriteHalf<S>, mut lines: mpsc::Receiver<Bytes>) -> io::Result<()>
where
    S: AsyncWrite,
{
    while let Some(line) = lines.recv().await {
        writer.write_all(&line).await?;
    }
    writer.shutdown().await
}

async fn drive<S>(
    mut session: Session,
    stream: S,
    mut requests: mpsc::UnboundedReceiver<Request>,
) -> Session
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let (tx, rx) = mpsc::channel(WRITE_QUEUE_LEN);
    let mut writer_task = tokio::spawn(write_loop(writer, rx));
    session.attach_connection(Box::new(QueueConnection { lines: Some(tx) }));

    if let Err(e) = session.on_transport_connected() {
        warn!("handshake failed: {}", e);
        let _ = session.close();
    }

    let mut buf = BytesMut::with_capacity(MAX_IRC_LINE_LEN + 1);
    let mut accepting = true;
    loop {
        session.drain_events().for_each(drop);
        if session.state() == SessionState::Disconnected {
            break;
        }
        tokio::select! {
            read = reader.read_buf(&mut buf) => match read {
                Ok(0) => {
                    session.on_transport_disconnected();
                }
                Ok(_) => {
                    session.on_data(&buf);
                    buf.clear();
                }
                Err(e) => {
                    session.on_transport_error(e);
                }
            },
            request = requests.recv(), if accepting => match request {
                Some(request) => {
                    if handle_request(&mut session, request) {
                        let _ = session.close();
                    }
                }
                None => {
                    // Every handle is gone; nobody can talk to this session.
                    accepting = false;
                    let _ = session.close();
                }
            },
            done = &mut writer_task => {
                match done {
                    Ok(Ok(())) => session.on_transport_disconnected(),
                    Ok(Err(e)) => session.on_transport_error(e),
                    Err(e) => session.on_transport_error(io::Error::new(io::ErrorKind::Other, e)),
                }
                session.drain_events().for_each(drop);
                return session;
            }
        }
    }
    writer_task.abort();
    session
}
