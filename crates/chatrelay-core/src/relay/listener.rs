//! The TCP connection listener.
//!
//! Accepts on the async runtime and hands each connection, as a blocking
//! `std::net::TcpStream`, to `spawn_blocking`. Each stream carries a read
//! and write timeout, so an idle client releases its blocking thread instead
//! of holding a slot in the bounded pool forever.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

use super::bridge::handle_connection;
use crate::session::RelaySession;

/// Pause after a failed accept (e.g., out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Socket timeout used until [`ConnectionListener::with_io_timeout`] says otherwise.
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Accept loop feeding connections to bridge units.
pub struct ConnectionListener<R> {
    listener: TcpListener,
    session: Arc<R>,
    max_payload_bytes: usize,
    io_timeout: Option<Duration>,
}

impl<R: RelaySession + 'static> ConnectionListener<R> {
    /// Resolve `addr`, bind with `SO_REUSEADDR`, and listen with `backlog`.
    pub async fn bind(
        addr: &str,
        backlog: u32,
        session: Arc<R>,
        max_payload_bytes: usize,
    ) -> io::Result<Self> {
        let addr = tokio::net::lookup_host(addr).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for '{addr}'"),
            )
        })?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(backlog)?;

        Ok(Self {
            listener,
            session,
            max_payload_bytes,
            io_timeout: Some(DEFAULT_IO_TIMEOUT),
        })
    }

    /// Read and write timeout for client sockets. `None` blocks forever.
    pub fn with_io_timeout(mut self, io_timeout: Option<Duration>) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept until `shutdown` is cancelled.
    ///
    /// Bridge units already running are not interrupted; they finish on the
    /// blocking pool.
    pub async fn run(self, shutdown: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            info!(%addr, "listening for clients");
        }

        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }

        info!("listener stopped");
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let stream = match into_blocking(stream, self.io_timeout) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%peer, error = %err, "could not hand off connection");
                return;
            }
        };

        debug!(%peer, "accepted connection");
        let session = Arc::clone(&self.session);
        let max_payload_bytes = self.max_payload_bytes;
        tokio::task::spawn_blocking(move || {
            let _span = info_span!("client", %peer).entered();
            handle_connection(stream, session.as_ref(), max_payload_bytes);
        });
    }
}

fn into_blocking(
    stream: TcpStream,
    io_timeout: Option<Duration>,
) -> io::Result<std::net::TcpStream> {
    let stream = stream.into_std()?;
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(io_timeout)?;
    stream.set_write_timeout(io_timeout)?;
    Ok(stream)
}
