//! TCP command server.
//!
//! ```text
//!  accept (non-blocking, polled every io_timeout)
//!     └─▶ read request line (io_timeout) ─▶ parse ─▶ route
//!            ├─ StatusPage  ─▶ text/html  status document
//!            ├─ StatusCheck ─▶ text/plain "OK"
//!            └─ Command     ─▶ ArmService::handle_command ─▶ text/plain ""
//!     └─▶ close
//! ```
//!
//! One connection at a time, one response per connection.  A connection
//! gets one `io_timeout` from accept to a complete request line, however
//! the bytes trickle in.  Socket errors and malformed requests are logged
//! and the connection is dropped; the loop itself only exits when the stop
//! signal is raised.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::app::ports::{EventSink, IndicatorPort};
use crate::app::service::ArmService;
use crate::app::state::StopSignal;
use crate::config::ServerConfig;
use crate::error::CommsError;

use super::dispatch::{Route, route};
use super::request::parse_request;
use super::response::{ContentType, STATUS_OK, write_response};
use super::status_page;

pub struct CommandServer<I, S> {
    listener: TcpListener,
    service: ArmService<I, S>,
    io_timeout: Duration,
    max_request_bytes: usize,
}

impl<I: IndicatorPort, S: EventSink> CommandServer<I, S> {
    /// Bind on every interface at `config.port`.
    pub fn bind(config: &ServerConfig, service: ArmService<I, S>) -> Result<Self, CommsError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        Self::bind_addr(addr, config, service)
    }

    /// Bind on an explicit address (port 0 picks a free one).
    pub fn bind_addr(
        addr: SocketAddr,
        config: &ServerConfig,
        service: ArmService<I, S>,
    ) -> Result<Self, CommsError> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("Server: bind {} failed: {}", addr, e);
            CommsError::BindFailed(addr.port())
        })?;
        listener.set_nonblocking(true).map_err(|e| {
            warn!("Server: set_nonblocking failed: {}", e);
            CommsError::BindFailed(addr.port())
        })?;

        Ok(Self {
            listener,
            service,
            io_timeout: Duration::from_millis(u64::from(config.io_timeout_ms)),
            max_request_bytes: config.max_request_bytes,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `stop` is raised.  Hands the service back so the caller
    /// can silence the indicator.
    pub fn run(mut self, stop: &StopSignal) -> ArmService<I, S> {
        if let Ok(addr) = self.local_addr() {
            info!("Server: listening on {}", addr);
        }

        while !stop.is_raised() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = self.serve(stream, stop) {
                        debug!("Server: connection from {} dropped: {}", peer, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(self.io_timeout);
                }
                Err(e) => {
                    warn!("Server: accept failed: {}", e);
                    std::thread::sleep(self.io_timeout);
                }
            }
        }

        info!("Server: stopped");
        self.service
    }

    fn serve(&mut self, mut stream: TcpStream, stop: &StopSignal) -> io::Result<()> {
        let deadline = Instant::now() + self.io_timeout;
        stream.set_nonblocking(false)?;
        stream.set_write_timeout(Some(self.io_timeout))?;

        let request = read_request_line(&mut stream, self.max_request_bytes, deadline, stop)?;
        self.respond(&request, &mut stream)
    }

    /// Handle one raw request and write the reply to `out`.
    pub fn respond<W: Write>(&mut self, request: &[u8], out: &mut W) -> io::Result<()> {
        let req = parse_request(request).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;

        match route(&req) {
            Route::StatusPage => {
                let html = status_page::render(&self.service.snapshot());
                write_response(out, ContentType::Html, &html)
            }
            Route::StatusCheck => write_response(out, ContentType::Text, STATUS_OK),
            Route::Command(cmd) => {
                match cmd {
                    Some(cmd) => {
                        debug!("Server: {} {} -> {:?}", req.method, req.path, cmd);
                        self.service.handle_command(cmd);
                    }
                    None => debug!("Server: {} {} -> no command", req.method, req.path),
                }
                write_response(out, ContentType::Text, "")
            }
        }
    }
}

/// A reader whose per-read wait can be capped.
trait TimedRead: Read {
    fn cap_wait(&mut self, wait: Duration) -> io::Result<()>;
}

impl TimedRead for TcpStream {
    fn cap_wait(&mut self, wait: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(wait))
    }
}

impl TimedRead for &[u8] {
    fn cap_wait(&mut self, _wait: Duration) -> io::Result<()> {
        Ok(())
    }
}

/// Read until the first line break, the peer closes, or `limit` bytes.
///
/// Fails with `TimedOut` once `deadline` passes and with `Interrupted`
/// when `stop` is raised, whatever the peer is still sending.
fn read_request_line<R: TimedRead>(
    conn: &mut R,
    limit: usize,
    deadline: Instant,
    stop: &StopSignal,
) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; limit];
    let mut len = 0;

    while len < limit {
        if stop.is_raised() {
            return Err(io::Error::new(ErrorKind::Interrupted, "server stopping"));
        }
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(io::Error::new(ErrorKind::TimedOut, "request line too slow"));
        }
        conn.cap_wait(left)?;

        let n = conn.read(&mut buf[len..])?;
        if n == 0 {
            break;
        }
        len += n;
        if buf[..len].contains(&b'\n') {
            break;
        }
    }

    if len == 0 {
        return Err(io::Error::new(ErrorKind::UnexpectedEof, "no request"));
    }
    buf.truncate(len);
    Ok(buf)
}
