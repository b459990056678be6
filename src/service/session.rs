//! One authenticated RCON connection.
//!
//! A [`RconSession`] can only be obtained through [`RconSession::establish`] (or
//! [`RconSession::connect`]), both of which run the login handshake first. There
//! is therefore no way to write a COMMAND packet on a socket that has not been
//! authenticated.
//!
//! The session performs exactly one exchange at a time (`execute` takes
//! `&mut self`). Sharing it between tasks is the job of
//! [`crate::service::client::RconClient`].

use std::time::Duration;

use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, instrument, trace};

use crate::config::{RconConfig, ReassemblyMode};
use crate::core::codec::RconCodec;
use crate::core::packet::{Packet, PacketType};
use crate::error::{ErrorKind, RconError, Result};
use crate::protocol::handshake;
use crate::protocol::reassembly::{Progress, Reassembler};
use crate::transport::{self, recv_packet};
use crate::utils::timeout::with_timeout_error;

pub struct RconSession<T = TcpStream> {
    framed: Framed<T, RconCodec>,
    /// Last request id handed out
    last_id: i32,
    reassembly: ReassemblyMode,
    request_timeout: Duration,
    /// Trailer of the previous exchange; its late duplicates are skipped
    stale_trailer: Option<i32>,
    /// Set while an exchange is in progress and left set if it fails
    poisoned: bool,
}

impl RconSession<TcpStream> {
    /// Open a TCP connection to the configured server and log in.
    #[instrument(skip(config), fields(addr = %config.address()))]
    pub async fn connect(config: &RconConfig) -> Result<Self> {
        let framed = transport::tcp::connect(&config.host, config.port, config.connect_timeout)
            .await?;
        Self::establish(framed, config).await
    }
}

impl<T> RconSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Authenticate an already-open stream.
    ///
    /// Failures are reported as `RconError::AuthRejected` /
    /// `RconError::HandshakeError` when the server refused or did not speak
    /// RCON, and as `RconError::Connection` for anything transport related.
    /// On error the stream is dropped, closing the socket.
    pub async fn establish(framed: Framed<T, RconCodec>, config: &RconConfig) -> Result<Self> {
        let mut session = Self {
            framed,
            last_id: 0,
            reassembly: config.reassembly,
            request_timeout: config.request_timeout,
            stale_trailer: None,
            poisoned: false,
        };

        let login_id = session.next_request_id();
        let login = handshake::authenticate(&mut session.framed, login_id, &config.password);

        if let Err(e) = with_timeout_error(login, config.request_timeout).await {
            return Err(match e.kind() {
                ErrorKind::Io => RconError::Connection(format!("login failed: {e}")),
                ErrorKind::Protocol => RconError::HandshakeError(e.to_string()),
                _ => e,
            });
        }

        Ok(session)
    }

    /// Allocate the next request id: 1..=i32::MAX, wrapping back to 1.
    ///
    /// Zero and negative ids are never used, so `-1` stays reserved for the
    /// server's login rejection.
    fn next_request_id(&mut self) -> i32 {
        self.last_id = if self.last_id >= i32::MAX {
            1
        } else {
            self.last_id + 1
        };
        self.last_id
    }

    /// Whether a previous exchange failed and left the stream in an unknown state.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Run one command and return its reply body.
    ///
    /// The whole round trip is bounded by the request timeout. A command that
    /// cannot be framed is refused before anything is written and leaves the
    /// session usable; any other failure poisons it.
    #[instrument(skip(self, command), fields(request_id), level = "debug")]
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        if self.poisoned {
            return Err(RconError::Protocol(
                "session is unusable after a failed exchange".into(),
            ));
        }

        let request_id = self.next_request_id();
        tracing::Span::current().record("request_id", request_id);

        let packet = Packet::command(request_id, command);
        packet.validate()?;

        self.poisoned = true;
        let timeout = self.request_timeout;
        let body = with_timeout_error(self.exchange(packet), timeout).await?;
        self.poisoned = false;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn exchange(&mut self, packet: Packet) -> Result<Vec<u8>> {
        let request_id = packet.request_id;
        self.framed.feed(packet).await?;

        let reassembler = match self.reassembly {
            ReassemblyMode::Single => Reassembler::single(request_id),
            ReassemblyMode::Trailer => {
                let trailer_id = self.next_request_id();
                self.framed
                    .feed(Packet::new(trailer_id, PacketType::RESPONSE, Vec::new()))
                    .await?;
                Reassembler::with_trailer(request_id, trailer_id)
            }
        };
        let mut reassembler = reassembler.skip_stale(self.stale_trailer.take());

        self.framed.flush().await?;

        loop {
            let reply = recv_packet(&mut self.framed).await?;
            trace!(
                reply_id = reply.request_id,
                bytes = reply.body.len(),
                "Packet received"
            );

            if let Progress::Complete(body) = reassembler.push(reply)? {
                debug!(fragments = reassembler.fragments(), "Reply complete");
                self.stale_trailer = reassembler.trailer_id();
                return Ok(body);
            }
        }
    }

    /// Flush and shut down the write half of the connection.
    pub async fn close(mut self) -> Result<()> {
        self.framed.close().await
    }
}
