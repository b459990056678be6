//! Login handshake.
//!
//! The server answers a LOGIN packet with an `AUTH_RESPONSE` that echoes the
//! request id on success and carries `-1` on failure. Source engine servers
//! send one empty `RESPONSE` packet with the login id first; it is skipped.

use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, instrument, warn};

use crate::core::codec::RconCodec;
use crate::core::packet::{Packet, PacketType, AUTH_FAILURE_ID};
use crate::error::{constants, RconError, Result};
use crate::transport::recv_packet;

/// Send the password and wait for the verdict.
///
/// # Errors
/// - `RconError::AuthRejected` if the server answered with request id `-1`
/// - `RconError::HandshakeError` if the reply does not correlate with the login
/// - `RconError::Connection` if the server hung up before answering
/// - `RconError::InvalidCommand` if the password cannot be framed; nothing is sent
#[instrument(skip(framed, password))]
pub async fn authenticate<T>(
    framed: &mut Framed<T, RconCodec>,
    request_id: i32,
    password: &str,
) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let login = Packet::login(request_id, password);
    login.validate()?;
    framed.send(login).await?;

    let mut skipped_preamble = false;
    loop {
        let reply = match recv_packet(framed).await {
            Err(RconError::ConnectionClosed) => {
                return Err(RconError::Connection(
                    constants::ERR_HANDSHAKE_CLOSED.into(),
                ))
            }
            other => other?,
        };

        if reply.request_id == AUTH_FAILURE_ID {
            warn!("RCON login rejected");
            return Err(RconError::AuthRejected);
        }

        if reply.request_id != request_id {
            return Err(RconError::HandshakeError(format!(
                "{} ({})",
                constants::ERR_UNEXPECTED_AUTH_ID,
                reply.request_id
            )));
        }

        if !skipped_preamble && reply.packet_type == PacketType::RESPONSE && reply.body.is_empty() {
            debug!("Skipping empty response preceding login verdict");
            skipped_preamble = true;
            continue;
        }

        debug!("RCON login accepted");
        return Ok(());
    }
}
