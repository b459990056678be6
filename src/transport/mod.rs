//! # Transport Layer
//!
//! Opening framed TCP connections to an RCON server and reading packets off them.
//!
//! Nothing outside [`crate::service`] touches a socket directly.

pub mod tcp;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::core::codec::RconCodec;
use crate::core::packet::Packet;
use crate::error::{RconError, Result};

/// Read the next packet, mapping end-of-stream to [`RconError::ConnectionClosed`].
pub async fn recv_packet<T>(framed: &mut Framed<T, RconCodec>) -> Result<Packet>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    framed.next().await.ok_or(RconError::ConnectionClosed)?
}
