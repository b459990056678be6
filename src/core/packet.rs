//! # RCON Packet
//!
//! One length-prefixed binary frame. All integers are little-endian.
//!
//! ```text
//! [Length(4)] [RequestId(4)] [Type(4)] [Body(N)] [0x00] [0x00]
//! ```
//!
//! `Length` counts everything after itself, so a frame with an empty body has
//! `Length == 10`.

use crate::config::MAX_PACKET_LENGTH;
use crate::error::{constants, RconError, Result};
use std::borrow::Cow;
use std::fmt;

/// Size of the length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Request id + type + body terminator + pad.
pub const MIN_PACKET_LENGTH: usize = 10;

/// Request id the server answers a failed login with.
pub const AUTH_FAILURE_ID: i32 = -1;

/// Packet type field.
///
/// Type `2` is overloaded by the protocol: it is `COMMAND` on requests and
/// `AUTH_RESPONSE` on the server's reply to a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketType(pub i32);

impl PacketType {
    pub const RESPONSE: PacketType = PacketType(0);
    pub const COMMAND: PacketType = PacketType(2);
    pub const AUTH_RESPONSE: PacketType = PacketType(2);
    pub const LOGIN: PacketType = PacketType(3);
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "RESPONSE"),
            2 => write!(f, "COMMAND"),
            3 => write!(f, "LOGIN"),
            other => write!(f, "TYPE({other})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub packet_type: PacketType,
    /// Raw body without the trailing terminator and pad bytes.
    pub body: Vec<u8>,
}

impl Packet {
    pub fn new(request_id: i32, packet_type: PacketType, body: impl Into<Vec<u8>>) -> Self {
        Self {
            request_id,
            packet_type,
            body: body.into(),
        }
    }

    pub fn login(request_id: i32, password: &str) -> Self {
        Self::new(request_id, PacketType::LOGIN, password)
    }

    pub fn command(request_id: i32, command: &str) -> Self {
        Self::new(request_id, PacketType::COMMAND, command)
    }

    /// Value of the length prefix for this packet.
    pub fn encoded_len(&self) -> usize {
        MIN_PACKET_LENGTH + self.body.len()
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Check that an outbound request can be sent as-is.
    ///
    /// Bodies are NUL terminated on the wire, so an embedded NUL would truncate
    /// the body at the peer. Both failures are caller errors and are reported
    /// as `RconError::InvalidCommand`.
    pub fn validate(&self) -> Result<()> {
        if self.body.contains(&0) {
            return Err(RconError::InvalidCommand(constants::ERR_EMBEDDED_NUL.into()));
        }
        if self.encoded_len() > MAX_PACKET_LENGTH {
            return Err(RconError::InvalidCommand(format!(
                "{}: {} bytes (maximum {})",
                constants::ERR_COMMAND_TOO_LONG,
                self.body.len(),
                MAX_PACKET_LENGTH - MIN_PACKET_LENGTH
            )));
        }
        Ok(())
    }

    /// Append the full frame, length prefix included, to `dst`.
    pub fn write_to(&self, dst: &mut Vec<u8>) {
        dst.reserve(LENGTH_PREFIX_SIZE + self.encoded_len());
        dst.extend_from_slice(&(self.encoded_len() as i32).to_le_bytes());
        dst.extend_from_slice(&self.request_id.to_le_bytes());
        dst.extend_from_slice(&self.packet_type.0.to_le_bytes());
        dst.extend_from_slice(&self.body);
        dst.extend_from_slice(&[0, 0]);
    }

    /// Serialize the packet to a full frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + self.encoded_len());
        self.write_to(&mut out);
        out
    }

    /// Validate a length prefix and return it as a frame size.
    pub fn check_length(length: i32) -> Result<usize> {
        if length < MIN_PACKET_LENGTH as i32 || length as usize > MAX_PACKET_LENGTH {
            return Err(RconError::InvalidLength(length));
        }
        Ok(length as usize)
    }

    /// Parse exactly one full frame, length prefix included.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < LENGTH_PREFIX_SIZE {
            return Err(RconError::Protocol(format!(
                "truncated frame: {} bytes",
                buf.len()
            )));
        }

        let length = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let length = Self::check_length(length)?;

        if buf.len() != LENGTH_PREFIX_SIZE + length {
            return Err(RconError::Protocol(format!(
                "frame declares {} bytes but {} were supplied",
                length,
                buf.len() - LENGTH_PREFIX_SIZE
            )));
        }

        Self::from_payload(&buf[LENGTH_PREFIX_SIZE..])
    }

    /// Parse the bytes following the length prefix.
    pub(crate) fn from_payload(payload: &[u8]) -> Result<Self> {
        let request_id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let packet_type = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);

        let (body, trailer) = payload[8..].split_at(payload.len() - MIN_PACKET_LENGTH);
        if trailer != [0, 0] {
            return Err(RconError::Protocol(constants::ERR_MISSING_TERMINATOR.into()));
        }

        Ok(Self {
            request_id,
            packet_type: PacketType(packet_type),
            body: body.to_vec(),
        })
    }
}
