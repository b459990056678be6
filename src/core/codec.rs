use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_PACKET_LENGTH;
use crate::core::packet::{Packet, LENGTH_PREFIX_SIZE};
use crate::error::{RconError, Result};

/// Tokio codec framing RCON packets over a byte stream.
///
/// Decoding is incremental: a frame is only taken out of the buffer once all
/// `4 + length` bytes have arrived, so a partial read leaves the buffer intact.
#[derive(Debug, Default, Clone, Copy)]
pub struct RconCodec;

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = RconError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        // Peek the prefix without consuming it
        let length = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        let length = Packet::check_length(length)?;

        let frame_len = LENGTH_PREFIX_SIZE + length;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(frame_len);
        frame.advance(LENGTH_PREFIX_SIZE);
        Packet::from_payload(&frame).map(Some)
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = RconError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        // Body content is the caller's concern (see `Packet::validate`); only
        // a frame the peer would refuse is rejected here, before writing
        let length = item.encoded_len();
        if length > MAX_PACKET_LENGTH {
            return Err(RconError::OversizedPacket(length));
        }

        dst.reserve(LENGTH_PREFIX_SIZE + length);
        dst.put_i32_le(length as i32);
        dst.put_i32_le(item.request_id);
        dst.put_i32_le(item.packet_type.0);
        dst.put_slice(&item.body);
        dst.put_u8(0);
        dst.put_u8(0);
        Ok(())
    }
}
