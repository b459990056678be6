//! Reply reassembly.
//!
//! A long command output may arrive as several packets carrying the command's
//! request id. Bodies are concatenated strictly in arrival order until the
//! terminating condition of the configured mode is met:
//!
//! - single mode: the first matching packet is the whole reply
//! - trailer mode: the reply to the trailer packet written right after the
//!   command closes it, because the server answers requests in order

use crate::config::MAX_REPLY_LENGTH;
use crate::core::packet::Packet;
use crate::error::{RconError, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Complete(Vec<u8>),
}

#[derive(Debug)]
pub struct Reassembler {
    request_id: i32,
    trailer_id: Option<i32>,
    stale_id: Option<i32>,
    body: Vec<u8>,
    fragments: usize,
}

impl Reassembler {
    /// Expect the whole reply in one packet.
    pub fn single(request_id: i32) -> Self {
        Self {
            request_id,
            trailer_id: None,
            stale_id: None,
            body: Vec::new(),
            fragments: 0,
        }
    }

    /// Collect fragments until the echo of `trailer_id` arrives.
    pub fn with_trailer(request_id: i32, trailer_id: i32) -> Self {
        Self {
            trailer_id: Some(trailer_id),
            ..Self::single(request_id)
        }
    }

    /// Silently drop late packets carrying `id` (a previous exchange's trailer).
    pub fn skip_stale(mut self, id: Option<i32>) -> Self {
        self.stale_id = id;
        self
    }

    pub fn trailer_id(&self) -> Option<i32> {
        self.trailer_id
    }

    /// Number of fragments collected so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Feed the next packet read from the stream.
    ///
    /// # Errors
    /// - `RconError::RequestIdMismatch` for a packet belonging to no request in
    ///   flight, or a trailer echo that arrives before any reply to the
    ///   command; the stream is desynchronized and must be discarded
    /// - `RconError::OversizedPacket` once the collected reply exceeds
    ///   `MAX_REPLY_LENGTH`
    pub fn push(&mut self, packet: Packet) -> Result<Progress> {
        let id = packet.request_id;

        if id == self.request_id {
            let total = self.body.len() + packet.body.len();
            if total > MAX_REPLY_LENGTH {
                return Err(RconError::OversizedPacket(total));
            }
            self.body.extend_from_slice(&packet.body);
            self.fragments += 1;
            if self.trailer_id.is_none() {
                return Ok(Progress::Complete(std::mem::take(&mut self.body)));
            }
            return Ok(Progress::Pending);
        }

        if Some(id) == self.trailer_id {
            // Servers answer in order, so the command went unanswered
            if self.fragments == 0 {
                return Err(RconError::RequestIdMismatch {
                    expected: self.request_id,
                    actual: id,
                });
            }
            return Ok(Progress::Complete(std::mem::take(&mut self.body)));
        }

        if Some(id) == self.stale_id {
            return Ok(Progress::Pending);
        }

        Err(RconError::RequestIdMismatch {
            expected: self.request_id,
            actual: id,
        })
    }
}
