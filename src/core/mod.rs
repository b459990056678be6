//! # Core Protocol Components
//!
//! Low-level packet handling and the Tokio codec used to frame RCON traffic.
//!
//! ## Components
//! - **Packet**: Binary packet format with little-endian length prefix
//! - **Codec**: Tokio codec for framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Length(4)] [RequestId(4)] [Type(4)] [Body(N)] [0x00] [0x00]
//! ```
//!
//! ## Safety
//! - Maximum frame length: 256 KiB (prevents memory exhaustion)
//! - Length validation before allocation
//! - Bodies with embedded NUL bytes are refused before anything is written

pub mod codec;
pub mod packet;
