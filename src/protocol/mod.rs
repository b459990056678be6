//! # RCON Exchange Logic
//!
//! Connection-independent pieces of the protocol: the login handshake, the
//! reply reassembly state machine, and parsers for common command replies.
//!
//! ## Components
//! - **Handshake**: LOGIN exchange that must succeed before any command is sent
//! - **Reassembly**: Concatenates multi-packet replies in arrival order
//! - **Replies**: Pure parsers for `list`, `whitelist list` and `banlist` output

pub mod handshake;
pub mod reassembly;
pub mod replies;
