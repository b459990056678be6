//! # rcon-session
//!
//! Persistent RCON client for game server admin tooling.
//!
//! One [`RconClient`] owns a single authenticated TCP connection to a game
//! server's remote console and exposes one operation: send a command string,
//! get the reply string. Concurrent callers are serialized so only one request
//! is ever in flight, dropped connections are rebuilt lazily, and a stale
//! connection is replaced transparently once per command.
//!
//! ## Layers
//! - [`core`]: packet format and the Tokio codec
//! - [`protocol`]: login handshake, reply reassembly, reply parsers
//! - [`transport`]: TCP connect with timeout
//! - [`service`]: the session and the shared client
//! - [`config`], [`error`], [`utils`]: configuration, error taxonomy, logging and metrics
//!
//! ## Example
//! ```rust,no_run
//! use rcon_session::{PlayerList, RconClient, RconConfig};
//!
//! #[tokio::main]
//! async fn main() -> rcon_session::Result<()> {
//!     let client = RconClient::new(RconConfig::from_env()?);
//!     let reply = client.send("list").await?;
//!     if let Some(list) = PlayerList::parse(&reply) {
//!         println!("{} of {} online", list.online, list.max);
//!     }
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use crate::config::{RconConfig, ReassemblyMode, Settings};
pub use crate::core::codec::RconCodec;
pub use crate::core::packet::{Packet, PacketType};
pub use crate::error::{ErrorKind, RconError, Result};
pub use crate::protocol::replies::{parse_name_list, PlayerList};
pub use crate::service::client::RconClient;
pub use crate::service::session::RconSession;
