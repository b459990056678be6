use std::time::Duration;

use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, instrument};

use crate::core::codec::RconCodec;
use crate::error::{constants, RconError, Result};

/// Connect to `host:port` within `connect_timeout`.
///
/// The host is resolved through the system resolver, so names like
/// `localhost` work. Every failure is reported as [`RconError::Connection`].
#[instrument(skip(connect_timeout))]
pub async fn connect(
    host: &str,
    port: u16,
    connect_timeout: Duration,
) -> Result<Framed<TcpStream, RconCodec>> {
    let stream = match tokio::time::timeout(connect_timeout, TcpStream::connect((host, port))).await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(RconError::Connection(format!("{host}:{port}: {e}"))),
        Err(_) => {
            return Err(RconError::Connection(format!(
                "{host}:{port}: {}",
                constants::ERR_CONNECT_TIMEOUT
            )))
        }
    };

    // Commands are tiny; do not let Nagle hold them back
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "Failed to set TCP_NODELAY");
    }

    debug!(peer = ?stream.peer_addr().ok(), "TCP connection established");
    Ok(Framed::new(stream, RconCodec))
}
