//! Process-wide RCON client.
//!
//! [`RconClient`] is the one capability handed to the rest of an application:
//! send a command string, get the reply string. Clones share a single session
//! slot guarded by a FIFO mutex, so commands from concurrent callers reach the
//! wire strictly one at a time and each caller receives its own reply.
//!
//! ## Session lifecycle
//! - Connected and authenticated lazily on the first `send`
//! - Discarded on any I/O or protocol failure; the next `send` reconnects
//! - A reused session that fails with an I/O error is replaced and the command
//!   retried exactly once; connect, auth and protocol failures are never retried
//! - [`RconClient::close`] shuts the connection down explicitly
//!
//! ## Example
//! ```rust,no_run
//! use rcon_session::{RconClient, RconConfig};
//!
//! # async fn run() -> rcon_session::Result<()> {
//! let client = RconClient::new(RconConfig::new("127.0.0.1", 25575, "secret"));
//! let reply = client.send("list").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RconConfig;
use crate::error::{ErrorKind, Result};
use crate::service::session::RconSession;
use crate::utils::metrics::{Metrics, Timer};

/// Attempts per `send`: the original one plus a single retry.
const MAX_ATTEMPTS: u32 = 2;

/// Cheaply cloneable handle to the shared RCON session.
#[derive(Clone)]
pub struct RconClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: RconConfig,
    session: Mutex<Option<RconSession>>,
    metrics: Metrics,
}

impl RconClient {
    /// Build a client. No connection is made until the first command.
    pub fn new(config: RconConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                session: Mutex::new(None),
                metrics: Metrics::new(),
            }),
        }
    }

    /// Build a client from `RCON_HOST`, `RCON_PORT` and `RCON_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(RconConfig::from_env()?))
    }

    pub fn config(&self) -> &RconConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Whether an authenticated session is currently cached.
    ///
    /// Waits for any in-flight command to finish.
    pub async fn is_connected(&self) -> bool {
        self.inner.session.lock().await.is_some()
    }

    /// Send `command` and return the server's reply.
    ///
    /// # Errors
    /// - `ErrorKind::Connection` when the server is unreachable
    /// - `ErrorKind::Auth` when the password is rejected
    /// - `ErrorKind::Protocol` when the stream desynchronized
    /// - `ErrorKind::Io` when the exchange failed on a fresh session, or failed
    ///   again after the single retry
    /// - `ErrorKind::InvalidInput` when the command contains a NUL byte
    #[instrument(skip(self, command), fields(addr = %self.inner.config.address()))]
    pub async fn send(&self, command: &str) -> Result<String> {
        let _timer = Timer::start("rcon_send");
        let metrics = &self.inner.metrics;

        // Held for the whole exchange, reconnects included
        let mut slot = self.inner.session.lock().await;

        let mut attempt = 1;
        loop {
            let (mut session, reused) = match slot.take() {
                Some(session) => (session, true),
                None => match self.open_session().await {
                    Ok(session) => (session, false),
                    Err(e) => {
                        metrics.command_failed();
                        error!(error = %e, "Failed to open RCON session");
                        return Err(e);
                    }
                },
            };

            metrics.command_sent(command.len() as u64);
            match session.execute(command).await {
                Ok(reply) => {
                    metrics.reply_received(reply.len() as u64);
                    *slot = Some(session);
                    return Ok(reply);
                }
                Err(e) if !e.invalidates_session() => {
                    *slot = Some(session);
                    metrics.command_failed();
                    return Err(e);
                }
                Err(e) => {
                    drop(session);
                    metrics.session_invalidated();
                    if e.kind() == ErrorKind::Protocol {
                        metrics.protocol_error();
                    }

                    if reused && attempt < MAX_ATTEMPTS && e.is_retryable() {
                        warn!(error = %e, "RCON session went stale, reconnecting");
                        metrics.retry();
                        attempt += 1;
                        continue;
                    }

                    metrics.command_failed();
                    error!(error = %e, attempt, "RCON command failed");
                    return Err(e);
                }
            }
        }
    }

    /// Close the cached session, if any. The next `send` reconnects.
    pub async fn close(&self) {
        let session = self.inner.session.lock().await.take();
        if let Some(session) = session {
            if let Err(e) = session.close().await {
                debug!(error = %e, "Error while closing RCON session");
            }
            info!("RCON session closed");
        }
    }

    async fn open_session(&self) -> Result<RconSession> {
        let metrics = &self.inner.metrics;
        match RconSession::connect(&self.inner.config).await {
            Ok(session) => {
                metrics.connection_established();
                info!("RCON session established");
                Ok(session)
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::Auth => metrics.auth_failed(),
                    _ => metrics.connection_error(),
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for RconClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
