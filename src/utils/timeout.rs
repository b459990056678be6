use crate::error::{RconError, Result};
use std::future::Future;
use std::time::Duration;

/// Default bound on TCP connect
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on a login or command round trip
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut` with a deadline, mapping expiry to [`RconError::Timeout`].
pub async fn with_timeout_error<T, F>(fut: F, duration: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(RconError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        };
        let result = with_timeout_error(slow, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(RconError::Timeout)));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let failing = async { Err::<(), _>(RconError::ConnectionClosed) };
        let result = with_timeout_error(failing, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(RconError::ConnectionClosed)));
    }
}
