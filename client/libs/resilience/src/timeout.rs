/// Time limit for a single async step
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

impl TimeoutError {
    pub fn limit(&self) -> Duration {
        self.0
    }
}

/// Run `future`, giving up once `limit` has elapsed. The future is dropped
/// on timeout.
pub async fn with_timeout<F, T>(limit: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| TimeoutError(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_limit() {
        let result = with_timeout(Duration::from_secs(1), async { 42 }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_reports_limit() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.limit(), Duration::from_millis(10));
        assert_eq!(err.to_string(), "timed out after 10ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_inner_error_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Err::<(), _>("refused") }).await;
        assert_eq!(result, Ok(Err("refused")));
    }
}
