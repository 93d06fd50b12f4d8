/// Resilience patterns for platform clients
///
/// This library provides the small set of failure-handling building blocks
/// the clients share:
/// - **Backoff**: Deterministic exponential backoff with an attempt budget
/// - **Retry**: Exponential backoff with jitter for transient failures
/// - **Timeout**: Bounds a single async step such as a handshake
///
/// # Example: Reconnect schedule
///
/// ```rust
/// use resilience::BackoffConfig;
/// use std::time::Duration;
///
/// let backoff = BackoffConfig::default();
/// assert_eq!(backoff.delay_for(0), Duration::from_secs(1));
/// assert_eq!(backoff.delay_for(4), Duration::from_secs(16));
/// assert!(!backoff.allows(5));
/// ```
///
/// # Example: HTTP call with retry
///
/// ```rust,no_run
/// use resilience::{with_retry, RetryConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let result = with_retry(RetryConfig::default(), || async {
///         // Your HTTP call here
///         Ok::<_, String>(())
///     })
///     .await;
/// }
/// ```

pub mod backoff;
pub mod retry;
pub mod timeout;

// Re-export main types for convenience
pub use backoff::BackoffConfig;
pub use retry::{RetryConfig, RetryError, with_retry};
pub use timeout::{TimeoutError, with_timeout};
