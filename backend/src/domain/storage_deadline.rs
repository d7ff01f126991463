//! Upper bound on how long a single storage call may take.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::Error;

/// Deadline applied to every storage round trip made by the services.
///
/// A call that does not finish in time fails with
/// [`crate::domain::ErrorCode::StorageUnavailable`] instead of hanging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageDeadline {
    timeout: Duration,
}

impl StorageDeadline {
    /// Deadline used when nothing else is configured.
    pub const DEFAULT: Self = Self {
        timeout: Duration::from_secs(5),
    };

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Await `future`, mapping its error with `map_error` and an elapsed
    /// deadline to a storage-unavailable error.
    pub async fn run<T, E, F>(
        &self,
        operation: &'static str,
        future: F,
        map_error: impl FnOnce(E) -> Error,
    ) -> Result<T, Error>
    where
        F: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result.map_err(map_error),
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(operation, timeout_ms, "storage call exceeded deadline");
                Err(Error::storage_unavailable(format!(
                    "{operation} did not complete within {timeout_ms}ms"
                )))
            }
        }
    }
}

impl Default for StorageDeadline {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn passes_through_successful_results() {
        let deadline = StorageDeadline::DEFAULT;
        let value = deadline
            .run("lookup", async { Ok::<_, String>(7) }, Error::internal)
            .await
            .expect("value");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn maps_adapter_errors() {
        let err = StorageDeadline::DEFAULT
            .run(
                "lookup",
                async { Err::<(), _>("broken".to_owned()) },
                Error::internal,
            )
            .await
            .expect_err("adapter error");
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "broken");
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_reports_storage_unavailable() {
        let deadline = StorageDeadline::new(Duration::from_millis(250));
        let err = deadline
            .run(
                "lookup",
                std::future::pending::<Result<(), String>>(),
                Error::internal,
            )
            .await
            .expect_err("deadline elapsed");
        assert_eq!(err.code(), ErrorCode::StorageUnavailable);
        assert!(err.message().contains("250ms"));
        assert!(err.is_retryable());
    }
}
