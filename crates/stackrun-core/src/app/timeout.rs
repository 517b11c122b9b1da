//! Bounded network calls.

use std::future::Future;
use std::time::Duration;

/// Await `fut` for at most `limit`; an elapsed limit becomes `on_timeout(limit)`.
pub async fn bounded<T, E, F>(
    limit: Duration,
    fut: F,
    on_timeout: impl FnOnce(Duration) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ProviderError;

    #[tokio::test]
    async fn passes_through_results() {
        let ok: Result<u8, ProviderError> =
            bounded(Duration::from_secs(1), async { Ok(7) }, ProviderError::Timeout).await;
        assert_eq!(ok, Ok(7));

        let err: Result<u8, ProviderError> = bounded(
            Duration::from_secs(1),
            async { Err(ProviderError::NoUpdates) },
            ProviderError::Timeout,
        )
        .await;
        assert_eq!(err, Err(ProviderError::NoUpdates));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<u8, ProviderError>(1)
        };
        let res = bounded(Duration::from_millis(50), slow, ProviderError::Timeout).await;
        assert_eq!(res, Err(ProviderError::Timeout(Duration::from_millis(50))));
    }
}
