//! Calls whose failure must never abort the surrounding operation

use std::future::Future;

use crate::error::AppResult;

/// Await `call` and discard its error after logging it.
///
/// Used for side calls such as the overview chart or the prediction
/// recompute: the caller only cares about the value when there is one.
pub async fn best_effort<T, F>(label: &'static str, call: F) -> Option<T>
where
    F: Future<Output = AppResult<T>>,
{
    match call.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(call = label, error = %e, "Best-effort call failed");
            None
        }
    }
}

/// Await `call`, substituting `fallback` for any error.
///
/// Per-item lookups in a batch use this so one item never fails the batch.
pub async fn or_sentinel<T, F>(label: &'static str, key: &str, fallback: T, call: F) -> T
where
    F: Future<Output = AppResult<T>>,
{
    match call.await {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(call = label, key = key, error = %e, "Lookup failed, using sentinel");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let value: Option<u32> = best_effort("eda", async { Err(AppError::Network("down".into())) }).await;
        assert!(value.is_none());

        let value = best_effort("eda", async { Ok::<_, AppError>(7) }).await;
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn test_sentinel_replaces_failure() {
        let scheduled = or_sentinel("logs", "EQ-1", false, async {
            Err::<bool, _>(AppError::Server { status: 500, detail: None })
        })
        .await;
        assert!(!scheduled);
    }

    #[test]
    fn test_sentinel_passes_value_through() {
        let flags = tokio_test::block_on(or_sentinel("logs", "EQ-2", (false, false), async {
            Ok::<_, AppError>((true, true))
        }));
        assert_eq!(flags, (true, true));
    }
}
