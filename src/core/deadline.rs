use std::future::Future;
use std::time::Duration;
use crate::core::error::EngineError;
use crate::services::StoreError;

/// Run one store call under a deadline
///
/// Store failures become [`EngineError::StoreUnavailable`], an elapsed
/// deadline becomes [`EngineError::StoreTimeout`]. Whether a timed out write
/// landed is unknown.
pub(crate) async fn store_call<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(EngineError::from),
        Err(_) => {
            tracing::error!("Store call {} exceeded {:?}", operation, timeout);
            Err(EngineError::StoreTimeout { operation })
        }
    }
}
