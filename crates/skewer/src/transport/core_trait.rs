use std::time::Duration;
use async_trait::async_trait;

use crate::error::TransportError;
use super::proto::{PredictRequest, PredictResponse};

/// A remote service able to answer a single prediction request.
///
/// Implementations are shared read-only between the dispatching task and every
/// in-flight call, so they must be `Send + Sync`. They are only ever used to
/// initiate calls and are never mutated by the engine.
///
/// # Example
///
/// ```ignore
/// use skewer::transport::{PredictionService, proto::{PredictRequest, PredictResponse}};
/// use skewer::error::TransportError;
/// use async_trait::async_trait;
/// use std::time::Duration;
///
/// struct Echo;
///
/// #[async_trait]
/// impl PredictionService for Echo {
///     async fn predict(&self, _request: PredictRequest, _timeout: Duration) -> Result<PredictResponse, TransportError> {
///         Ok(PredictResponse::default())
///     }
/// }
/// ```
#[async_trait]
pub trait PredictionService: Send + Sync + 'static {
    /// Issues one prediction call.
    ///
    /// # Parameters
    ///
    /// * `request` - Model identifier plus named input tensors
    /// * `timeout` - Deadline the caller will enforce; implementations may forward it
    ///   to the server
    ///
    /// # Returns
    ///
    /// The response carrying named output tensors, or the reason the call failed
    async fn predict(
        &self,
        request: PredictRequest,
        timeout: Duration,
    ) -> Result<PredictResponse, TransportError>;
}
