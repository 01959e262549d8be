use std::time::Duration;

use async_trait::async_trait;
use http::uri::PathAndQuery;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::error::TransportError;
use super::core_trait::PredictionService;
use super::proto::{PredictRequest, PredictResponse};

const PREDICT_PATH: &str = "/tensorflow.serving.PredictionService/Predict";

/// TensorFlow Serving client speaking plaintext gRPC.
///
/// The underlying channel is cheap to clone and multiplexes every call over the
/// same HTTP/2 connection, so one instance serves all in-flight requests.
#[derive(Clone, Debug)]
pub struct GrpcPredictionService {
    channel: Channel,
}

impl GrpcPredictionService {
    /// Creates a client for `server` without connecting yet.
    ///
    /// The connection is established on the first call, so an unreachable server
    /// surfaces as per-request errors rather than a startup failure.
    ///
    /// # Parameters
    ///
    /// * `server` - `host:port`, or a full `http://` URI
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_lazy(server: &str) -> Result<Self, TransportError> {
        let uri = if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{server}")
        };
        let endpoint = Endpoint::from_shared(uri)
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        debug!(server, "created lazy prediction channel");

        Ok(Self {
            channel: endpoint.connect_lazy(),
        })
    }
}

#[async_trait]
impl PredictionService for GrpcPredictionService {
    async fn predict(
        &self,
        request: PredictRequest,
        timeout: Duration,
    ) -> Result<PredictResponse, TransportError> {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        let mut request = tonic::Request::new(request);
        // lets the server drop work we have already given up on
        request.set_timeout(timeout);

        let codec: ProstCodec<PredictRequest, PredictResponse> = ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(PREDICT_PATH), codec)
            .await?;
        Ok(response.into_inner())
    }
}
