//! # Skewer
//!
//! A load-testing and validation client for TensorFlow Serving style prediction
//! services.
//!
//! ## Overview
//!
//! Skewer issues a configurable number of inference requests against a remote
//! server while never keeping more than a fixed number of them in flight. Every
//! answer is checked against an expected label, and once the last request has
//! landed the run reports its aggregate error rate and wall-clock time.
//!
//! ## Architecture
//!
//! ### Dispatch engine
//!
//! The [`engine`] module holds the concurrency-sensitive parts: the shared
//! [`ResultTally`](engine::ResultTally), the throttled
//! [`RequestDispatcher`](engine::RequestDispatcher), the exactly-once
//! [`CompletionHandler`](engine::CompletionHandler) and the [`Driver`] that runs
//! one pass.
//!
//! ### Transport
//!
//! Requests leave through the [`PredictionService`] trait. A gRPC implementation
//! for `tensorflow.serving.PredictionService/Predict` is provided in
//! [`transport`]; tests use an in-process stub.
//!
//! ### Payloads and correctness
//!
//! A [`Workload`] builds each request and its [`Label`]; a [`Verdict`] decides
//! whether an answer is correct. Both are plain traits with closure
//! implementations, so callers can bring their own model layout.
//!
//! ## Errors
//!
//! Only configuration problems are fatal and they are detected before anything is
//! sent. A failed, timed out or wrong answer is counted, never returned.
//!
//! ## Example
//!
//! ```ignore
//! use skewer::{RunConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig { concurrency: 4, num_tests: 100, ..RunConfig::default() };
//!     let report = run(config).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod transport;
pub mod verdict;
pub mod workload;

pub use config::RunConfig;
pub use engine::Driver;
pub use error::{ConfigError, TransportError};
pub use report::RunReport;
pub use transport::{GrpcPredictionService, PredictionService};
pub use verdict::{ArgmaxVerdict, ElementwiseVerdict, Verdict};
pub use workload::{Label, ModelKind, TestCase, Workload};

/// Errors from [`run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Runs one pass against the gRPC server named in `config`.
///
/// Uses the built-in workload selected by `config.model` and scores answers
/// with [`ArgmaxVerdict`]. The configuration is validated before a channel is
/// created or a request is sent.
pub async fn run(config: RunConfig) -> Result<RunReport, RunError> {
    config.validate()?;
    let service = GrpcPredictionService::connect_lazy(&config.server)?;
    let workload = config.model.workload();
    let driver = Driver::new(config, Arc::new(service), Arc::new(ArgmaxVerdict::default()))?;
    Ok(driver.run(workload.as_ref()).await)
}
