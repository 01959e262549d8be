//! # Transport
//!
//! This module defines how requests leave the process. The dispatch engine only
//! ever talks to the [`PredictionService`] trait, so the gRPC client below can be
//! swapped for any other implementation (an in-process stub in tests, for example).
//!
//! ## Contents
//!
//! - [`PredictionService`]: the one-call async interface the engine drives
//! - [`proto`]: TensorFlow Serving wire messages and tensor helpers
//! - [`GrpcPredictionService`]: a `tonic` client for `PredictionService/Predict`

mod core_trait;
mod grpc;

/// TensorFlow Serving `Predict` messages.
pub mod proto;

pub use core_trait::*;
pub use grpc::GrpcPredictionService;

#[cfg(test)]
/// Scripted in-process prediction service.
///
/// Records call counts, in-flight peaks and call intervals.
pub(crate) mod mock;
