use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

use crate::error::TransportError;
use super::core_trait::PredictionService;
use super::proto::{PredictRequest, PredictResponse, TensorProto};

/// What the mock does for the n-th call it receives.
#[derive(Clone, Debug)]
pub enum Scripted {
    /// Answer with these values under the `probabilities` output.
    Respond(Vec<f32>),
    /// Resolve with a gRPC `UNAVAILABLE` status.
    Fail,
    /// Never answer; the caller's deadline has to fire.
    Hang,
    /// Panic inside the call.
    Panic,
}

type Script = Box<dyn Fn(usize) -> Scripted + Send + Sync>;

/// In-process service with scripted outcomes and instrumentation.
pub struct MockService {
    script: Script,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    intervals: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

/// Tracks one call; dropping it ends the call even when the future is cancelled.
struct InFlight {
    started: Instant,
    in_flight: Arc<AtomicUsize>,
    intervals: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.intervals
            .lock()
            .unwrap()
            .push((self.started, Instant::now()));
    }
}

impl MockService {
    pub fn new(script: impl Fn(usize) -> Scripted + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            intervals: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Every call answers with `values`.
    pub fn always(values: Vec<f32>) -> Self {
        Self::new(move |_| Scripted::Respond(values.clone()))
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Start and end instants of every finished call, sorted by start.
    pub fn intervals(&self) -> Vec<(Instant, Instant)> {
        let mut intervals = self.intervals.lock().unwrap().clone();
        intervals.sort_by_key(|(start, _)| *start);
        intervals
    }

    /// Scrambled but deterministic latency between 1 and 17 ms.
    fn latency(call: usize) -> Duration {
        Duration::from_millis(((call * 7919 + 13) % 17) as u64 + 1)
    }
}

#[async_trait]
impl PredictionService for MockService {
    async fn predict(
        &self,
        _request: PredictRequest,
        _timeout: Duration,
    ) -> Result<PredictResponse, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight {
            started: Instant::now(),
            in_flight: self.in_flight.clone(),
            intervals: self.intervals.clone(),
        };

        time::sleep(Self::latency(call)).await;
        match (self.script)(call) {
            Scripted::Respond(values) => {
                let len = values.len() as i64;
                Ok(PredictResponse::default()
                    .with_output("probabilities", TensorProto::float(values, &[1, len])))
            }
            Scripted::Fail => Err(tonic::Status::unavailable("scripted failure").into()),
            Scripted::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Scripted::Panic => panic!("scripted panic in call {call}"),
        }
    }
}
