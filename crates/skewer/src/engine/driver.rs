use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::engine::dispatcher::RequestDispatcher;
use crate::engine::tally::ResultTally;
use crate::error::ConfigError;
use crate::report::RunReport;
use crate::transport::PredictionService;
use crate::verdict::Verdict;
use crate::workload::Workload;

/// Phases of a driver pass. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DriverState {
    Init,
    Dispatching,
    Draining,
    Done,
}

/// Runs one load-test pass: issue every request, wait for all of them, report.
///
/// Construction validates the configuration, so a driver that exists is always
/// allowed to dispatch.
pub struct Driver {
    config: RunConfig,
    service: Arc<dyn PredictionService>,
    verdict: Arc<dyn Verdict>,
    state: DriverState,
}

impl Driver {
    /// Creates a driver for `config`.
    ///
    /// # Parameters
    ///
    /// * `config` - Run parameters; rejected here if invalid
    /// * `service` - Where requests are sent
    /// * `verdict` - Decides whether a response is correct
    ///
    /// # Returns
    ///
    /// The driver, or the configuration problem that prevents the run
    pub fn new(
        config: RunConfig,
        service: Arc<dyn PredictionService>,
        verdict: Arc<dyn Verdict>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            service,
            verdict,
            state: DriverState::Init,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    fn advance(&mut self, next: DriverState) {
        debug_assert!(next > self.state, "driver moved backwards: {:?} -> {:?}", self.state, next);
        debug!(from = ?self.state, to = ?next, "driver transition");
        self.state = next;
    }

    /// Issues `num_tests` requests from `workload` and waits for all of them.
    ///
    /// Requests go out one after another from the calling task; each one may wait
    /// for a concurrency slot. Individual failures are counted, never returned.
    pub async fn run<W>(mut self, workload: &W) -> RunReport
    where
        W: Workload + ?Sized,
    {
        let span = tracing::info_span!("run", run_id = %Uuid::new_v4());
        async move {
            let total = self.config.num_tests;
            let concurrency = self.config.concurrency;
            info!(total, concurrency, server = %self.config.server, "starting inference run");

            let tally = Arc::new(ResultTally::new(total, concurrency));
            let dispatcher = RequestDispatcher::new(
                self.service.clone(),
                tally.clone(),
                self.verdict.clone(),
                self.config.timeout,
                self.config.progress,
            );
            let started = Instant::now();

            self.advance(DriverState::Dispatching);
            for index in 0..total {
                // completions are observed through the tally
                let _ = dispatcher.dispatch(index, workload.case(index)).await;
            }

            self.advance(DriverState::Draining);
            let error_rate = tally.error_rate().await;
            let elapsed = started.elapsed();

            self.advance(DriverState::Done);
            let errors = tally.snapshot().errors;
            info!(errors, error_rate, elapsed_ms = elapsed.as_millis() as u64, "inference run finished");

            RunReport {
                total,
                errors,
                concurrency,
                error_rate,
                elapsed,
            }
        }
        .instrument(span)
        .await
    }
}
