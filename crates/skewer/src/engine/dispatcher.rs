use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::handler::{Completion, CompletionHandler};
use crate::engine::tally::ResultTally;
use crate::error::TransportError;
use crate::transport::PredictionService;
use crate::verdict::Verdict;
use crate::workload::TestCase;

/// Issues requests against a [`PredictionService`] under the tally's concurrency cap.
///
/// Each dispatch claims a slot, spawns the call as its own task and returns at once;
/// the attached [`CompletionHandler`] settles the request when the call resolves.
pub struct RequestDispatcher {
    service: Arc<dyn PredictionService>,
    tally: Arc<ResultTally>,
    verdict: Arc<dyn Verdict>,

    /// Deadline for each call
    timeout: Duration,

    progress: bool,
}

impl RequestDispatcher {
    pub fn new(
        service: Arc<dyn PredictionService>,
        tally: Arc<ResultTally>,
        verdict: Arc<dyn Verdict>,
        timeout: Duration,
        progress: bool,
    ) -> Self {
        Self {
            service,
            tally,
            verdict,
            timeout,
            progress,
        }
    }

    /// Sends one request.
    ///
    /// Suspends while the concurrency budget is exhausted, then returns as soon as
    /// the call is in flight. Call failures never surface here; they are counted by
    /// the completion handler.
    ///
    /// # Parameters
    ///
    /// * `index` - Position of the request in the run
    /// * `case` - The request and its expected label
    ///
    /// # Returns
    ///
    /// Handle of the task running the call. Dropping it detaches the task.
    pub async fn dispatch(&self, index: usize, case: TestCase) -> JoinHandle<Completion> {
        self.tally.throttle().await;

        let handler = CompletionHandler::new(
            index,
            case.label,
            self.tally.clone(),
            self.verdict.clone(),
            self.progress,
        );
        let service = self.service.clone();
        let timeout = self.timeout;
        let request = case.request;
        debug!(request = index, "dispatching");

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, service.predict(request, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(timeout)),
            };
            handler.complete(outcome)
        })
    }
}
