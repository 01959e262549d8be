use std::io::Write;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::tally::ResultTally;
use crate::error::TransportError;
use crate::transport::proto::PredictResponse;
use crate::verdict::Verdict;
use crate::workload::Label;

/// How a single request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The server answered and the verdict accepted the answer.
    Matched,
    /// The server answered but the verdict rejected the answer.
    Mismatched,
    /// The call failed or timed out.
    Failed,
}

/// Settles one dispatched request against the shared tally.
///
/// A handler is created when a request takes its concurrency slot and is consumed
/// by [`CompletionHandler::complete`]. If it is dropped unsettled instead (the call
/// panicked, or its task was torn down with the runtime) the request is counted as
/// failed and the slot is still released, so the driver is never left waiting on a
/// completion that cannot arrive.
pub struct CompletionHandler {
    /// Position of the request in the run, for diagnostics
    index: usize,

    /// Expected answer
    label: Label,

    tally: Arc<ResultTally>,

    verdict: Arc<dyn Verdict>,

    /// Print a `.` per answered request
    progress: bool,

    settled: bool,
}

impl CompletionHandler {
    pub(crate) fn new(
        index: usize,
        label: Label,
        tally: Arc<ResultTally>,
        verdict: Arc<dyn Verdict>,
        progress: bool,
    ) -> Self {
        Self {
            index,
            label,
            tally,
            verdict,
            progress,
            settled: false,
        }
    }

    /// Classifies the call outcome and records it.
    ///
    /// # Parameters
    ///
    /// * `outcome` - Response of the call, or why it failed
    ///
    /// # Returns
    ///
    /// How the request was counted
    pub fn complete(mut self, outcome: Result<PredictResponse, TransportError>) -> Completion {
        let completion = match outcome {
            Err(err) => {
                warn!(request = self.index, error = %err, "inference request failed");
                Completion::Failed
            }
            Ok(response) => {
                if self.progress {
                    let mut out = std::io::stdout().lock();
                    let _ = out.write_all(b".");
                    let _ = out.flush();
                }
                if self.verdict.accepts(&response, &self.label) {
                    Completion::Matched
                } else {
                    debug!(request = self.index, label = ?self.label, "prediction does not match label");
                    Completion::Mismatched
                }
            }
        };

        self.settle(completion != Completion::Matched);
        completion
    }

    /// Done is counted before the slot is released.
    fn settle(&mut self, failed: bool) {
        self.settled = true;
        self.tally.record(failed);
        self.tally.dec_active();
    }
}

impl Drop for CompletionHandler {
    fn drop(&mut self) {
        if !self.settled {
            warn!(request = self.index, "request abandoned before completion");
            self.settle(true);
        }
    }
}
