//! Final summary of a run.

use std::fmt;
use std::time::Duration;

/// Aggregate outcome of one driver pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Requests issued.
    pub total: usize,
    /// Requests that failed or did not match their label.
    pub errors: usize,
    /// Concurrency budget the run was held to.
    pub concurrency: usize,
    /// `errors / total`, `0.0` for an empty run.
    pub error_rate: f64,
    /// Wall-clock time from first dispatch to last completion.
    pub elapsed: Duration,
}

impl RunReport {
    /// Error rate as a percentage.
    pub fn error_percent(&self) -> f64 {
        self.error_rate * 100.0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inference error rate: {}%", self.error_percent())?;
        write!(
            f,
            "Cost {:.6} seconds to predict {} instance with {} threads",
            self.elapsed.as_secs_f64(),
            self.total,
            self.concurrency
        )
    }
}
