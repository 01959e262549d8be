//! Run configuration.
//!
//! Everything the driver needs is carried in one explicit [`RunConfig`] value; there is
//! no process-wide flag state.

use std::time::Duration;

use crate::error::ConfigError;
use crate::workload::ModelKind;

/// Hard cap on the number of requests a single run may issue.
pub const MAX_NUM_TESTS: usize = 10_000;

/// Per-request deadline used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters of a single load-test run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// `host:port` of the prediction service.
    pub server: String,

    /// Maximum number of simultaneously outstanding requests.
    pub concurrency: usize,

    /// Number of requests to issue.
    pub num_tests: usize,

    /// Deadline applied to every request. Expired requests count as errors.
    pub timeout: Duration,

    /// Which model's request payload to send.
    pub model: ModelKind,

    /// Print a `.` per successful completion.
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:8500".to_string(),
            concurrency: 1,
            num_tests: 10,
            timeout: DEFAULT_TIMEOUT,
            model: ModelKind::Bert,
            progress: true,
        }
    }
}

impl RunConfig {
    /// Checks the configuration before any work starts.
    ///
    /// # Returns
    ///
    /// `Ok(())` if a run may proceed, otherwise the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_tests > MAX_NUM_TESTS {
            return Err(ConfigError::TooManyTests {
                requested: self.num_tests,
                max: MAX_NUM_TESTS,
            });
        }
        if self.server.trim().is_empty() {
            return Err(ConfigError::MissingServer);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}
