//! # Dispatch Engine
//!
//! The engine issues a fixed number of requests under a concurrency budget and
//! folds their outcomes into one consistent tally.
//!
//! ## Module Structure
//!
//! * [`tally`] - Shared counters behind one lock, plus the two suspension points of a
//!   run: [`ResultTally::throttle`] (wait for a free slot) and
//!   [`ResultTally::error_rate`] (wait for every completion).
//!
//! * [`dispatcher`] - Claims a slot, spawns the call with its deadline and attaches a
//!   completion handler. Returns without waiting for the answer.
//!
//! * [`handler`] - Runs exactly once per request. Classifies the outcome, records it
//!   and releases the slot; also settles requests whose task died.
//!
//! * [`driver`] - The `Init -> Dispatching -> Draining -> Done` pass that ties the
//!   pieces together and produces a [`RunReport`](crate::report::RunReport).
//!
//! ## Concurrency
//!
//! The dispatching task is the only one that ever waits. Calls run as their own
//! tokio tasks and may complete in any order on any worker thread; the tally is the
//! only state they share with the driver.
pub mod tally;
pub mod dispatcher;
pub mod handler;
pub mod driver;

pub use dispatcher::RequestDispatcher;
pub use driver::{Driver, DriverState};
pub use handler::{Completion, CompletionHandler};
pub use tally::{ResultTally, TallySnapshot};
