//! Request orchestration for the normalized entity store.
//!
//! A caller describes one network operation as a [`RequestIntent`] and hands
//! it to [`Orchestrator::dispatch`]. Each intent runs as its own task:
//!
//! ```text
//! Dispatched ──► InFlight ──┬──► Succeeded  (normalize, merge, success hook)
//!                           └──► Failed     (replace error set, fail hook)
//! ```
//!
//! Transport calls run concurrently; completions are applied one at a time
//! by a single writer task, in the order they arrive.

pub mod aggregator;
pub mod completion;
pub mod error;
pub mod intent;
pub mod orchestrator;
pub mod state;
pub mod transport;

pub use aggregator::{ErrorAggregator, ErrorSet, GLOBAL_ERROR_KEY};
pub use completion::{Completion, FailureKind, Outcome};
pub use error::{OrchestratorError, Result};
pub use intent::{Hook, NormalizeFn, Normalizer, RequestIntent};
pub use orchestrator::{Orchestrator, RequestHandle};
pub use state::{RETAINED_FINISHED_REQUESTS, RequestState, StatusTable};
pub use transport::{ApiResponse, InMemoryTransport, OutgoingRequest, Transport, TransportError};
