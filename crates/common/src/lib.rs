//! Shared identifiers used across the entity cache crates.

pub mod types;

pub use types::{EntityId, Method, ParseMethodError, RequestId};
