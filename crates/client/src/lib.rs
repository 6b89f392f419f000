//! Client side of the entity cache.
//!
//! - [`Session`] bundling store, error aggregator, orchestrator and views
//! - [`HttpTransport`] sending intents to a JSON API with reqwest
//! - [`Config`] loaded from environment variables
//! - [`cli::Cli`] arguments of the `datactl` binary

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use config::Config;
pub use error::{ClientError, Result};
pub use http::HttpTransport;
pub use session::Session;
