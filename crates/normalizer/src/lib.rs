//! Normalization of nested API responses.
//!
//! A [`NormalizerSpec`] names which embedded fields hold entities of which
//! collection. [`normalize`] walks a payload with it and returns a flat
//! [`Normalized`] batch ready to be merged into the entity store.

pub mod error;
pub mod normalize;
pub mod spec;

pub use error::{NormalizerError, Result};
pub use normalize::{Normalized, normalize};
pub use spec::{NormalizerSpec, Rule};
