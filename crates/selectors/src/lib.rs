//! Memoized derived views over the entity store.
//!
//! This crate provides the read side of the entity cache:
//! - [`DerivedViewCache`] storing computed views by selector id and key
//! - [`CachedSelector`] combining input collections, a compute function and a key function
//! - [`composite_key`] for building keys from several arguments
//! - Three concrete views: event occurrences, venues for an offerer, active bookings for an offer

pub mod cache;
pub mod key;
pub mod selector;
pub mod views;

pub use cache::DerivedViewCache;
pub use key::composite_key;
pub use selector::{CachedSelector, InputFn, collection, create_cached_selector};
pub use views::{BookingQuery, OccurrenceQuery, VenueQuery, Views};
