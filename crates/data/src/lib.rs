//! Data providers feeding the engine.
//!
//! The engine never fetches anything itself. Snapshots, strategy catalogs and
//! historical prices arrive through the traits in [`providers`], with
//! JSON-file and in-memory implementations.

/// Provider error type.
pub mod error;
/// Prelude module for convenient imports.
pub mod prelude;
/// Provider traits and implementations.
pub mod providers;

pub use error::{DataError, DataResult};
