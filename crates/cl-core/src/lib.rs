//! cl-core: stable foundation for cryoline.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{ClError, ClResult};
pub use numeric::*;
