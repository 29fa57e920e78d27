//! cl-model: fridge wiring topology for cryoline.
//!
//! A fridge is described by temperature stages, cables, signal lines, and one
//! wiring segment per line per stage. The types here are the configuration
//! schema (serde round-trippable) and are read-only inside the engine: sweeps
//! derive new `Fridge` values instead of mutating one in place.

pub mod error;
pub mod fridge;
pub mod thermal;
pub mod types;
pub mod validate;

pub use error::{ModelError, ModelResult};
pub use fridge::Fridge;
pub use thermal::{ThermalScheme, thermal_scheme};
pub use types::*;
