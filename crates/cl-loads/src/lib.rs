//! cl-loads: per-line heat-load and noise aggregation.
//!
//! Resolves each line's cable and stage-ordered segments, drives the external
//! physics evaluator, and normalizes/sums the per-line records into per-stage
//! totals. The canonical row order produced by
//! [`generate_line_load_outputs`] is what both sweep engines index into.

pub mod aggregate;
pub mod error;
pub mod noise;
pub mod output;

pub use aggregate::{
    AC_ACTIVE_SCALE, DC_ACTIVE_SCALE, active_drive_load, active_flux_load,
    apply_line_transformations, cable_attenuation, generate_line_load_outputs,
    line_cable_attenuation_points, passive_drive_load, passive_flux_load, passive_output_load,
    sum_line_load_outputs,
};
pub use error::{LoadError, LoadResult};
pub use noise::{drive_noise, flux_noise};
pub use output::{LineLoadOutput, LoadKind};
