//! Per-line load output records.

use cl_model::Line;
use cl_physics::StageLoads;

/// Category of a per-line load row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    /// Heat conducted through the cable regardless of signal activity.
    Passive,
    /// Heat deposited by the signal itself.
    Active,
}

impl LoadKind {
    /// Label used in sweep series names.
    pub fn label(self) -> &'static str {
        match self {
            LoadKind::Passive => "Passive",
            LoadKind::Active => "Active",
        }
    }
}

/// One line's per-stage load record, tagged with its origin.
#[derive(Debug, Clone)]
pub struct LineLoadOutput {
    /// Per-stage values keyed by stage id.
    pub output: StageLoads,
    /// The line that produced this record.
    pub line: Line,
    pub kind: LoadKind,
}
