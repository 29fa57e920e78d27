//! Configuration schema for the fridge topology.

use serde::{Deserialize, Serialize};

/// A temperature stage of the fridge.
///
/// Stages are totally ordered by `index`; 0 is the stage closest to room
/// temperature, larger indices are colder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub id: String,
    pub index: u32,
    /// Stage temperature (K).
    pub temperature: f64,
    /// Refrigeration capacity of the stage (W); must be positive.
    pub cooling_power: f64,
}

/// Signal category carried by a line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SignalType {
    Drive,
    Flux,
    Output,
}

/// Current type of a line; decides which of the signal parameters apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrentType {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "DC")]
    Dc,
}

/// A signal path through the fridge.
///
/// `signal_power` and `signal_frequency` apply only to AC lines,
/// `input_current` only to DC lines. `count` scales the line's contribution
/// linearly (multiple physical wires of the same type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Line {
    pub id: String,
    pub signal_type: SignalType,
    pub current_type: CurrentType,
    pub signal_power: f64,
    /// Signal frequency (GHz).
    pub signal_frequency: f64,
    /// Input current (A).
    pub input_current: f64,
    pub count: u32,
}

/// One point of a cable's frequency-dependent attenuation curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CablePoint {
    /// Frequency (GHz), strictly increasing across the curve.
    pub frequency: f64,
    /// Attenuation at that frequency (dB/m).
    pub attenuation: f64,
}

/// A coaxial cable type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cable {
    pub id: String,
    /// Inner pin, dielectric, and outer conductor diameters (m).
    pub diameters: [f64; 3],
    pub thermal_conductivity_value: f64,
    /// Material resistivity (Ohm m).
    pub rho: f64,
    /// Frequency -> attenuation curve, at least 2 points.
    pub bivariate_cable_data: Vec<CablePoint>,
}

impl Cable {
    /// Diameter label used by the conductivity lookup: the outer conductor
    /// diameter in units of 10 um, rendered with no decimals (a 2.19 mm cable
    /// becomes "219").
    pub fn diameter_label(&self) -> String {
        format!("{:.0}", self.diameters[2] * 1e5)
    }
}

/// Per-layer thermal anchoring policy of a segment.
///
/// `Auto` defers to the layer default: for the inner and dielectric layers an
/// attenuated segment is assumed anchored, the outer conductor always is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Thermalisation {
    #[default]
    Auto,
    On,
    Off,
}

impl Thermalisation {
    /// Collapse the tri-state flag into a boolean, using `default_value` for
    /// `Auto`.
    pub fn resolve(self, default_value: bool) -> bool {
        match self {
            Thermalisation::Auto => default_value,
            Thermalisation::On => true,
            Thermalisation::Off => false,
        }
    }
}

/// The wiring of one line through one stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub line_id: String,
    pub stage_id: String,
    pub cable_id: String,
    /// Attenuation installed at this stage (dB).
    pub attenuation: f64,
    /// Cable length between this stage and the previous one (m).
    pub length: f64,
    #[serde(default)]
    pub inner_thermalisation: Thermalisation,
    #[serde(default)]
    pub dielectric_thermalisation: Thermalisation,
    #[serde(default)]
    pub outer_thermalisation: Thermalisation,
}

impl Segment {
    /// Default anchoring for the inner and dielectric layers: thermalised
    /// whenever an attenuator is installed at this stage.
    pub fn attenuated(&self) -> bool {
        self.attenuation != 0.0
    }

    pub fn inner_thermalised(&self) -> bool {
        self.inner_thermalisation.resolve(self.attenuated())
    }

    pub fn dielectric_thermalised(&self) -> bool {
        self.dielectric_thermalisation.resolve(self.attenuated())
    }

    pub fn outer_thermalised(&self) -> bool {
        self.outer_thermalisation.resolve(true)
    }
}

/// One calibration point of the stage temperature-response data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TempEstimationPoint {
    pub applied_power: Vec<f64>,
    pub measured_temperature: Vec<f64>,
}
