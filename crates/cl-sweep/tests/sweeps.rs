//! End-to-end sweep tests against the analytic reference backend.

use std::sync::atomic::{AtomicBool, Ordering};

use cl_model::{
    Cable, CablePoint, CurrentType, Fridge, Line, Segment, SignalType, Stage, Thermalisation,
};
use cl_physics::{AnalyticModel, ExprEvaluator};
use cl_sweep::{
    Axis, CellOutcome, StageBounds, Sweep2dOptions, SweepError, sweep_model, sweep_model_2d,
};

fn stage(id: &str, index: u32, temperature: f64, cooling_power: f64) -> Stage {
    Stage {
        id: id.into(),
        index,
        temperature,
        cooling_power,
    }
}

fn curve() -> Vec<CablePoint> {
    [(0.5, 1.9), (1.0, 2.6), (5.0, 5.9), (10.0, 8.3), (20.0, 11.7)]
        .iter()
        .map(|&(frequency, attenuation)| CablePoint {
            frequency,
            attenuation,
        })
        .collect()
}

fn segment(line: &str, stage: &str, attenuation: f64) -> Segment {
    Segment {
        line_id: line.into(),
        stage_id: stage.into(),
        cable_id: "219-SS-SS".into(),
        attenuation,
        length: 0.25,
        inner_thermalisation: Thermalisation::Auto,
        dielectric_thermalisation: Thermalisation::Auto,
        outer_thermalisation: Thermalisation::Auto,
    }
}

fn wire(lines: &[&str]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for line in lines {
        for stage in ["50K", "4K", "Still", "CP", "MXC"] {
            segments.push(segment(line, stage, 0.0));
        }
    }
    segments
}

fn fridge() -> Fridge {
    Fridge {
        stages: vec![
            stage("50K", 0, 46.0, 10.0),
            stage("4K", 1, 3.94, 0.5),
            stage("Still", 2, 1.227, 30e-3),
            stage("CP", 3, 0.15, 300e-6),
            stage("MXC", 4, 0.02, 20e-6),
        ],
        cables: vec![Cable {
            id: "219-SS-SS".into(),
            diameters: [0.00051, 0.00167, 0.00219],
            thermal_conductivity_value: 4.3e-5,
            rho: 37.5e-8,
            bivariate_cable_data: curve(),
        }],
        lines: vec![
            Line {
                id: "Drive-1".into(),
                signal_type: SignalType::Drive,
                current_type: CurrentType::Ac,
                signal_power: 1e-6,
                signal_frequency: 6.0,
                input_current: 0.0,
                count: 2,
            },
            Line {
                id: "Flux-1".into(),
                signal_type: SignalType::Flux,
                current_type: CurrentType::Dc,
                signal_power: 0.0,
                signal_frequency: 0.5,
                input_current: 2e-3,
                count: 1,
            },
            Line {
                id: "Output-1".into(),
                signal_type: SignalType::Output,
                current_type: CurrentType::Ac,
                signal_power: 0.0,
                signal_frequency: 8.0,
                input_current: 0.0,
                count: 1,
            },
        ],
        segments: wire(&["Drive-1", "Flux-1", "Output-1"]),
        temperature_estimation_data: vec![],
    }
}

fn attenuation_constraints(exprs: [&str; 5]) -> Vec<String> {
    exprs.iter().map(|e| e.to_string()).collect()
}

#[test]
fn sweep_1d_smoke() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let bounds = StageBounds::default();

    let result = sweep_model(
        &model,
        &eval,
        &fridge,
        &Axis::new(0.0, 20.0, 3),
        &attenuation_constraints(["x", "0", "0", "0", "0"]),
        "Drive-1",
        true,
        &bounds,
    )
    .unwrap();

    assert_eq!(result.series("range").unwrap(), &[0.0, 10.0, 20.0]);

    for name in [
        "50K_Drive-1Passive",
        "50K_Drive-1Active",
        "MXC_Flux-1Passive",
        "4K_Output-1Passive",
        "Still_Drive-1Total",
        "4K_TotalHeatLoad",
        "CP_TotalTemperature",
        "MXC_NoisePhotons",
        "RT_NoiseCurrent",
        "total_NoiseVoltage",
    ] {
        let series = result.series(name).unwrap_or_else(|| panic!("missing {name}"));
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|v| v.is_finite()), "{name} not finite");
    }

    // No series for a synthetic Output total: output lines have one row.
    assert!(result.series("4K_Output-1Total").is_none());

    assert_eq!(
        result.line_kinds,
        vec![
            ("Drive-1".to_string(), "Passive".to_string()),
            ("Drive-1".to_string(), "Active".to_string()),
            ("Drive-1".to_string(), "Total".to_string()),
            ("Flux-1".to_string(), "Passive".to_string()),
            ("Flux-1".to_string(), "Active".to_string()),
            ("Flux-1".to_string(), "Total".to_string()),
            ("Output-1".to_string(), "Passive".to_string()),
        ]
    );
}

#[test]
fn sweep_1d_totals_add_up() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let bounds = StageBounds::default();

    let result = sweep_model(
        &model,
        &eval,
        &fridge,
        &Axis::new(0.0, 20.0, 3),
        &attenuation_constraints(["x", "0", "0", "0", "0"]),
        "Drive-1",
        true,
        &bounds,
    )
    .unwrap();

    let total = result.series("50K_TotalHeatLoad").unwrap();
    let drive = result.series("50K_Drive-1Total").unwrap();
    let flux = result.series("50K_Flux-1Total").unwrap();
    let output = result.series("50K_Output-1Passive").unwrap();
    for k in 0..3 {
        let sum = drive[k] + flux[k] + output[k];
        assert!((total[k] - sum).abs() <= 1e-12 * sum.abs());
    }

    let noise_total = result.series("total_NoisePhotons").unwrap();
    let mut by_hand = result.series("RT_NoisePhotons").unwrap().to_vec();
    for stage in ["50K", "4K", "Still", "CP", "MXC"] {
        let series = result.series(&format!("{stage}_NoisePhotons")).unwrap();
        for (acc, value) in by_hand.iter_mut().zip(series) {
            *acc += value;
        }
    }
    for k in 0..3 {
        assert!((noise_total[k] - by_hand[k]).abs() <= 1e-12 * by_hand[k].abs());
    }
}

#[test]
fn sweep_1d_rejects_negative_constraints() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let bounds = StageBounds::default();

    let err = sweep_model(
        &model,
        &eval,
        &fridge,
        &Axis::new(0.0, 20.0, 3),
        &attenuation_constraints(["10 - x", "0", "0", "0", "0"]),
        "Drive-1",
        true,
        &bounds,
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::NegativeConstraint { sample: 2, stage: 0, .. }));
}

#[test]
fn sweep_1d_unknown_line_fails_whole() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let err = sweep_model(
        &model,
        &eval,
        &fridge,
        &Axis::new(0.0, 20.0, 3),
        &attenuation_constraints(["x", "0", "0", "0", "0"]),
        "Drive-9",
        true,
        &StageBounds::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::Model(_)));
}

#[test]
fn sweep_2d_converges_and_is_deterministic() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let constraints = attenuation_constraints(["x", "y", "0", "0", "0"]);
    let options = Sweep2dOptions::default();

    let run = || {
        sweep_model_2d(
            &model,
            &eval,
            &fridge,
            "Drive-1",
            &Axis::new(0.0, 20.0, 3),
            &Axis::new(0.0, 10.0, 2),
            &constraints,
            &options,
            None,
        )
        .unwrap()
    };
    let first = run();
    let second = run();

    // Grids are reflected: y-major rows, x-major columns.
    assert_eq!(first.heat_loads.len(), 2);
    assert_eq!(first.heat_loads[0].len(), 3);
    assert_eq!(first.x, vec![0.0, 10.0, 20.0]);
    assert_eq!(first.y, vec![0.0, 10.0]);

    for row in &first.outcomes {
        for outcome in row {
            assert_eq!(*outcome, CellOutcome::Converged);
        }
    }
    for (row_a, row_b) in first.heat_loads.iter().zip(&second.heat_loads) {
        assert_eq!(row_a, row_b);
    }
    for (row_a, row_b) in first.temperatures.iter().zip(&second.temperatures) {
        assert_eq!(row_a, row_b);
    }
    for (row_a, row_b) in first.noise.iter().zip(&second.noise) {
        assert_eq!(row_a, row_b);
    }

    for row in &first.temperatures {
        for cell in row {
            for stage in ["50K", "4K", "Still", "CP", "MXC"] {
                assert!(cell[stage].is_finite());
                assert!(cell[stage] > 0.0);
            }
        }
    }
    for row in &first.noise {
        for cell in row {
            assert!(cell.photons > 0.0);
            assert!(cell.voltage > 0.0);
            assert!(cell.current > 0.0);
        }
    }
}

#[test]
fn sweep_2d_parallel_matches_serial() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let constraints = attenuation_constraints(["x", "y", "0", "0", "0"]);

    let serial = sweep_model_2d(
        &model,
        &eval,
        &fridge,
        "Drive-1",
        &Axis::new(0.0, 20.0, 3),
        &Axis::new(0.0, 10.0, 3),
        &constraints,
        &Sweep2dOptions::default(),
        None,
    )
    .unwrap();
    let parallel = sweep_model_2d(
        &model,
        &eval,
        &fridge,
        "Drive-1",
        &Axis::new(0.0, 20.0, 3),
        &Axis::new(0.0, 10.0, 3),
        &constraints,
        &Sweep2dOptions {
            parallel: true,
            ..Sweep2dOptions::default()
        },
        None,
    )
    .unwrap();

    assert_eq!(serial.heat_loads, parallel.heat_loads);
    assert_eq!(serial.temperatures, parallel.temperatures);
    assert_eq!(serial.noise, parallel.noise);
    assert_eq!(serial.outcomes, parallel.outcomes);
}

#[test]
fn sweep_2d_infeasible_cell_is_zero_filled() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    // At (x, y) = (10, 10) the MXC expression goes negative.
    let constraints = attenuation_constraints(["x", "y", "0", "0", "10 - x - y"]);

    let result = sweep_model_2d(
        &model,
        &eval,
        &fridge,
        "Drive-1",
        &Axis::new(0.0, 10.0, 2),
        &Axis::new(0.0, 10.0, 2),
        &constraints,
        &Sweep2dOptions::default(),
        None,
    )
    .unwrap();

    let infeasible: usize = result
        .outcomes
        .iter()
        .flatten()
        .filter(|o| **o == CellOutcome::Infeasible)
        .count();
    assert_eq!(infeasible, 1);

    // Cell (x=10, y=10) lands at reflected position [0][1].
    assert_eq!(result.outcomes[0][1], CellOutcome::Infeasible);
    for stage in ["50K", "4K", "Still", "CP", "MXC"] {
        assert_eq!(result.heat_loads[0][1][stage], 0.0);
        assert_eq!(result.temperatures[0][1][stage], 0.0);
    }
    assert_eq!(result.noise[0][1].photons, 0.0);
}

#[test]
fn sweep_2d_out_of_window_cell_degrades() {
    let model = AnalyticModel::default();
    let mut fridge = fridge();
    // A 0.1 A flux current dissipates milliwatts at MXC, far past its window.
    for line in fridge.lines.iter_mut().filter(|l| l.id == "Flux-1") {
        line.input_current = 0.1;
    }
    let eval = ExprEvaluator;

    let result = sweep_model_2d(
        &model,
        &eval,
        &fridge,
        "Drive-1",
        &Axis::new(0.0, 10.0, 2),
        &Axis::new(0.0, 10.0, 2),
        &attenuation_constraints(["x", "y", "0", "0", "0"]),
        &Sweep2dOptions::default(),
        None,
    )
    .unwrap();

    for row in result.outcomes.iter().zip(result.temperatures.iter()) {
        let (outcomes, temps) = row;
        for (outcome, cell) in outcomes.iter().zip(temps) {
            assert_eq!(*outcome, CellOutcome::OutOfBounds);
            for stage in ["50K", "4K", "Still", "CP", "MXC"] {
                assert_eq!(cell[stage], 0.0);
            }
        }
    }
}

#[test]
fn sweep_2d_iteration_cap_degrades_the_cell() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();

    let result = sweep_model_2d(
        &model,
        &eval,
        &fridge,
        "Drive-1",
        &Axis::new(0.0, 10.0, 2),
        &Axis::new(0.0, 10.0, 2),
        &attenuation_constraints(["x", "y", "0", "0", "0"]),
        &Sweep2dOptions {
            max_iterations: 0,
            ..Sweep2dOptions::default()
        },
        None,
    )
    .unwrap();

    for row in &result.outcomes {
        for outcome in row {
            assert_eq!(*outcome, CellOutcome::MaxIterations);
        }
    }
    for row in &result.noise {
        for cell in row {
            assert_eq!(cell.photons, 0.0);
        }
    }
}

#[test]
fn sweep_2d_cancellation_aborts() {
    let model = AnalyticModel::default();
    let eval = ExprEvaluator;
    let fridge = fridge();
    let cancel = AtomicBool::new(false);
    cancel.store(true, Ordering::Relaxed);

    let err = sweep_model_2d(
        &model,
        &eval,
        &fridge,
        "Drive-1",
        &Axis::new(0.0, 10.0, 2),
        &Axis::new(0.0, 10.0, 2),
        &attenuation_constraints(["x", "y", "0", "0", "0"]),
        &Sweep2dOptions::default(),
        Some(&cancel),
    )
    .unwrap_err();
    assert_eq!(err, SweepError::Cancelled);
}
