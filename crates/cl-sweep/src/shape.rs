//! Output shaping: grid reorientation and NaN-aware noise evaluation.

use cl_loads::LoadError;
use cl_physics::{CryoModel, StageLoads};

use crate::error::SweepResult;

/// Point-reflect a grid for presentation: row `r` of the result is column
/// `n - 1 - r` of the input, read down the rows.
///
/// Applying it twice to a square grid is a 180-degree rotation.
pub fn rotate_2d<T: Clone>(grid: &[Vec<T>]) -> Vec<Vec<T>> {
    let Some(first) = grid.first() else {
        return Vec::new();
    };
    (0..first.len())
        .map(|index| {
            grid.iter()
                .map(|row| row[row.len() - 1 - index].clone())
                .collect()
        })
        .collect()
}

/// Replace NaN temperatures with a placeholder the evaluator accepts and
/// remember where they were. The mask is spectrum-shaped: entry 0 covers the
/// room-temperature slot and is never masked.
pub(crate) fn mask_nan_temperatures(temperatures: &[f64]) -> (Vec<f64>, Vec<bool>) {
    let mut mask = Vec::with_capacity(temperatures.len() + 1);
    mask.push(false);
    let cleaned = temperatures
        .iter()
        .map(|&t| {
            if t.is_nan() {
                mask.push(true);
                1.0
            } else {
                mask.push(false);
                t
            }
        })
        .collect();
    (cleaned, mask)
}

pub(crate) fn restore_nan(spectrum: Vec<f64>, mask: &[bool]) -> Vec<f64> {
    spectrum
        .into_iter()
        .zip(mask)
        .map(|(value, &masked)| if masked { f64::NAN } else { value })
        .collect()
}

/// Photon, current, and voltage noise spectra at one sweep point.
///
/// Each spectrum has `stage count + 1` entries with the room-temperature
/// contribution first. Stages whose temperature is the NaN sentinel are
/// masked out of the evaluator input and restored as NaN afterwards.
#[allow(clippy::too_many_arguments)]
pub(crate) fn noise_spectra(
    model: &dyn CryoModel,
    temperatures: &[f64],
    config: &[f64],
    cable_att: &[f64],
    lengths: &[f64],
    stage_ids: &[String],
    frequency: f64,
) -> SweepResult<[Vec<f64>; 3]> {
    let (cleaned, mask) = mask_nan_temperatures(temperatures);
    let photons = model.noise_photons(&cleaned, config, cable_att, lengths, stage_ids, frequency)?;
    let current = model.noise_current(&cleaned, config, cable_att, lengths, stage_ids, frequency)?;
    let voltage = model.noise_voltage(&cleaned, config, cable_att, lengths, stage_ids, frequency)?;
    Ok([
        restore_nan(photons, &mask),
        restore_nan(current, &mask),
        restore_nan(voltage, &mask),
    ])
}

pub(crate) fn stage_value(output: &StageLoads, stage_id: &str) -> SweepResult<f64> {
    Ok(output
        .get(stage_id)
        .copied()
        .ok_or_else(|| LoadError::MissingStageValue {
            stage: stage_id.to_string(),
        })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rotate_2x2_by_hand() {
        let grid = vec![vec![1, 2], vec![3, 4]];
        // Column 1 top-down, then column 0 top-down.
        assert_eq!(rotate_2d(&grid), vec![vec![2, 4], vec![1, 3]]);
        // Twice = 180-degree rotation.
        assert_eq!(rotate_2d(&rotate_2d(&grid)), vec![vec![4, 3], vec![2, 1]]);
    }

    #[test]
    fn rotate_swaps_rectangular_dimensions() {
        let grid = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let rotated = rotate_2d(&grid);
        assert_eq!(rotated.len(), 3);
        assert_eq!(rotated[0], vec![3, 6]);
        assert_eq!(rotated[2], vec![1, 4]);
    }

    #[test]
    fn mask_restores_nan_positions() {
        let (cleaned, mask) = mask_nan_temperatures(&[46.0, f64::NAN, 1.2]);
        assert_eq!(cleaned, vec![46.0, 1.0, 1.2]);
        assert_eq!(mask, vec![false, false, true, false]);

        let spectrum = restore_nan(vec![10.0, 1.0, 2.0, 3.0], &mask);
        assert_eq!(spectrum[0], 10.0);
        assert!(spectrum[2].is_nan());
        assert_eq!(spectrum[3], 3.0);
    }

    proptest! {
        #[test]
        fn rotate_preserves_multiset(rows in 1usize..8, cols in 1usize..8) {
            let grid: Vec<Vec<usize>> = (0..rows)
                .map(|r| (0..cols).map(|c| r * cols + c).collect())
                .collect();
            let rotated = rotate_2d(&grid);
            prop_assert_eq!(rotated.len(), cols);
            for row in &rotated {
                prop_assert_eq!(row.len(), rows);
            }
            let mut flat: Vec<usize> = rotated.into_iter().flatten().collect();
            flat.sort_unstable();
            prop_assert_eq!(flat, (0..rows * cols).collect::<Vec<_>>());
        }
    }
}
