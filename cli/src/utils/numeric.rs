/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Percentage move from `from` to `to`. Zero or non-finite inputs give 0.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    let change = (to / from - 1.0) * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Coefficient of determination of `fitted` against `actual`.
///
/// A constant `actual` series scores 1.0 when reproduced (up to rounding noise)
/// and 0.0 otherwise.
pub fn r_squared(actual: &[f64], fitted: &[f64]) -> f64 {
    let Some(mean_actual) = mean(actual) else {
        return 0.0;
    };

    let ss_tot: f64 = actual.iter().map(|y| (y - mean_actual).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();

    if ss_tot == 0.0 {
        // Allow for floating point noise in a fit of a flat series.
        let scale: f64 = actual.iter().map(|y| y * y).sum::<f64>().max(1.0);
        if ss_res <= scale * 1e-20 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}
