use crate::utils::numeric::percent_change;

/// Per-bar and cumulative percentage moves of a close series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeStatistics {
    /// `close[i] / close[i-1] - 1` in percent; the first entry is 0.
    pub daily_change_pct: Vec<f64>,
    /// `close[i] / close[0] - 1` in percent; the first entry is 0.
    pub cumulative_change_pct: Vec<f64>,
}

pub fn compute_changes(closes: &[f64]) -> ChangeStatistics {
    let Some(&first) = closes.first() else {
        return ChangeStatistics::default();
    };

    let daily_change_pct = std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| percent_change(w[0], w[1])))
        .collect();

    let cumulative_change_pct = std::iter::once(0.0)
        .chain(closes[1..].iter().map(|&close| percent_change(first, close)))
        .collect();

    ChangeStatistics {
        daily_change_pct,
        cumulative_change_pct,
    }
}
