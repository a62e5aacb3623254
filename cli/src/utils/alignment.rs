//! Multi-ticker date alignment and relative performance.
//!
//! Bars from every series are flattened into one vector, sorted by date and
//! merged into rows, so the cost is `O(B log B)` in the total number of bars
//! regardless of how many tickers are compared.

use crate::models::{AlignedRow, Bar, Series, TickerColumns};
use crate::utils::numeric::round_to;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Merge the series into one row per distinct date (union of all dates),
/// ascending. A ticker only appears in the rows for dates it has a bar on.
pub fn align_series(series: &[Series]) -> Vec<AlignedRow> {
    let total_bars: usize = series.iter().map(Series::len).sum();
    let mut entries: Vec<(NaiveDate, usize, &Bar)> = Vec::with_capacity(total_bars);

    for (series_idx, s) in series.iter().enumerate() {
        entries.extend(s.bars().iter().map(|bar| (bar.date, series_idx, bar)));
    }

    entries.sort_by_key(|(date, series_idx, _)| (*date, *series_idx));

    let mut rows: Vec<AlignedRow> = Vec::new();
    for (date, series_idx, bar) in entries {
        if rows.last().map_or(true, |row| row.date != date) {
            rows.push(AlignedRow::new(date));
        }
        if let Some(row) = rows.last_mut() {
            row.values.insert(
                series[series_idx].ticker().to_string(),
                TickerColumns {
                    close: bar.close,
                    volume: bar.volume,
                    relative_index: None,
                },
            );
        }
    }

    debug!(
        series = series.len(),
        bars = total_bars,
        rows = rows.len(),
        "Aligned series by date"
    );
    rows
}

/// Fill `relative_index` for every ticker, anchored at the ticker's first row.
///
/// Returns the base close used per ticker. Tickers whose first close is zero
/// or not finite are left without relative values and are not returned.
pub fn normalize_performance(rows: &mut [AlignedRow]) -> BTreeMap<String, f64> {
    let mut bases: HashMap<String, Option<f64>> = HashMap::new();

    for row in rows.iter_mut() {
        for (ticker, columns) in row.values.iter_mut() {
            let base = *bases.entry(ticker.clone()).or_insert_with(|| {
                let close = columns.close;
                if close != 0.0 && close.is_finite() {
                    Some(close)
                } else {
                    debug!(ticker = %ticker, close, "Skipping normalization, unusable base price");
                    None
                }
            });

            columns.relative_index = base.map(|base| round_to(columns.close / base * 100.0, 2));
        }
    }

    bases
        .into_iter()
        .filter_map(|(ticker, base)| base.map(|b| (ticker, b)))
        .collect()
}

/// Round every close to cents for output.
pub fn round_closes(rows: &mut [AlignedRow]) {
    for columns in rows.iter_mut().flat_map(|row| row.values.values_mut()) {
        columns.close = round_to(columns.close, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::parse_date;

    fn series(ticker: &str, points: &[(&str, f64)]) -> Series {
        let bars = points
            .iter()
            .map(|(d, close)| Bar::new(parse_date(d).unwrap(), *close, *close, *close, *close, 1_000))
            .collect();
        Series::new(ticker, bars).unwrap()
    }

    #[test]
    fn test_rows_are_union_of_dates() {
        let a = series("AAA", &[("2024-01-02", 10.0), ("2024-01-03", 11.0), ("2024-01-05", 12.0)]);
        let b = series("BBB", &[("2024-01-03", 20.0), ("2024-01-04", 21.0)]);
        let c = series("CCC", &[("2024-01-08", 30.0)]);

        let rows = align_series(&[a, b, c]);
        let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(
            dates,
            vec!["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-08"]
        );

        // Only present tickers contribute to a row.
        assert!(rows[0].contains("AAA") && !rows[0].contains("BBB"));
        assert_eq!(rows[1].close("AAA"), Some(11.0));
        assert_eq!(rows[1].close("BBB"), Some(20.0));
        assert!(!rows[2].contains("AAA"));
        assert_eq!(rows[4].values.len(), 1);
    }

    #[test]
    fn test_input_order_does_not_change_rows() {
        let a = series("AAA", &[("2024-01-02", 10.0), ("2024-01-04", 11.0)]);
        let b = series("BBB", &[("2024-01-03", 20.0), ("2024-01-04", 21.0)]);
        assert_eq!(align_series(&[a.clone(), b.clone()]), align_series(&[b, a]));
    }

    #[test]
    fn test_empty_series_contributes_nothing() {
        let a = series("AAA", &[("2024-01-02", 10.0)]);
        let rows = align_series(&[Series::empty("ZZZ"), a]);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].contains("ZZZ"));
        assert!(align_series(&[]).is_empty());
    }

    #[test]
    fn test_relative_index_anchors_at_each_tickers_first_row() {
        let a = series("AAA", &[("2024-01-02", 50.0), ("2024-01-03", 55.0), ("2024-01-04", 45.0)]);
        // BBB starts a day later than AAA.
        let b = series("BBB", &[("2024-01-03", 200.0), ("2024-01-04", 250.0)]);

        let mut rows = align_series(&[a, b]);
        let bases = normalize_performance(&mut rows);

        assert_eq!(bases.get("AAA"), Some(&50.0));
        assert_eq!(bases.get("BBB"), Some(&200.0));
        assert_eq!(rows[0].relative_index("AAA"), Some(100.0));
        assert_eq!(rows[1].relative_index("AAA"), Some(110.0));
        assert_eq!(rows[2].relative_index("AAA"), Some(90.0));
        assert_eq!(rows[0].relative_index("BBB"), None);
        assert_eq!(rows[1].relative_index("BBB"), Some(100.0));
        assert_eq!(rows[2].relative_index("BBB"), Some(125.0));
    }

    #[test]
    fn test_zero_base_skips_normalization() {
        let a = series("AAA", &[("2024-01-02", 0.0), ("2024-01-03", 5.0)]);
        let b = series("BBB", &[("2024-01-02", 3.0), ("2024-01-03", 4.0)]);

        let mut rows = align_series(&[a, b]);
        let bases = normalize_performance(&mut rows);

        assert!(!bases.contains_key("AAA"));
        assert!(rows.iter().all(|r| r.relative_index("AAA").is_none()));
        assert_eq!(rows[1].relative_index("BBB"), Some(133.33));
    }

    #[test]
    fn test_round_closes() {
        let a = series("AAA", &[("2024-01-02", 10.456), ("2024-01-03", 10.4449)]);
        let mut rows = align_series(&[a]);
        normalize_performance(&mut rows);
        round_closes(&mut rows);
        assert_eq!(rows[0].close("AAA"), Some(10.46));
        assert_eq!(rows[1].close("AAA"), Some(10.44));
        // Relative values come from full precision closes.
        assert_eq!(rows[1].relative_index("AAA"), Some(99.89));
    }
}
