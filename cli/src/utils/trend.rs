use crate::error::{AnalyticsError, InsufficientReason, Result};
use crate::models::{ForecastPoint, ModelStats, PredictionResult, Series, TrendPoint};
use crate::utils::change_stats::compute_changes;
use crate::utils::date::following_calendar_days;
use crate::utils::numeric::{r_squared, round_to};
use crate::utils::regression::{fit_polynomial, PolynomialFit, RegressionError};
use tracing::debug;

/// Fewest historical closes the trend models are fitted on.
pub const MIN_FIT_POINTS: usize = 10;

/// Calendar days extrapolated past the last bar.
pub const DEFAULT_FORECAST_HORIZON: usize = 7;

/// Linear and quadratic trend fitted independently over trading-day ordinals.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendModel {
    linear: PolynomialFit,
    quadratic: PolynomialFit,
    linear_r_squared: f64,
    data_points: usize,
}

impl TrendModel {
    pub fn fit(closes: &[f64]) -> std::result::Result<Self, InsufficientReason> {
        if closes.len() < MIN_FIT_POINTS {
            return Err(InsufficientReason::TooFewPoints {
                actual: closes.len(),
                required: MIN_FIT_POINTS,
            });
        }

        let degenerate = |e: RegressionError| InsufficientReason::DegenerateFit(e.to_string());
        let linear = fit_polynomial(closes, 1).map_err(degenerate)?;
        let quadratic = fit_polynomial(closes, 2).map_err(degenerate)?;
        let linear_r_squared = r_squared(closes, &linear.fitted(closes.len()));

        Ok(Self {
            linear,
            quadratic,
            linear_r_squared,
            data_points: closes.len(),
        })
    }

    pub fn linear(&self) -> &PolynomialFit {
        &self.linear
    }

    pub fn quadratic(&self) -> &PolynomialFit {
        &self.quadratic
    }

    /// Unrounded R² of the linear model on the fitted data.
    pub fn linear_r_squared(&self) -> f64 {
        self.linear_r_squared
    }

    pub fn data_points(&self) -> usize {
        self.data_points
    }

    /// `(linear, quadratic)` at ordinals `n..n + horizon`.
    pub fn forecast(&self, horizon: usize) -> Vec<(f64, f64)> {
        (self.data_points..self.data_points + horizon)
            .map(|ordinal| {
                let x = ordinal as f64;
                (self.linear.evaluate(x), self.quadratic.evaluate(x))
            })
            .collect()
    }
}

/// Fit both trend models to `series`, attach change statistics and
/// extrapolate `horizon` calendar days past its last bar.
pub fn predict_series(series: &Series, horizon: usize) -> Result<PredictionResult> {
    let closes = series.closes();
    let model = TrendModel::fit(&closes).map_err(|reason| AnalyticsError::InsufficientData {
        ticker: series.ticker().to_string(),
        reason,
    })?;

    let linear_fit = model.linear().fitted(closes.len());
    let poly_fit = model.quadratic().fitted(closes.len());
    let changes = compute_changes(&closes);

    let historical = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| TrendPoint {
            date: bar.date,
            actual_close: round_to(bar.close, 2),
            linear_fit: round_to(linear_fit[i], 2),
            poly_fit: round_to(poly_fit[i], 2),
            daily_change_pct: round_to(changes.daily_change_pct[i], 2),
            cumulative_change_pct: round_to(changes.cumulative_change_pct[i], 2),
            volume: bar.volume,
        })
        .collect();

    // A non-empty series is guaranteed by the minimum point check above.
    let forecast_dates = series
        .last_date()
        .map(|last| following_calendar_days(last, horizon))
        .unwrap_or_default();

    let forecast = forecast_dates
        .into_iter()
        .zip(model.forecast(horizon))
        .map(|(date, (linear, quadratic))| ForecastPoint {
            date,
            linear_fit: round_to(linear, 2),
            poly_fit: round_to(quadratic, 2),
        })
        .collect();

    debug!(
        ticker = series.ticker(),
        points = model.data_points(),
        r_squared = model.linear_r_squared(),
        horizon,
        "Fitted trend models"
    );

    Ok(PredictionResult {
        ticker: series.ticker().to_string(),
        historical,
        forecast,
        stats: ModelStats {
            linear_r_squared: round_to(model.linear_r_squared(), 3),
            data_points: model.data_points(),
            forecast_horizon_days: horizon,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;
    use crate::utils::date::{format_date, parse_date};
    use chrono::Duration;

    fn series_from_closes(start: &str, closes: &[f64]) -> Series {
        let start = parse_date(start).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c, c, c, c, 1_000 + i as u64))
            .collect();
        Series::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_perfect_line_scores_one_and_extrapolates() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let result = predict_series(&series_from_closes("2024-01-01", &closes), 7).unwrap();

        assert_eq!(result.stats.linear_r_squared, 1.0);
        assert_eq!(result.stats.data_points, 20);
        assert_eq!(result.stats.forecast_horizon_days, 7);
        assert_eq!(result.forecast[0].linear_fit, 140.0);
        assert_eq!(result.forecast[6].linear_fit, 152.0);
        assert_eq!(result.forecast[0].poly_fit, 140.0);
        assert_eq!(result.historical[5].linear_fit, 110.0);
    }

    #[test]
    fn test_minimum_point_boundary() {
        let nine: Vec<f64> = (0..9).map(|i| 10.0 + i as f64).collect();
        let err = predict_series(&series_from_closes("2024-01-01", &nine), 7).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData {
                reason: InsufficientReason::TooFewPoints { actual: 9, required: 10 },
                ..
            }
        ));

        let ten: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        assert!(predict_series(&series_from_closes("2024-01-01", &ten), 7).is_ok());
    }

    #[test]
    fn test_forecast_dates_use_raw_calendar_days() {
        // Ten daily bars ending on 2024-01-10.
        let closes: Vec<f64> = (0..10).map(|i| 50.0 + i as f64).collect();
        let result = predict_series(&series_from_closes("2024-01-01", &closes), 7).unwrap();

        let dates: Vec<String> = result.forecast.iter().map(|p| format_date(p.date)).collect();
        assert_eq!(
            dates,
            vec![
                "2024-01-11", "2024-01-12", "2024-01-13", "2024-01-14", "2024-01-15", "2024-01-16",
                "2024-01-17"
            ]
        );
    }

    #[test]
    fn test_historical_points_carry_change_statistics() {
        let closes = [100.0, 110.0, 99.0, 105.0, 107.0, 108.0, 111.0, 109.0, 112.0, 115.0];
        let result = predict_series(&series_from_closes("2024-03-01", &closes), 3).unwrap();

        let first = &result.historical[0];
        assert_eq!(first.daily_change_pct, 0.0);
        assert_eq!(first.cumulative_change_pct, 0.0);
        assert_eq!(first.actual_close, 100.0);
        assert_eq!(first.volume, 1_000);
        assert_eq!(result.historical[1].daily_change_pct, 10.0);
        assert_eq!(result.historical[2].daily_change_pct, -10.0);
        assert_eq!(result.historical[9].cumulative_change_pct, 15.0);
        assert_eq!(result.forecast.len(), 3);
        assert!(result.stats.linear_r_squared <= 1.0);
    }

    #[test]
    fn test_refitting_own_input_is_bit_identical() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 200.0 + (i as f64 / 4.0).cos() * 7.0 - i as f64 * 0.2)
            .collect();
        let first = TrendModel::fit(&closes).unwrap();
        let second = TrendModel::fit(&closes).unwrap();
        assert_eq!(first.linear().coefficients(), second.linear().coefficients());
        assert_eq!(first.quadratic().coefficients(), second.quadratic().coefficients());
        assert_eq!(first.linear_r_squared().to_bits(), second.linear_r_squared().to_bits());
    }

    #[test]
    fn test_non_finite_close_is_insufficient_data() {
        let mut closes: Vec<f64> = (0..12).map(|i| 10.0 + i as f64).collect();
        closes[4] = f64::INFINITY;
        let err = predict_series(&series_from_closes("2024-01-01", &closes), 7).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData {
                reason: InsufficientReason::DegenerateFit(_),
                ..
            }
        ));
    }

    #[test]
    fn test_flat_series_is_fitted() {
        let closes = vec![25.0; 12];
        let result = predict_series(&series_from_closes("2024-01-01", &closes), 7).unwrap();
        assert_eq!(result.stats.linear_r_squared, 1.0);
        assert!(result.forecast.iter().all(|p| p.linear_fit == 25.0 && p.poly_fit == 25.0));
    }
}
