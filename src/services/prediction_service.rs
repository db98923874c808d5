use thiserror::Error;

use crate::models::{Asset, HistoricalSeries, PredictionResult, PricePoint, Timeframe};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Prediction horizon must be at least 1 step")]
    InvalidHorizon,
}

/// A series plus how many sampling steps past its end to extrapolate
#[derive(Debug, Clone)]
pub struct PredictionRequest<'a> {
    series: &'a HistoricalSeries,
    horizon_steps: u32,
}

impl<'a> PredictionRequest<'a> {
    pub fn new(series: &'a HistoricalSeries, horizon_steps: u32) -> Result<Self, PredictionError> {
        if horizon_steps == 0 {
            return Err(PredictionError::InvalidHorizon);
        }
        Ok(Self { series, horizon_steps })
    }

    pub fn predict(&self) -> f64 {
        predict(&self.series.prices, self.horizon_steps)
    }
}

/// Extrapolate a least-squares trend line `horizon_steps` past the end of `prices`.
///
/// The regression runs over the point index (0..n), not the timestamps, so
/// irregularly spaced samples are treated as uniform. Fewer than two points
/// yield 0. An extrapolation that is not positive falls back to the last
/// observed price.
pub fn predict(prices: &[PricePoint], horizon_steps: u32) -> f64 {
    let n = prices.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, point) in prices.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += point.price;
        sum_xy += x * point.price;
        sum_xx += x * x;
    }

    let denominator = n_f * sum_xx - sum_x * sum_x;
    let slope = if denominator == 0.0 {
        0.0
    } else {
        (n_f * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / n_f;

    let predicted = slope * (n_f + horizon_steps as f64) + intercept;

    // NaN fails the comparison too and takes the fallback
    if predicted > 0.0 {
        predicted
    } else {
        prices[n - 1].price
    }
}

/// Percent move from the live spot price to `predicted`; 0 when spot is unusable
pub fn percentage_change(predicted: f64, spot_price: f64) -> f64 {
    if !spot_price.is_finite() || spot_price <= 0.0 {
        return 0.0;
    }
    (predicted - spot_price) / spot_price * 100.0
}

/// One prediction per offered timeframe, in `Timeframe::ALL` order
pub fn build_predictions(asset: &Asset, series: &HistoricalSeries) -> Result<Vec<PredictionResult>, PredictionError> {
    Timeframe::ALL
        .iter()
        .map(|&timeframe| {
            let predicted_price = PredictionRequest::new(series, timeframe.days())?.predict();
            Ok(PredictionResult {
                coin: asset.name.clone(),
                current_price: asset.current_price,
                predicted_price,
                percentage_change: percentage_change(predicted_price, asset.current_price),
                timeframe,
            })
        })
        .collect()
}

pub fn select(predictions: &[PredictionResult], timeframe: Timeframe) -> Option<&PredictionResult> {
    predictions.iter().find(|p| p.timeframe == timeframe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(1_700_000_000_000 + i as i64 * 86_400_000, p))
            .collect()
    }

    fn asset(price: f64) -> Asset {
        Asset {
            id: "bitcoin".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "btc".to_string(),
            current_price: price,
            image: String::new(),
            price_change_percentage_24h: Some(1.0),
            market_cap: Some(1.0e12),
        }
    }

    #[test]
    fn test_linear_series_extrapolates() {
        let prices = series(&[100.0, 110.0, 120.0, 130.0]);
        assert_eq!(predict(&prices, 7), 210.0);
    }

    #[test]
    fn test_two_points_closed_form() {
        let (p0, p1) = (40.0, 45.0);
        let prices = series(&[p0, p1]);
        for h in [1u32, 3, 30] {
            let expected = p0 + (p1 - p0) * (2.0 + h as f64);
            assert!((predict(&prices, h) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_short_series_returns_zero() {
        assert_eq!(predict(&[], 7), 0.0);
        assert_eq!(predict(&series(&[50.0]), 1), 0.0);
        assert_eq!(predict(&series(&[50.0]), 90), 0.0);
    }

    #[test]
    fn test_negative_extrapolation_clamps_to_last_price() {
        let prices = vec![PricePoint::new(0, 10.0), PricePoint::new(0, 5.0)];
        assert_eq!(predict(&prices, 1000), 5.0);
    }

    #[test]
    fn test_zero_extrapolation_clamps_to_last_price() {
        // 15 - 5 * (2 + 1) is exactly zero
        let prices = series(&[15.0, 10.0]);
        assert_eq!(predict(&prices, 1), 10.0);
    }

    #[test]
    fn test_increasing_series_predicts_at_least_last_price() {
        let prices = series(&[1.0, 2.5, 2.7, 4.0, 9.0]);
        let last = prices.last().unwrap().price;
        for h in [1u32, 7, 30, 90] {
            assert!(predict(&prices, h) >= last);
        }
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let prices = series(&[3.1, 2.9, 3.4, 3.3, 3.8, 3.6]);
        let first = predict(&prices, 30);
        let second = predict(&prices, 30);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_nan_prices_fall_back_to_last_price() {
        let prices = series(&[1.0, f64::NAN, 3.0]);
        assert_eq!(predict(&prices, 7), 3.0);
    }

    #[test]
    fn test_request_rejects_zero_horizon() {
        let data = HistoricalSeries::new(series(&[1.0, 2.0]));
        assert_eq!(PredictionRequest::new(&data, 0).unwrap_err(), PredictionError::InvalidHorizon);
        assert_eq!(PredictionRequest::new(&data, 1).unwrap().predict(), 4.0);
    }

    #[test]
    fn test_every_timeframe_is_a_valid_horizon() {
        let data = HistoricalSeries::new(series(&[1.0, 2.0]));
        for timeframe in Timeframe::ALL {
            let request = PredictionRequest::new(&data, timeframe.days()).unwrap();
            assert_eq!(request.predict(), 2.0 + timeframe.days() as f64 + 1.0);
        }
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(110.0, 100.0), 10.0);
        assert_eq!(percentage_change(50.0, 100.0), -50.0);
        assert_eq!(percentage_change(50.0, 0.0), 0.0);
    }

    #[test]
    fn test_build_predictions_uses_spot_price() {
        let data = HistoricalSeries::new(series(&[100.0, 110.0, 120.0, 130.0]));
        let predictions = build_predictions(&asset(200.0), &data).unwrap();

        assert_eq!(predictions.len(), 3);
        let week = select(&predictions, Timeframe::Week).unwrap();
        assert_eq!(week.predicted_price, 210.0);
        assert_eq!(week.current_price, 200.0);
        assert!((week.percentage_change - 5.0).abs() < 1e-9);
        assert_eq!(week.coin, "Bitcoin");

        let quarter = select(&predictions, Timeframe::Quarter).unwrap();
        assert_eq!(quarter.predicted_price, 10.0 * (4.0 + 90.0) + 100.0);
    }

    #[test]
    fn test_build_predictions_on_empty_series() {
        let predictions = build_predictions(&asset(200.0), &HistoricalSeries::default()).unwrap();
        assert!(predictions.iter().all(|p| p.predicted_price == 0.0));
        assert!(predictions.iter().all(|p| p.percentage_change == -100.0));
    }
}
