use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{HistoricalSeries, PredictionResult};

pub const CHART_WIDTH: u32 = 1024;
pub const CHART_HEIGHT: u32 = 576;

type ChartPoint = (DateTime<Utc>, f64);

/// Render target on disk, removed when dropped whether drawing succeeded or not
struct TempChartFile(PathBuf);

impl TempChartFile {
    fn new() -> Self {
        TempChartFile(std::env::temp_dir().join(format!("cryptocast_chart_{}.png", uuid::Uuid::new_v4())))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempChartFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

/// History converted to plot coordinates, plus the projected point
/// `timeframe.days()` after the last sample.
pub fn chart_points(
    series: &HistoricalSeries,
    prediction: &PredictionResult,
) -> Result<(Vec<ChartPoint>, ChartPoint), String> {
    let history: Vec<ChartPoint> = series
        .prices
        .iter()
        .filter_map(|p| p.datetime().map(|t| (t, p.price)))
        .collect();

    if history.len() < 2 {
        return Err("❌ Not enough price data to generate chart (minimum 2 points required).".to_string());
    }

    let last_time = history[history.len() - 1].0;
    let predicted_at = last_time + Duration::days(prediction.timeframe.days() as i64);

    Ok((history, (predicted_at, prediction.predicted_price)))
}

/// Render the price history with the prediction highlighted, as PNG bytes
pub fn generate_prediction_chart(
    coin_name: &str,
    series: &HistoricalSeries,
    prediction: &PredictionResult,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    let (history, predicted) = chart_points(series, prediction)?;

    // BitMapBackend renders to a path, so go through a temporary file
    let temp_file = TempChartFile::new();

    {
        let backend = BitMapBackend::new(temp_file.path(), (width, height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| format!("Failed to fill canvas: {}", e))?;

        // Y range covers history and the prediction, with 10% padding
        let (low, high) = series.price_range().unwrap_or((predicted.1, predicted.1));
        let min_price = low.min(predicted.1);
        let max_price = high.max(predicted.1);

        let price_range = (max_price - min_price).max(1e-8);
        let padding = price_range * 0.1;
        let y_min = (min_price - padding).max(0.0);
        let y_max = max_price + padding;

        // X range runs from the first sample to the predicted date
        let x_min = history[0].0;
        let x_max = predicted.0;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} Price History with Prediction", coin_name),
                ("sans-serif", 32.0).into_font(),
            )
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| format!("Failed to build chart: {}", e))?;

        // Configure mesh
        chart
            .configure_mesh()
            .y_desc("Price (USD)")
            .x_desc("Date")
            .x_label_formatter(&|t: &DateTime<Utc>| t.format("%b %d").to_string())
            .draw()
            .map_err(|e| format!("Failed to draw mesh: {}", e))?;

        // Draw price history
        chart
            .draw_series(LineSeries::new(history.iter().copied(), &BLUE))
            .map_err(|e| format!("Failed to draw history: {}", e))?
            .label("Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        // Projection from the last sample to the prediction
        let last = history[history.len() - 1];
        let prediction_color = if prediction.is_gain() { GREEN } else { RED };

        chart
            .draw_series(LineSeries::new(vec![last, predicted], prediction_color.stroke_width(2)))
            .map_err(|e| format!("Failed to draw projection: {}", e))?;

        chart
            .draw_series(std::iter::once(Circle::new(predicted, 6, prediction_color.filled())))
            .map_err(|e| format!("Failed to draw prediction: {}", e))?
            .label(format!("Predicted ({})", prediction.timeframe.label()))
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, prediction_color.filled()));

        // Draw legend
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| format!("Failed to draw legend: {}", e))?;

        root.present()
            .map_err(|e| format!("Failed to render chart: {}", e))?;
    }

    fs::read(temp_file.path())
        .map_err(|e| format!("Failed to read chart file: {}", e))
}
