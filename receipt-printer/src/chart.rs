//! ASCII line charts
//!
//! A numeric series is resampled to exactly the canvas width, normalized to
//! integer row heights, and drawn with `*` inside a `+---+` / `|...|` frame.
//!
//! Two quirks are kept on purpose and covered by tests:
//! - series at least as long as the canvas are decimated (every
//!   `len / width`-th sample), shorter ones are linearly interpolated;
//! - the row for height 1 is never emitted.

use crate::error::{PrintError, PrintResult};

/// Canvas rows above the baseline
pub const DEFAULT_CHART_HEIGHT: usize = 10;

/// Row that is left out of the canvas
const SKIPPED_ROW: usize = 1;

/// Series mapped to integer row heights in `0..=height`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedChart {
    buckets: Vec<usize>,
    height: usize,
}

impl NormalizedChart {
    /// Row height of each canvas column
    pub fn buckets(&self) -> &[usize] {
        &self.buckets
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.buckets.len()
    }

    /// Canvas rows from the top (`height`) down to 0, without the frame
    pub fn rows(&self) -> Vec<String> {
        (0..=self.height)
            .rev()
            .filter(|&y| y != SKIPPED_ROW)
            .map(|y| {
                self.buckets
                    .iter()
                    .map(|&b| if b == y { '*' } else { ' ' })
                    .collect()
            })
            .collect()
    }
}

/// Renders series into a fixed-size framed canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRenderer {
    width: usize,
    height: usize,
}

impl ChartRenderer {
    /// Canvas for a printer `print_width` columns wide; the frame takes two
    pub fn new(print_width: usize, height: usize) -> PrintResult<Self> {
        let width = print_width.saturating_sub(2);
        if width < 2 {
            return Err(PrintError::InvalidArgument(format!(
                "print width {} leaves no room for a chart",
                print_width
            )));
        }
        if height == 0 {
            return Err(PrintError::InvalidArgument(
                "chart height must be at least 1".into(),
            ));
        }
        Ok(Self { width, height })
    }

    /// Canvas width (print width minus the frame)
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resample `series` to exactly [`width`](Self::width) points
    pub fn resample(&self, series: &[f64]) -> PrintResult<Vec<f64>> {
        validate(series)?;
        Ok(resample(series, self.width))
    }

    pub fn normalize(&self, series: &[f64]) -> PrintResult<NormalizedChart> {
        let points = self.resample(series)?;
        // interpolating a constant series can wobble by an ulp; keep it flat
        let buckets = if is_constant(series) {
            vec![self.height / 2; points.len()]
        } else {
            normalize(&points, self.height)
        };
        Ok(NormalizedChart {
            buckets,
            height: self.height,
        })
    }

    /// Framed chart, one string per printed line
    pub fn render(&self, series: &[f64]) -> PrintResult<Vec<String>> {
        let chart = self.normalize(series)?;
        let border = format!("+{}+", "-".repeat(self.width));

        let mut lines = Vec::with_capacity(self.height + 3);
        lines.push(border.clone());
        lines.extend(chart.rows().into_iter().map(|row| format!("|{}|", row)));
        lines.push(border);
        Ok(lines)
    }
}

fn validate(series: &[f64]) -> PrintResult<()> {
    if series.len() < 2 {
        return Err(PrintError::InvalidArgument(format!(
            "chart needs at least 2 samples, got {}",
            series.len()
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(PrintError::InvalidArgument(
            "chart samples must be finite".into(),
        ));
    }
    Ok(())
}

/// Decimate (len >= width) or linearly interpolate (len < width)
fn resample(series: &[f64], width: usize) -> Vec<f64> {
    let len = series.len();

    if len >= width {
        let stride = len / width;
        return (0..width).map(|i| series[i * stride]).collect();
    }

    (0..width)
        .map(|i| {
            let pos = (i * (len - 1)) as f64 / (width - 1) as f64;
            let a = pos.floor() as usize;
            let b = (pos.ceil() as usize).min(len - 1);
            let weight = pos - a as f64;
            series[a] * (1.0 - weight) + series[b] * weight
        })
        .collect()
}

fn is_constant(series: &[f64]) -> bool {
    series.windows(2).all(|w| w[0] == w[1])
}

/// Map points to `0..=height`; a flat series sits at mid-height
fn normalize(points: &[f64], height: usize) -> Vec<usize> {
    let min = points.iter().copied().fold(f64::INFINITY, f64::min);
    let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return vec![height / 2; points.len()];
    }

    points
        .iter()
        .map(|v| {
            let bucket = ((v - min) / range * height as f64).floor() as usize;
            bucket.min(height)
        })
        .collect()
}
