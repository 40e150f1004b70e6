//! Return-curve rendering.

use std::error::Error;
use std::fmt;
use std::path::Path;

use plotters::prelude::*;

/// Failure while rendering or writing the return curve.
#[derive(Debug)]
pub struct PlotError {
    message: String,
}

impl PlotError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plot error: {}", self.message)
    }
}

impl Error for PlotError {}

/// Renders the mean-return curve to a PNG at `path`. Points are
/// `(cumulative environment interactions, mean return)` per epoch.
///
/// Drawn text-free (frame and polyline only) so no font stack is
/// required at build or run time.
pub fn render_return_curve(points: &[(usize, f32)], path: &Path) -> Result<(), PlotError> {
    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PlotError::new(e.to_string()))?;

    if points.is_empty() {
        return root.present().map_err(|e| PlotError::new(e.to_string()));
    }

    let x_max = points.iter().map(|&(x, _)| x).max().unwrap_or(1) as f64;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(_, y) in points {
        y_min = y_min.min(y as f64);
        y_max = y_max.max(y as f64);
    }
    if !(y_max - y_min).is_finite() || y_max - y_min < 1e-6 {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let y_pad = (y_max - y_min) * 0.05;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0.0..x_max.max(1.0), (y_min - y_pad)..(y_max + y_pad))
        .map_err(|e| PlotError::new(e.to_string()))?;
    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y)| (x as f64, y as f64)),
            &BLUE,
        ))
        .map_err(|e| PlotError::new(e.to_string()))?;

    root.present().map_err(|e| PlotError::new(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_curve_to_png() {
        let path = std::env::temp_dir().join("vpg_rl_plot_test.png");
        let points = vec![(4000, 20.0), (8000, 35.5), (12000, 60.0)];
        render_return_curve(&points, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        // PNG magic
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_empty_and_flat_curves_render() {
        let path = std::env::temp_dir().join("vpg_rl_plot_empty_test.png");
        render_return_curve(&[], &path).unwrap();
        render_return_curve(&[(1, 5.0), (2, 5.0)], &path).unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
