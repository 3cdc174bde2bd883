//! PNG rendering for accident maps and summary charts.
//!
//! This module generates 2D scatter maps of accident locations, hotspot maps
//! with cluster-colored points and centroid markers, and bar / stacked-bar
//! charts, all via the plotters library. Plots carry no text labels (no fonts
//! on WSL); the CSV companions written by `core::writers` hold the labels.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::RenderConfig;
use crate::processors::geo::GeoPoint;

/// Errors that can occur during rendering.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    EmptyInput,

    #[error("array length mismatch: {points_len} points, {labels_len} labels")]
    LengthMismatch {
        points_len: usize,
        labels_len: usize,
    },
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Color palette for cluster visualization, indexed by label modulo length.
const CLUSTER_COLORS: &[(u8, u8, u8)] = &[
    (228, 26, 28),   // Red
    (55, 126, 184),  // Blue
    (77, 175, 74),   // Green
    (152, 78, 163),  // Purple
    (255, 127, 0),   // Orange
    (255, 255, 51),  // Yellow
    (166, 86, 40),   // Brown
    (247, 129, 191), // Pink
    (153, 153, 153), // Gray
    (0, 206, 209),   // Turquoise
    (138, 43, 226),  // Blue Violet
    (50, 205, 50),   // Lime Green
];

/// Marker color for accident locations on the plain map.
const ACCIDENT_COLOR: (u8, u8, u8) = (204, 0, 0);

/// Marker color for hotspot centroids.
const CENTROID_COLOR: (u8, u8, u8) = (0, 0, 0);

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Color for a cluster label.
#[inline]
pub fn cluster_color(label: usize) -> RGBColor {
    let (r, g, b) = CLUSTER_COLORS[label % CLUSTER_COLORS.len()];
    RGBColor(r, g, b)
}

/// Subsampling step so at most `max_points` of `n` get drawn.
#[inline]
fn plot_step(n: usize, max_points: usize) -> usize {
    if max_points > 0 && n > max_points {
        n / max_points
    } else {
        1
    }
}

/// Bounds with 5% padding on each side; degenerate axes widen by one unit.
fn padded_bounds(xs: impl Iterator<Item = f64> + Clone, ys: impl Iterator<Item = f64> + Clone) -> (f64, f64, f64, f64) {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for x in xs {
        if x < x_min {
            x_min = x;
        }
        if x > x_max {
            x_max = x;
        }
    }
    for y in ys {
        if y < y_min {
            y_min = y;
        }
        if y > y_max {
            y_max = y;
        }
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let x_pad = (x_max - x_min) * 0.05;
    let y_pad = (y_max - y_min) * 0.05;
    (x_min - x_pad, x_max + x_pad, y_min - y_pad, y_max + y_pad)
}

/// Plot accident locations as a 2D scatter (longitude vs latitude) PNG.
///
/// Subsamples down to `config.max_points` when the dataset is larger.
pub fn plot_accident_map(path: &Path, points: &[GeoPoint], config: &RenderConfig) -> Result<()> {
    if points.is_empty() {
        return Err(VisualizationError::EmptyInput);
    }

    let step = plot_step(points.len(), config.max_points);
    let alpha = config.alpha.clamp(0.0, 1.0);
    let color = RGBAColor(ACCIDENT_COLOR.0, ACCIDENT_COLOR.1, ACCIDENT_COLOR.2, alpha);

    let (x_min, x_max, y_min, y_max) = padded_bounds(
        points.iter().map(|p| p.longitude),
        points.iter().map(|p| p.latitude),
    );

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .step_by(step)
                .map(|p| Circle::new((p.longitude, p.latitude), 2, color.filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Plot the hotspot map: points colored by cluster label, centroids drawn
/// on top as large outlined markers.
///
/// `labels` must be index-aligned with `points`; `centroids` are in
/// latitude/longitude units, index-aligned with label values.
pub fn plot_hotspot_map(
    path: &Path,
    points: &[GeoPoint],
    labels: &[usize],
    centroids: &[[f64; 2]],
    config: &RenderConfig,
) -> Result<()> {
    if points.is_empty() {
        return Err(VisualizationError::EmptyInput);
    }
    if points.len() != labels.len() {
        return Err(VisualizationError::LengthMismatch {
            points_len: points.len(),
            labels_len: labels.len(),
        });
    }

    let step = plot_step(points.len(), config.max_points);
    let alpha = config.alpha.clamp(0.0, 1.0);

    let (x_min, x_max, y_min, y_max) = padded_bounds(
        points
            .iter()
            .map(|p| p.longitude)
            .chain(centroids.iter().map(|c| c[1])),
        points
            .iter()
            .map(|p| p.latitude)
            .chain(centroids.iter().map(|c| c[0])),
    );

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(points.iter().zip(labels.iter()).step_by(step).map(
            |(p, &label)| {
                let c = cluster_color(label);
                let color = RGBAColor(c.0, c.1, c.2, alpha);
                Circle::new((p.longitude, p.latitude), 2, color.filled())
            },
        ))
        .map_err(plot_err)?;

    // Centroids on top: filled disc with a contrasting ring
    let centroid_fill = RGBColor(CENTROID_COLOR.0, CENTROID_COLOR.1, CENTROID_COLOR.2);
    chart
        .draw_series(centroids.iter().enumerate().flat_map(|(label, c)| {
            let pos = (c[1], c[0]);
            [
                Circle::new(pos, 9, centroid_fill.filled()),
                Circle::new(pos, 9, cluster_color(label).stroke_width(3)),
            ]
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Render a vertical bar chart for `(category, value)` pairs, in input order.
///
/// Bars are unlabeled; pair the PNG with `write_counts_csv` output.
pub fn plot_bar_chart(path: &Path, rows: &[(String, f64)], config: &RenderConfig) -> Result<()> {
    if rows.is_empty() {
        return Err(VisualizationError::EmptyInput);
    }

    let max_value = rows.iter().map(|(_, v)| *v).fold(0.0f64, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.05 } else { 1.0 };

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0f64..rows.len() as f64, 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .draw()
        .map_err(plot_err)?;

    let bar_color = RGBColor(55, 126, 184);
    chart
        .draw_series(rows.iter().enumerate().map(|(i, (_, value))| {
            let x0 = i as f64 + 0.1;
            let x1 = i as f64 + 0.9;
            Rectangle::new([(x0, 0.0), (x1, *value)], bar_color.filled())
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Render a stacked bar chart: one bar per outer category, one palette-colored
/// segment per inner category.
pub fn plot_stacked_bar_chart(
    path: &Path,
    groups: &[(String, Vec<(String, u64)>)],
    config: &RenderConfig,
) -> Result<()> {
    if groups.is_empty() {
        return Err(VisualizationError::EmptyInput);
    }

    // Stable segment color assignment across all bars
    let mut segment_names: Vec<&str> = groups
        .iter()
        .flat_map(|(_, segments)| segments.iter().map(|(name, _)| name.as_str()))
        .collect();
    segment_names.sort_unstable();
    segment_names.dedup();
    let color_index = |name: &str| segment_names.iter().position(|s| *s == name).unwrap_or(0);

    let max_total = groups
        .iter()
        .map(|(_, segments)| segments.iter().map(|(_, v)| *v).sum::<u64>())
        .max()
        .unwrap_or(0);
    let y_max = if max_total > 0 {
        max_total as f64 * 1.05
    } else {
        1.0
    };

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0f64..groups.len() as f64, 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .draw()
        .map_err(plot_err)?;

    let mut rectangles = Vec::new();
    for (i, (_, segments)) in groups.iter().enumerate() {
        let x0 = i as f64 + 0.1;
        let x1 = i as f64 + 0.9;
        let mut base = 0.0f64;
        for (name, value) in segments {
            let top = base + *value as f64;
            rectangles.push(Rectangle::new(
                [(x0, base), (x1, top)],
                cluster_color(color_index(name)).filled(),
            ));
            base = top;
        }
    }

    chart.draw_series(rectangles).map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint {
                row: 0,
                latitude: 41.88,
                longitude: -87.63,
            },
            GeoPoint {
                row: 1,
                latitude: 41.90,
                longitude: -87.60,
            },
            GeoPoint {
                row: 2,
                latitude: 41.70,
                longitude: -87.65,
            },
        ]
    }

    #[test]
    fn test_plot_accident_map_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.png");

        plot_accident_map(&path, &test_points(), &RenderConfig::default()).unwrap();
        assert!(path.exists());
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_plot_accident_map_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.png");

        let result = plot_accident_map(&path, &[], &RenderConfig::default());
        assert!(matches!(result, Err(VisualizationError::EmptyInput)));
    }

    #[test]
    fn test_plot_hotspot_map_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hotspots.png");

        plot_hotspot_map(
            &path,
            &test_points(),
            &[0, 0, 1],
            &[[41.89, -87.615], [41.70, -87.65]],
            &RenderConfig::default(),
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_hotspot_map_length_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hotspots.png");

        let result = plot_hotspot_map(
            &path,
            &test_points(),
            &[0, 1],
            &[[41.89, -87.615]],
            &RenderConfig::default(),
        );
        assert!(matches!(
            result,
            Err(VisualizationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_plot_bar_chart_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.png");

        let rows = vec![
            ("DARKNESS".to_string(), 12.0),
            ("DAYLIGHT".to_string(), 7.0),
        ];
        plot_bar_chart(&path, &rows, &RenderConfig::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_stacked_bar_chart_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stacked.png");

        let groups = vec![
            (
                "DIVIDED".to_string(),
                vec![("REAR END".to_string(), 2), ("TURNING".to_string(), 1)],
            ),
            ("ONE-WAY".to_string(), vec![("ANGLE".to_string(), 3)]),
        ];
        plot_stacked_bar_chart(&path, &groups, &RenderConfig::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_cluster_color_wraps_palette() {
        assert_eq!(cluster_color(0), cluster_color(CLUSTER_COLORS.len()));
    }
}
