//! CSV exports for clustering results and chart data.
//!
//! The rendered PNGs carry no text labels, so every chart and map has a
//! CSV companion: labeled point coordinates, centroid coordinates, and
//! category/value tables.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use crate::processors::geo::GeoPoint;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Flush error.
    #[error("failed to flush '{path}': {source}")]
    FlushError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Mismatched array lengths.
    #[error("array length mismatch: {points_len} points, {labels_len} labels")]
    LengthMismatch {
        points_len: usize,
        labels_len: usize,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered CSV writer for the given path.
fn create_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dirs(path)?;
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::Writer::from_writer(BufWriter::new(file)))
}

fn write_record<I, T>(
    writer: &mut csv::Writer<BufWriter<File>>,
    path: &Path,
    fields: I,
) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer.write_record(fields).map_err(|e| WriteError::CsvError {
        path: path.display().to_string(),
        source: e,
    })
}

fn flush(writer: &mut csv::Writer<BufWriter<File>>, path: &Path) -> Result<()> {
    writer.flush().map_err(|e| WriteError::FlushError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write labeled geo-points to CSV with `latitude,longitude,cluster` columns.
///
/// # Errors
///
/// Returns an error if `points` and `labels` have different lengths or the
/// file cannot be written.
pub fn write_labeled_points_csv(path: &Path, points: &[GeoPoint], labels: &[usize]) -> Result<()> {
    if points.len() != labels.len() {
        return Err(WriteError::LengthMismatch {
            points_len: points.len(),
            labels_len: labels.len(),
        });
    }

    let mut writer = create_csv_writer(path)?;
    write_record(&mut writer, path, ["latitude", "longitude", "cluster"])?;

    for (point, label) in points.iter().zip(labels.iter()) {
        write_record(
            &mut writer,
            path,
            [
                format!("{:.6}", point.latitude),
                format!("{:.6}", point.longitude),
                label.to_string(),
            ],
        )?;
    }

    flush(&mut writer, path)
}

/// Write cluster centroids to CSV with `cluster,latitude,longitude` columns,
/// row order matching the cluster label values.
pub fn write_centroids_csv(path: &Path, centroids: &[[f64; 2]]) -> Result<()> {
    let mut writer = create_csv_writer(path)?;
    write_record(&mut writer, path, ["cluster", "latitude", "longitude"])?;

    for (cluster, centroid) in centroids.iter().enumerate() {
        write_record(
            &mut writer,
            path,
            [
                cluster.to_string(),
                format!("{:.6}", centroid[0]),
                format!("{:.6}", centroid[1]),
            ],
        )?;
    }

    flush(&mut writer, path)
}

/// Write a `category,value` table to CSV, preserving input order.
///
/// This is the label companion for the bar-chart PNGs, which render bars
/// without text.
pub fn write_counts_csv(path: &Path, rows: &[(String, f64)]) -> Result<()> {
    let mut writer = create_csv_writer(path)?;
    write_record(&mut writer, path, ["category", "value"])?;

    for (category, value) in rows {
        write_record(&mut writer, path, [category.clone(), format!("{}", value)])?;
    }

    flush(&mut writer, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
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
                latitude: 41.70,
                longitude: -87.65,
            },
        ]
    }

    #[test]
    fn test_write_labeled_points_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.csv");

        write_labeled_points_csv(&path, &test_points(), &[0, 1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "latitude,longitude,cluster");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",0"));
        assert!(lines[2].ends_with(",1"));
    }

    #[test]
    fn test_write_labeled_points_length_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.csv");

        let result = write_labeled_points_csv(&path, &test_points(), &[0]);
        assert!(matches!(
            result,
            Err(WriteError::LengthMismatch {
                points_len: 2,
                labels_len: 1
            })
        ));
    }

    #[test]
    fn test_write_centroids_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("centroids.csv");

        write_centroids_csv(&path, &[[41.89, -87.615], [41.71, -87.665]]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "cluster,latitude,longitude");
        assert!(lines[1].starts_with("0,41.89"));
        assert!(lines[2].starts_with("1,41.71"));
    }

    #[test]
    fn test_write_counts_csv_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        let rows = vec![("DARKNESS".to_string(), 12.0), ("DAYLIGHT".to_string(), 7.0)];
        write_counts_csv(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "category,value");
        assert_eq!(lines[1], "DARKNESS,12");
        assert_eq!(lines[2], "DAYLIGHT,7");
    }

    #[test]
    fn test_writers_create_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("centroids.csv");

        write_centroids_csv(&path, &[[41.88, -87.63]]).unwrap();
        assert!(path.exists());
    }
}
