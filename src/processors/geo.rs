//! Extraction of geo-referenced points from the accident dataset.

use crate::core::loaders::Dataset;

/// An accident record known to have valid, finite coordinates.
///
/// `row` is the index of the originating record in the dataset, so labels
/// can be joined back onto the full rows after clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub row: usize,
    pub latitude: f64,
    pub longitude: f64,
}

/// Filter the dataset down to records with both coordinates present and
/// finite, preserving file order.
///
/// An empty result is not an error here; callers that require points
/// (the clusterer) perform their own validation.
pub fn extract_geo_points(dataset: &Dataset) -> Vec<GeoPoint> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter_map(|(row, record)| {
            let latitude = record.latitude.filter(|v| v.is_finite())?;
            let longitude = record.longitude.filter(|v| v.is_finite())?;
            Some(GeoPoint {
                row,
                latitude,
                longitude,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::AccidentRecord;

    fn record(lat: Option<f64>, lon: Option<f64>) -> AccidentRecord {
        AccidentRecord {
            latitude: lat,
            longitude: lon,
            ..AccidentRecord::default()
        }
    }

    #[test]
    fn test_filters_missing_coordinates() {
        let dataset = Dataset::new(vec![
            record(Some(41.88), Some(-87.63)),
            record(None, Some(-87.60)),
            record(Some(41.90), None),
            record(Some(41.70), Some(-87.65)),
        ]);

        let points = extract_geo_points(&dataset);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].row, 0);
        assert_eq!(points[1].row, 3);
        assert_eq!(points[1].latitude, 41.70);
    }

    #[test]
    fn test_filters_non_finite_coordinates() {
        let dataset = Dataset::new(vec![
            record(Some(f64::NAN), Some(-87.63)),
            record(Some(41.88), Some(f64::INFINITY)),
            record(Some(41.88), Some(-87.63)),
        ]);

        let points = extract_geo_points(&dataset);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].row, 2);
    }

    #[test]
    fn test_empty_dataset_yields_empty() {
        let dataset = Dataset::new(vec![]);
        assert!(extract_geo_points(&dataset).is_empty());
    }
}
