//! Per-axis standardization of coordinates to zero mean, unit variance.
//!
//! Statistics are fit exactly once per clustering run, over exactly the
//! point set being clustered, and reused to map centroids back into
//! latitude/longitude units afterwards.

use crate::processors::geo::GeoPoint;

/// Fitted standardization statistics for the latitude and longitude axes.
///
/// Axis order is `[latitude, longitude]` throughout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardizer {
    pub mean: [f64; 2],
    pub std: [f64; 2],
}

impl Standardizer {
    /// Compute per-axis mean and (population) standard deviation over the
    /// given points.
    ///
    /// Must be called with at least one point; the clusterer validates
    /// non-emptiness before fitting.
    pub fn fit(points: &[GeoPoint]) -> Self {
        debug_assert!(!points.is_empty(), "cannot fit on zero points");

        let n = points.len() as f64;
        let mut mean = [0.0f64; 2];
        for p in points {
            mean[0] += p.latitude;
            mean[1] += p.longitude;
        }
        mean[0] /= n;
        mean[1] /= n;

        let mut var = [0.0f64; 2];
        for p in points {
            let dlat = p.latitude - mean[0];
            let dlon = p.longitude - mean[1];
            var[0] += dlat * dlat;
            var[1] += dlon * dlon;
        }

        Self {
            mean,
            std: [(var[0] / n).sqrt(), (var[1] / n).sqrt()],
        }
    }

    /// Map a point into standardized space.
    ///
    /// A zero-variance axis maps to 0.0 for every point, so degenerate
    /// inputs never produce NaN or infinity.
    #[inline]
    pub fn transform(&self, point: &GeoPoint) -> [f64; 2] {
        [
            scale(point.latitude, self.mean[0], self.std[0]),
            scale(point.longitude, self.mean[1], self.std[1]),
        ]
    }

    /// Map a standardized-space coordinate back to latitude/longitude units.
    ///
    /// For a zero-variance axis this returns the axis mean, which is the
    /// shared coordinate of all input points.
    #[inline]
    pub fn inverse(&self, scaled: &[f64; 2]) -> [f64; 2] {
        [
            scaled[0] * self.std[0] + self.mean[0],
            scaled[1] * self.std[1] + self.mean[1],
        ]
    }
}

#[inline]
fn scale(value: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        0.0
    } else {
        (value - mean) / std
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint {
            row: 0,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_fit_mean_and_std() {
        let points = vec![point(1.0, 10.0), point(3.0, 30.0)];
        let s = Standardizer::fit(&points);

        assert!((s.mean[0] - 2.0).abs() < 1e-12);
        assert!((s.mean[1] - 20.0).abs() < 1e-12);
        assert!((s.std[0] - 1.0).abs() < 1e-12);
        assert!((s.std[1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_zero_mean_unit_variance() {
        let points = vec![point(1.0, 10.0), point(3.0, 30.0)];
        let s = Standardizer::fit(&points);

        let a = s.transform(&points[0]);
        let b = s.transform(&points[1]);
        assert!((a[0] + 1.0).abs() < 1e-12);
        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!((a[1] + 1.0).abs() < 1e-12);
        assert!((b[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let points = vec![
            point(41.88, -87.63),
            point(41.90, -87.60),
            point(41.70, -87.65),
        ];
        let s = Standardizer::fit(&points);

        for p in &points {
            let back = s.inverse(&s.transform(p));
            assert!((back[0] - p.latitude).abs() < 1e-9);
            assert!((back[1] - p.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_variance_axis_is_finite() {
        // All points share a latitude; that axis must scale to 0.0
        let points = vec![point(41.88, -87.63), point(41.88, -87.60)];
        let s = Standardizer::fit(&points);

        for p in &points {
            let scaled = s.transform(p);
            assert!(scaled[0].is_finite());
            assert_eq!(scaled[0], 0.0);
            assert!(scaled[1].is_finite());
        }

        // Inverse of a degenerate axis recovers the shared coordinate
        let back = s.inverse(&[0.0, 0.0]);
        assert!((back[0] - 41.88).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_fully_degenerate() {
        let points = vec![point(41.88, -87.63)];
        let s = Standardizer::fit(&points);

        let scaled = s.transform(&points[0]);
        assert_eq!(scaled, [0.0, 0.0]);

        let back = s.inverse(&scaled);
        assert!((back[0] - 41.88).abs() < 1e-12);
        assert!((back[1] + 87.63).abs() < 1e-12);
    }
}
