//! Data processing modules.

pub mod clustering;
pub mod geo;
pub mod standardize;
pub mod summaries;

// Re-export key types for convenience
pub use clustering::{cluster_hotspots, ClusterError, Hotspots};
pub use geo::{extract_geo_points, GeoPoint};
pub use standardize::Standardizer;
pub use summaries::{
    average_daily_by_weather, counts_by_category, counts_by_speed_limit,
    crash_type_by_trafficway, hourly_counts, injuries_by_crash_type,
};
