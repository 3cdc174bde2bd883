//! Traffic-accident analysis pipeline for the Chicago open-data crash dataset.
//!
//! This crate provides tools for:
//! - Loading and parsing the cleaned accident CSV into typed records
//! - Extracting records with valid coordinates and clustering them into
//!   geographic hotspots (seeded k-means with restarts)
//! - Aggregating accident counts against temporal and categorical attributes
//! - Rendering point maps, hotspot maps, and bar charts to PNG
//!
//! # Example
//!
//! ```no_run
//! use crash_hotspots::config::HotspotConfig;
//! use crash_hotspots::core::loaders::load_accidents_csv;
//! use crash_hotspots::processors::clustering::cluster_hotspots;
//! use crash_hotspots::processors::geo::extract_geo_points;
//!
//! let dataset = load_accidents_csv("chicago_accidents_cleaned.csv").unwrap();
//! let points = extract_geo_points(&dataset);
//! let hotspots = cluster_hotspots(&points, &HotspotConfig::default()).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{HotspotConfig, PipelineConfig, RenderConfig};
pub use core::loaders::{AccidentRecord, Dataset};
pub use processors::clustering::Hotspots;
pub use processors::geo::GeoPoint;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
