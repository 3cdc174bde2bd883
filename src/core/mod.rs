//! Core data types and I/O operations.

pub mod loaders;
pub mod writers;

pub use loaders::{AccidentRecord, Dataset};
pub use writers::{write_centroids_csv, write_counts_csv, write_labeled_points_csv, WriteError};
