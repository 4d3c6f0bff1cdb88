//! Common infrastructure modules shared across analysis procedures
//!
//! This module provides reusable infrastructure for:
//! - Track data structures and their numeric categories
//! - Aggregations (histograms, rankings, yearly series)
//! - ASCII table formatting for text summaries
//! - Plotting report charts

pub mod data_structures;
pub mod plots;
pub mod stats;
pub mod tables;

// Re-export commonly used items
pub use data_structures::{Category, Measure, Track};
pub use plots::PlotError;
