//! World topology: the incremental scanner and the ride tracker

pub mod scanner;
pub mod tracker;

pub use scanner::{GuestSample, ParkAnalyzer, PathTile, ScanProgress, ScanStatus};
pub use tracker::{RideTracker, StructureRecord};
