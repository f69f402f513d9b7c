//! Controller loop and its statistics

pub mod stats;
pub mod tick;

pub use stats::{Statistics, StatsSnapshot, FRAME_WINDOW};
pub use tick::{StaffEvent, StaffManager};
