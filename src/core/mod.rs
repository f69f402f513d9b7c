pub mod config;
pub mod error;
pub mod orders;
pub mod rng;
pub mod types;

pub use config::StaffConfig;
pub use error::{Result, StaffError};
pub use rng::{DeterministicRandom, RandomMode};
