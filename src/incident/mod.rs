//! Need signals derived from sampled world and guest state

pub mod crime;
pub mod feedback;

pub use crime::CrimeDetector;
pub use feedback::{GuestFeedbackAnalyzer, UnhappyArea};
