//! Park Steward - autonomous staff management for tile-based theme parks
//!
//! The controller observes a park through the `world` traits, scans it
//! incrementally, derives need signals, and decides whom to hire and
//! where each staff member patrols. Every decision leaves the crate as a
//! `GameAction` through one rate-limited, authority-gated effect queue.

pub mod analysis;
pub mod core;
pub mod effects;
pub mod incident;
pub mod sandbox;
pub mod simulation;
pub mod spatial;
pub mod staff;
pub mod world;
