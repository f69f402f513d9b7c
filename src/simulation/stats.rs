//! Controller statistics
//!
//! Counters only ever grow until an operator reset. `auto_reanalyze` and
//! `auto_gen_zones` survive a reset: they describe the controller's own
//! housekeeping, not the operator's session.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{Role, RoleCounts, Tick};

/// Frames kept for the rolling frame-time average
pub const FRAME_WINDOW: usize = 30;

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub hired: u64,
    pub hires_failed: u64,
    pub orders_changed: u64,
    pub zones_set: u64,
    pub zones_failed: u64,
    pub smart_hires: RoleCounts,
    /// Effects that never produced a host result
    pub dispatch_failures: u64,
    pub auto_reanalyze: u64,
    pub auto_gen_zones: u64,

    last_frame_ms: f64,
    frames: VecDeque<f64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hire(&mut self, role: Role, smart: bool) {
        self.hired += 1;
        if smart {
            self.smart_hires.add(role, 1);
        }
    }

    /// Push one roster-processing frame time
    pub fn record_frame(&mut self, millis: f64) {
        self.last_frame_ms = millis;
        if self.frames.len() == FRAME_WINDOW {
            self.frames.pop_front();
        }
        self.frames.push_back(millis);
    }

    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    pub fn average_frame_ms(&self) -> f64 {
        if self.frames.is_empty() {
            return 0.0;
        }
        self.frames.iter().sum::<f64>() / self.frames.len() as f64
    }

    /// Operator reset
    pub fn reset(&mut self) {
        *self = Self {
            auto_reanalyze: self.auto_reanalyze,
            auto_gen_zones: self.auto_gen_zones,
            ..Self::default()
        };
    }
}

/// Read-only view pushed to the display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub tick: Tick,
    pub scan_percent: f32,
    pub scan_complete: bool,
    pub completed_scans: u64,

    pub hired: u64,
    pub hires_failed: u64,
    pub orders_changed: u64,
    pub zones_set: u64,
    pub zones_failed: u64,
    pub smart_hires: RoleCounts,
    pub dispatch_failures: u64,
    pub auto_reanalyze: u64,
    pub auto_gen_zones: u64,
    pub last_frame_ms: f64,
    pub average_frame_ms: f64,

    pub staff: RoleCounts,
    pub guests: usize,
    pub rides: usize,
    pub shops: usize,
    pub tracked_rides: usize,
    pub litter: usize,
    pub crimes: u32,
    pub happiness_percent: f32,
    pub pending_effects: usize,
    pub observers: usize,
}
