//! Controller configuration with documented defaults
//!
//! All tunables are collected here. The controller only ever reads them;
//! operators change behaviour by editing the TOML file and reloading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, StaffError};
use crate::core::rng::RandomMode;
use crate::core::types::{Role, Tick};

/// Hiring policy for one staff role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePolicy {
    /// Role participates in hiring and zoning at all
    pub enabled: bool,
    /// Role may be hired automatically
    pub auto_hire: bool,
    /// Floor for the ratio target
    pub min: u32,
    /// Hard cap on role headcount
    pub max: u32,
    /// Staff per unit of driver metric (guests, or rides for mechanics)
    pub ratio: f64,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_hire: true,
            min: 0,
            max: 10,
            ratio: 0.0,
        }
    }
}

impl RolePolicy {
    fn with(min: u32, max: u32, ratio: f64) -> Self {
        Self {
            min,
            max,
            ratio,
            ..Self::default()
        }
    }
}

/// Which duties new hires receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskToggles {
    pub sweeping: bool,
    pub water_flowers: bool,
    pub empty_bins: bool,
    pub mowing: bool,
    pub inspect_rides: bool,
    pub fix_rides: bool,
}

impl Default for TaskToggles {
    fn default() -> Self {
        Self {
            sweeping: true,
            water_flowers: true,
            empty_bins: true,
            mowing: true,
            inspect_rides: true,
            fix_rides: true,
        }
    }
}

/// Cadences, all in simulation ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervals {
    /// Smart (event-driven) hiring checks
    pub event_check: Tick,
    /// Litter, guest density and incident detector refresh
    pub analysis: Tick,
    /// Roster refresh and order enforcement
    pub staff_process: Tick,
    /// Ratio-based hiring
    pub hire_check: Tick,
    /// Full world rescan
    pub rescan: Tick,
    /// Automatic zone regeneration
    pub zone_regen: Tick,
    /// Statistics push to the display sink
    pub display: Tick,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            event_check: 100,
            analysis: 200,
            staff_process: 40,
            hire_check: 400,
            rescan: 20_000,
            zone_regen: 1_000,
            display: 40,
        }
    }
}

/// Detector thresholds; every comparison is inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Vandalised paths before more security is wanted
    pub crime: u32,
    /// Guests thinking "disgusting" (or badly nauseous)
    pub disgust: u32,
    /// Guests complaining about litter
    pub litter_complaints: u32,
    /// Raw litter items on the ground
    pub litter_items: u32,
    /// Average happiness percent below which entertainers are wanted
    pub happiness_percent: f32,
    /// Area happiness percent below which an area counts as unhappy
    pub unhappy_percent: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            crime: 3,
            disgust: 5,
            litter_complaints: 5,
            litter_items: 40,
            happiness_percent: 60.0,
            unhappy_percent: 50.0,
        }
    }
}

/// Top-level controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffConfig {
    /// Master switch; when off the tick loop is a no-op
    pub enabled: bool,
    /// Log dispatch failures and extra diagnostics
    pub debug: bool,
    /// Global auto-hire toggle gating both hiring triggers
    pub auto_hire: bool,
    /// Event-driven hiring (new ride, incidents)
    pub smart_hiring: bool,
    /// Reset handyman/mechanic orders that drift from the task toggles
    pub enforce_orders: bool,
    pub auto_rescan: bool,
    pub auto_zones: bool,

    pub handymen: RolePolicy,
    pub mechanics: RolePolicy,
    pub security: RolePolicy,
    pub entertainers: RolePolicy,

    pub tasks: TaskToggles,
    pub intervals: Intervals,
    pub thresholds: Thresholds,

    // === ZONES ===
    /// Edge length of a handyman grid cell, and patrol radius for centred zones
    pub zone_size: i32,
    /// Tiles each grid cell extends past its neighbours
    pub zone_overlap: i32,
    /// Margin added around a ride's coverage box
    pub structure_padding: i32,

    // === ENGINE BUDGETS ===
    /// Cells inspected per scan step
    pub scan_cells_per_step: u32,
    /// Effects dispatched per tick
    pub effects_per_tick: usize,
    /// Spatial bucket edge length, in tiles
    pub hotspot_cell_size: i32,
    /// Paths re-sampled per crime update
    pub crime_sample_limit: usize,
    /// Breadth-first search depth from ride entrances
    pub bfs_depth: u32,
    pub random_mode: RandomMode,
}

impl Default for StaffConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
            auto_hire: true,
            smart_hiring: true,
            enforce_orders: true,
            auto_rescan: true,
            auto_zones: true,

            // One handyman per 80 guests, one mechanic per 3 rides
            handymen: RolePolicy::with(2, 40, 1.0 / 80.0),
            mechanics: RolePolicy::with(1, 25, 1.0 / 3.0),
            security: RolePolicy::with(1, 20, 1.0 / 150.0),
            entertainers: RolePolicy::with(0, 15, 1.0 / 200.0),

            tasks: TaskToggles::default(),
            intervals: Intervals::default(),
            thresholds: Thresholds::default(),

            zone_size: 15,
            zone_overlap: 2,
            structure_padding: 3,

            scan_cells_per_step: 500,
            effects_per_tick: 3,
            hotspot_cell_size: 8,
            crime_sample_limit: 300,
            bfs_depth: 10,
            random_mode: RandomMode::Legacy,
        }
    }
}

impl StaffConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self, role: Role) -> &RolePolicy {
        match role {
            Role::Handyman => &self.handymen,
            Role::Mechanic => &self.mechanics,
            Role::Security => &self.security,
            Role::Entertainer => &self.entertainers,
        }
    }

    pub fn role_mut(&mut self, role: Role) -> &mut RolePolicy {
        match role {
            Role::Handyman => &mut self.handymen,
            Role::Mechanic => &mut self.mechanics,
            Role::Security => &mut self.security,
            Role::Entertainer => &mut self.entertainers,
        }
    }

    /// Parse and validate a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StaffConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            let policy = self.role(role);
            if policy.min > policy.max {
                return Err(StaffError::Config(format!(
                    "{}: min ({}) must be <= max ({})",
                    role.name(),
                    policy.min,
                    policy.max
                )));
            }
            if policy.ratio < 0.0 || !policy.ratio.is_finite() {
                return Err(StaffError::Config(format!(
                    "{}: ratio must be a finite non-negative number, got {}",
                    role.name(),
                    policy.ratio
                )));
            }
        }

        let i = &self.intervals;
        let intervals = [
            ("event_check", i.event_check),
            ("analysis", i.analysis),
            ("staff_process", i.staff_process),
            ("hire_check", i.hire_check),
            ("rescan", i.rescan),
            ("zone_regen", i.zone_regen),
            ("display", i.display),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, v)| *v == 0) {
            return Err(StaffError::Config(format!(
                "interval {} must be at least one tick",
                name
            )));
        }

        if self.zone_size <= 0 {
            return Err(StaffError::Config("zone_size must be positive".into()));
        }
        if self.zone_overlap < 0 || self.structure_padding < 0 {
            return Err(StaffError::Config(
                "zone_overlap and structure_padding must not be negative".into(),
            ));
        }
        if self.scan_cells_per_step == 0 || self.effects_per_tick == 0 {
            return Err(StaffError::Config(
                "scan_cells_per_step and effects_per_tick must be positive".into(),
            ));
        }
        if self.hotspot_cell_size <= 0 {
            return Err(StaffError::Config("hotspot_cell_size must be positive".into()));
        }

        Ok(())
    }
}
