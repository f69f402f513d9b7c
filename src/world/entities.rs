//! Entity and structure records as reported by the host

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, FinePos, PatrolRect, Role, StructureId, TileCoord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LitterItem {
    pub position: FinePos,
}

/// Categories of guest thoughts the detectors care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    PathDisgusting,
    BadLitter,
    Vandalism,
    Crowded,
    Sick,
    Other,
}

impl ThoughtKind {
    pub fn is_disgust(self) -> bool {
        matches!(self, ThoughtKind::PathDisgusting | ThoughtKind::Sick)
    }

    pub fn is_litter_complaint(self) -> bool {
        matches!(self, ThoughtKind::BadLitter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub id: u32,
    pub position: FinePos,
    /// 0..=255
    pub happiness: u8,
    /// 0..=255
    pub nausea: u8,
    pub thoughts: Vec<ThoughtKind>,
}

impl GuestInfo {
    pub fn happiness_percent(&self) -> f32 {
        self.happiness as f32 * 100.0 / 255.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: AgentId,
    pub role: Role,
    /// Raw order bitmask as the host stores it
    pub orders: u8,
    pub patrol: Option<PatrolRect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Ride,
    Stall,
    Facility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureStatus {
    Open,
    Closed,
    Testing,
    BrokenDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StationInfo {
    pub start: Option<TileCoord>,
    pub entrance: Option<TileCoord>,
    pub exit: Option<TileCoord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureInfo {
    pub id: StructureId,
    pub kind: StructureKind,
    pub status: StructureStatus,
    /// Downtime percentage reported by the host
    pub downtime: u8,
    pub stations: Vec<StationInfo>,
}
