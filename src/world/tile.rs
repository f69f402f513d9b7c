//! Typed tile elements returned by tile lookups

use serde::{Deserialize, Serialize};

use crate::core::types::StructureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceKind {
    StructureEntrance,
    StructureExit,
    ParkEntrance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileElement {
    Path {
        /// Part of a ride queue line
        queue: bool,
        /// Carries a broken (vandalised) path addition
        broken: bool,
    },
    Track {
        structure: StructureId,
    },
    Entrance {
        kind: EntranceKind,
        structure: Option<StructureId>,
    },
    /// Scenery, surface, walls and anything else the controller ignores
    Other,
}

impl TileElement {
    pub fn is_path(&self) -> bool {
        matches!(self, TileElement::Path { .. })
    }

    pub fn is_broken_path(&self) -> bool {
        matches!(self, TileElement::Path { broken: true, .. })
    }
}
