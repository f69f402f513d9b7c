//! World-mutating operations and their results
//!
//! Serialized form matches what the host's action dispatcher expects:
//! `{"action": "staffhire", "args": {...}}`.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, PatrolRect, Role, TILE_SIZE};

/// Rectangle in fine world units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl From<PatrolRect> for FineRect {
    fn from(rect: PatrolRect) -> Self {
        Self {
            left: rect.x1 * TILE_SIZE,
            top: rect.y1 * TILE_SIZE,
            right: rect.x2 * TILE_SIZE,
            bottom: rect.y2 * TILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolMode {
    Set,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "args", rename_all = "lowercase")]
pub enum GameAction {
    StaffHire {
        staff_type: u8,
        entertainer_type: u8,
        staff_orders: u8,
        auto_position: bool,
    },
    StaffSetOrders {
        id: AgentId,
        staff_orders: u8,
    },
    StaffSetPatrolArea {
        id: AgentId,
        range: FineRect,
        mode: PatrolMode,
    },
}

impl GameAction {
    pub fn hire(role: Role, entertainer_type: u8, staff_orders: u8) -> Self {
        GameAction::StaffHire {
            staff_type: role.staff_type(),
            entertainer_type,
            staff_orders,
            auto_position: true,
        }
    }

    pub fn set_patrol(id: AgentId, rect: PatrolRect) -> Self {
        GameAction::StaffSetPatrolArea {
            id,
            range: rect.into(),
            mode: PatrolMode::Set,
        }
    }

    pub fn clear_patrol(id: AgentId, rect: PatrolRect) -> Self {
        GameAction::StaffSetPatrolArea {
            id,
            range: rect.into(),
            mode: PatrolMode::Clear,
        }
    }

    /// Operation name as the host registers it
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::StaffHire { .. } => "staffhire",
            GameAction::StaffSetOrders { .. } => "staffsetorders",
            GameAction::StaffSetPatrolArea { .. } => "staffsetpatrolarea",
        }
    }
}

/// Result reported by the host; `error == 0` is success
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub error: i32,
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failure(error: i32, message: impl Into<String>) -> Self {
        Self {
            error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hire_wire_format() {
        let action = GameAction::hire(Role::Entertainer, 4, 0);
        assert_eq!(action.name(), "staffhire");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "action": "staffhire",
                "args": {
                    "staff_type": 3,
                    "entertainer_type": 4,
                    "staff_orders": 0,
                    "auto_position": true
                }
            })
        );
    }

    #[test]
    fn test_patrol_area_uses_fine_coordinates() {
        let action = GameAction::set_patrol(AgentId(7), PatrolRect::new(1, 2, 3, 4));
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], "staffsetpatrolarea");
        assert_eq!(
            value["args"]["range"],
            json!({"left": 32, "top": 64, "right": 96, "bottom": 128})
        );
        assert_eq!(value["args"]["mode"], "set");
        assert_eq!(value["args"]["id"], 7);
    }

    #[test]
    fn test_outcome_success() {
        assert!(ActionOutcome::success().is_success());
        assert!(!ActionOutcome::failure(3, "no money").is_success());
    }
}
