//! Staff order flags
//!
//! Bit values match the host's `staff_orders` encoding exactly.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::config::TaskToggles;
use crate::core::types::Role;

bitflags! {
    /// Handyman duties
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HandymanOrders: u8 {
        const SWEEPING = 1;
        const WATER_FLOWERS = 1 << 1;
        const EMPTY_BINS = 1 << 2;
        const MOWING = 1 << 3;
    }
}

bitflags! {
    /// Mechanic duties
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MechanicOrders: u8 {
        const INSPECT_RIDES = 1;
        const FIX_RIDES = 1 << 1;
    }
}

impl HandymanOrders {
    pub fn from_toggles(tasks: &TaskToggles) -> Self {
        let mut orders = Self::empty();
        orders.set(Self::SWEEPING, tasks.sweeping);
        orders.set(Self::WATER_FLOWERS, tasks.water_flowers);
        orders.set(Self::EMPTY_BINS, tasks.empty_bins);
        orders.set(Self::MOWING, tasks.mowing);
        orders
    }
}

impl MechanicOrders {
    pub fn from_toggles(tasks: &TaskToggles) -> Self {
        let mut orders = Self::empty();
        orders.set(Self::INSPECT_RIDES, tasks.inspect_rides);
        orders.set(Self::FIX_RIDES, tasks.fix_rides);
        orders
    }
}

/// Raw order bitmask a newly hired (or corrected) member of `role` should carry
pub fn default_orders(role: Role, tasks: &TaskToggles) -> u8 {
    match role {
        Role::Handyman => HandymanOrders::from_toggles(tasks).bits(),
        Role::Mechanic => MechanicOrders::from_toggles(tasks).bits(),
        Role::Security | Role::Entertainer => 0,
    }
}

/// Whether the role has configurable duties at all
pub fn has_orders(role: Role) -> bool {
    matches!(role, Role::Handyman | Role::Mechanic)
}
