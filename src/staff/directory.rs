//! Current staff roster, partitioned by role
//!
//! Records live for one refresh only. A change in headcount marks every
//! patrol zone stale, since zones are sized by how many agents share them.
//! Hires confirmed since the last refresh are counted separately until the
//! roster is read again.

use crate::core::types::{Role, RoleCounts, Tick};
use crate::world::{ParkWorld, StaffMember};

#[derive(Debug, Default)]
pub struct StaffDirectory {
    members: Vec<StaffMember>,
    counts: RoleCounts,
    unconfirmed: RoleCounts,
    last_total: Option<usize>,
    zones_stale: bool,
    last_refresh: Tick,
}

impl StaffDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read the roster; returns true if the headcount changed
    ///
    /// A failed roster query keeps the previous roster for this cycle.
    pub fn refresh(&mut self, world: &dyn ParkWorld, tick: Tick) -> bool {
        let members = match world.staff() {
            Ok(members) => members,
            Err(e) => {
                tracing::debug!("Staff roster unavailable: {}", e);
                return false;
            }
        };

        let mut counts = RoleCounts::default();
        for member in &members {
            counts.add(member.role, 1);
        }

        self.members = members;
        self.counts = counts;
        self.unconfirmed = RoleCounts::default();
        self.last_refresh = tick;

        let total = self.members.len();
        let changed = self.last_total.is_some_and(|last| last != total);
        if changed {
            tracing::debug!(total, "Roster size changed; zones stale");
            self.zones_stale = true;
        }
        self.last_total = Some(total);
        changed
    }

    pub fn members(&self) -> &[StaffMember] {
        &self.members
    }

    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &StaffMember> + '_ {
        self.members.iter().filter(move |m| m.role == role)
    }

    pub fn count(&self, role: Role) -> usize {
        self.counts.get(role) as usize
    }

    pub fn counts(&self) -> RoleCounts {
        self.counts
    }

    /// A hire of `role` succeeded; it counts until the next refresh
    pub fn record_hire(&mut self, role: Role) {
        self.unconfirmed.add(role, 1);
    }

    /// Successful hires not yet seen on the roster
    pub fn unconfirmed(&self, role: Role) -> u64 {
        self.unconfirmed.get(role)
    }

    pub fn total(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn last_refresh(&self) -> Tick {
        self.last_refresh
    }

    pub fn zones_stale(&self) -> bool {
        self.zones_stale
    }

    pub fn mark_zones_stale(&mut self) {
        self.zones_stale = true;
    }

    pub fn clear_zones_stale(&mut self) {
        self.zones_stale = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
