//! In-memory park implementing every host surface
//!
//! Used by the demo binary and by tests. Builders place paths, rides and
//! entities directly; `generate` lays out a seeded park, and `advance`
//! moves it forward one tick with simple, deterministic churn (guests
//! wander and drop litter, paths get vandalised, staff clean up inside
//! their patrol areas).

use std::cell::RefCell;

use ahash::{AHashMap, AHashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::{
    AgentId, FinePos, PatrolRect, Role, StructureId, Tick, TileCoord, WorldSize, TILE_SIZE,
};
use crate::effects::action::{ActionOutcome, GameAction, PatrolMode};
use crate::world::{
    EffectGateway, EntranceKind, GatewayError, GuestInfo, LitterItem, NetworkMode, ParkWorld,
    QueryError, QueryResult, Session, StaffMember, StationInfo, StructureInfo, StructureKind,
    StructureStatus, ThoughtKind, TileElement,
};

/// Host error code for a rejected action
pub const REJECTED: i32 = 1;

/// Ticks between churn passes in `advance`
const CHURN_INTERVAL: Tick = 25;

pub struct SandboxPark {
    size: WorldSize,
    tick: Tick,
    mode: NetworkMode,
    observers: usize,

    tiles: AHashMap<TileCoord, Vec<TileElement>>,
    path_tiles: Vec<TileCoord>,
    structures: Vec<StructureInfo>,
    guests: Vec<GuestInfo>,
    litter: Vec<LitterItem>,
    staff: Vec<StaffMember>,
    next_guest: u32,
    next_agent: u32,

    failing_tiles: AHashSet<TileCoord>,
    entity_queries_failing: bool,
    map_size_failing: bool,
    rejecting_actions: bool,
    gateway_down: bool,

    log_tiles: bool,
    tile_log: RefCell<Vec<TileCoord>>,
    actions: Vec<GameAction>,
    rng: ChaCha8Rng,
}

impl SandboxPark {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: WorldSize::new(width, height),
            tick: 0,
            mode: NetworkMode::SinglePlayer,
            observers: 0,
            tiles: AHashMap::new(),
            path_tiles: Vec::new(),
            structures: Vec::new(),
            guests: Vec::new(),
            litter: Vec::new(),
            staff: Vec::new(),
            next_guest: 1,
            next_agent: 1,
            failing_tiles: AHashSet::new(),
            entity_queries_failing: false,
            map_size_failing: false,
            rejecting_actions: false,
            gateway_down: false,
            log_tiles: true,
            tile_log: RefCell::new(Vec::new()),
            actions: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Seeded park: a main avenue, side streets, rides, stalls and guests
    pub fn generate(seed: u64, width: i32, height: i32) -> Self {
        let mut park = Self::new(width, height);
        park.rng = ChaCha8Rng::seed_from_u64(seed);
        park.log_tiles = false;
        if width < 8 || height < 8 {
            return park;
        }

        let avenue = height / 2;
        for x in 0..width {
            park.add_path(TileCoord::new(x, avenue));
        }
        park.add_park_entrance(TileCoord::new(0, avenue));

        let streets: Vec<i32> = (6..width - 4).step_by(12).collect();
        for &sx in &streets {
            for y in 1..height - 1 {
                if y != avenue {
                    park.add_path(TileCoord::new(sx, y));
                }
            }
        }

        let ride_count = ((width * height) / 1200).clamp(1, 12) as u32;
        let mut next_id = 1;
        for _ in 0..ride_count {
            if let Some((sx, y)) = park.random_street_spot(&streets, avenue) {
                park.add_ride(
                    StructureId(next_id),
                    TileCoord::new(sx + 3, y),
                    TileCoord::new(sx + 1, y),
                    Some(TileCoord::new(sx + 1, y + 1)),
                );
                next_id += 1;
            }
        }
        for _ in 0..ride_count / 2 + 1 {
            if let Some((sx, y)) = park.random_street_spot(&streets, avenue) {
                park.add_stall(StructureId(next_id), TileCoord::new(sx - 1, y));
                next_id += 1;
            }
        }

        let guests = 50 + ride_count as usize * 40;
        for _ in 0..guests {
            let tile = park.random_path_tile();
            let happiness = park.rng.gen_range(60..=255);
            park.add_guest(tile, happiness);
        }
        for _ in 0..guests / 10 {
            let tile = park.random_path_tile();
            park.add_litter(tile.to_fine());
        }

        tracing::debug!(
            seed,
            rides = ride_count,
            guests,
            paths = park.path_tiles.len(),
            "Generated sandbox park"
        );
        park
    }

    fn random_street_spot(&mut self, streets: &[i32], avenue: i32) -> Option<(i32, i32)> {
        if streets.is_empty() {
            return None;
        }
        let sx = streets[self.rng.gen_range(0..streets.len())];
        let y = self.rng.gen_range(2..self.size.height - 3);
        (y != avenue && y + 1 != avenue).then_some((sx, y))
    }

    fn random_path_tile(&mut self) -> TileCoord {
        if self.path_tiles.is_empty() {
            return self.size.center();
        }
        self.path_tiles[self.rng.gen_range(0..self.path_tiles.len())]
    }

    // === BUILDERS ===

    fn push_element(&mut self, coord: TileCoord, element: TileElement) {
        self.tiles.entry(coord).or_default().push(element);
    }

    pub fn add_path(&mut self, coord: TileCoord) {
        self.push_element(
            coord,
            TileElement::Path {
                queue: false,
                broken: false,
            },
        );
        self.path_tiles.push(coord);
    }

    pub fn add_queue(&mut self, coord: TileCoord) {
        self.push_element(
            coord,
            TileElement::Path {
                queue: true,
                broken: false,
            },
        );
        self.path_tiles.push(coord);
    }

    pub fn add_broken_path(&mut self, coord: TileCoord) {
        self.push_element(
            coord,
            TileElement::Path {
                queue: false,
                broken: true,
            },
        );
        self.path_tiles.push(coord);
    }

    pub fn add_park_entrance(&mut self, coord: TileCoord) {
        self.push_element(
            coord,
            TileElement::Entrance {
                kind: EntranceKind::ParkEntrance,
                structure: None,
            },
        );
    }

    /// Ride with one station: track at `start`, entrance and optional exit
    pub fn add_ride(
        &mut self,
        id: StructureId,
        start: TileCoord,
        entrance: TileCoord,
        exit: Option<TileCoord>,
    ) {
        self.push_element(start, TileElement::Track { structure: id });
        self.push_element(
            entrance,
            TileElement::Entrance {
                kind: EntranceKind::StructureEntrance,
                structure: Some(id),
            },
        );
        if let Some(exit) = exit {
            self.push_element(
                exit,
                TileElement::Entrance {
                    kind: EntranceKind::StructureExit,
                    structure: Some(id),
                },
            );
        }
        self.structures.push(StructureInfo {
            id,
            kind: StructureKind::Ride,
            status: StructureStatus::Open,
            downtime: 0,
            stations: vec![StationInfo {
                start: Some(start),
                entrance: Some(entrance),
                exit,
            }],
        });
    }

    /// Ride the host reports without any station geometry
    pub fn add_ride_without_stations(&mut self, id: StructureId) {
        self.structures.push(StructureInfo {
            id,
            kind: StructureKind::Ride,
            status: StructureStatus::Testing,
            downtime: 0,
            stations: Vec::new(),
        });
    }

    pub fn add_stall(&mut self, id: StructureId, coord: TileCoord) {
        self.push_element(coord, TileElement::Other);
        self.structures.push(StructureInfo {
            id,
            kind: StructureKind::Stall,
            status: StructureStatus::Open,
            downtime: 0,
            stations: vec![StationInfo {
                start: Some(coord),
                ..StationInfo::default()
            }],
        });
    }

    pub fn add_litter(&mut self, position: FinePos) {
        self.litter.push(LitterItem { position });
    }

    /// Guest standing on `tile`; returns its id
    pub fn add_guest(&mut self, tile: TileCoord, happiness: u8) -> u32 {
        let id = self.next_guest;
        self.next_guest += 1;
        self.guests.push(GuestInfo {
            id,
            position: tile.to_fine(),
            happiness,
            nausea: 0,
            thoughts: Vec::new(),
        });
        id
    }

    pub fn set_guest_thoughts(&mut self, id: u32, thoughts: Vec<ThoughtKind>) {
        if let Some(guest) = self.guests.iter_mut().find(|g| g.id == id) {
            guest.thoughts = thoughts;
        }
    }

    pub fn set_guest_nausea(&mut self, id: u32, nausea: u8) {
        if let Some(guest) = self.guests.iter_mut().find(|g| g.id == id) {
            guest.nausea = nausea;
        }
    }

    pub fn add_staff(&mut self, role: Role, orders: u8) -> AgentId {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        self.staff.push(StaffMember {
            id,
            role,
            orders,
            patrol: None,
        });
        id
    }

    // === FAULT INJECTION ===

    pub fn fail_tile(&mut self, coord: TileCoord) {
        self.failing_tiles.insert(coord);
    }

    /// Litter, guest, staff and structure queries all fail
    pub fn set_entity_queries_failing(&mut self, failing: bool) {
        self.entity_queries_failing = failing;
    }

    pub fn set_map_size_failing(&mut self, failing: bool) {
        self.map_size_failing = failing;
    }

    /// Actions reach the host but are refused with a non-zero error code
    pub fn set_rejecting_actions(&mut self, rejecting: bool) {
        self.rejecting_actions = rejecting;
    }

    /// Dispatch itself fails before the host sees the action
    pub fn set_gateway_down(&mut self, down: bool) {
        self.gateway_down = down;
    }

    pub fn set_mode(&mut self, mode: NetworkMode) {
        self.mode = mode;
    }

    pub fn set_observers(&mut self, observers: usize) {
        self.observers = observers;
    }

    // === INSPECTION ===

    /// Tiles looked up since the last call, in lookup order
    pub fn take_tile_log(&self) -> Vec<TileCoord> {
        std::mem::take(&mut *self.tile_log.borrow_mut())
    }

    /// Every action the gateway accepted for execution
    pub fn actions(&self) -> &[GameAction] {
        &self.actions
    }

    pub fn staff_members(&self) -> &[StaffMember] {
        &self.staff
    }

    pub fn guest_total(&self) -> usize {
        self.guests.len()
    }

    pub fn litter_total(&self) -> usize {
        self.litter.len()
    }

    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    // === SIMULATION ===

    /// Move the park forward one tick
    pub fn advance(&mut self) {
        self.tick += 1;
        if self.tick % CHURN_INTERVAL != 0 || self.path_tiles.is_empty() {
            return;
        }

        // Guests wander and drop litter
        for i in 0..self.guests.len() {
            if self.rng.gen_bool(0.3) {
                let tile = self.random_path_tile();
                self.guests[i].position = tile.to_fine();
            }
            if self.rng.gen_bool(0.02) {
                let position = self.guests[i].position;
                self.litter.push(LitterItem { position });
            }
        }

        if self.rng.gen_bool(0.05) {
            let tile = self.random_path_tile();
            self.vandalize(tile);
        }

        self.staff_work();
        self.update_moods();
    }

    fn vandalize(&mut self, coord: TileCoord) {
        if let Some(elements) = self.tiles.get_mut(&coord) {
            for element in elements.iter_mut() {
                if let TileElement::Path { broken, .. } = element {
                    *broken = true;
                }
            }
        }
    }

    /// Handymen sweep and security repair inside their patrol areas
    fn staff_work(&mut self) {
        let mut sweeps: Vec<Option<PatrolRect>> = Vec::new();
        let mut repairs: Vec<Option<PatrolRect>> = Vec::new();
        for member in &self.staff {
            match member.role {
                Role::Handyman => sweeps.push(member.patrol),
                Role::Security => repairs.push(member.patrol),
                Role::Mechanic | Role::Entertainer => {}
            }
        }

        for area in sweeps {
            for _ in 0..2 {
                let found = self.litter.iter().position(|item| {
                    area.map_or(true, |rect| rect.contains(item.position.tile()))
                });
                if let Some(index) = found {
                    self.litter.swap_remove(index);
                }
            }
        }

        for area in repairs {
            let target = self.path_tiles.iter().copied().find(|coord| {
                area.map_or(true, |rect| rect.contains(*coord))
                    && self
                        .tiles
                        .get(coord)
                        .is_some_and(|elements| elements.iter().any(|e| e.is_broken_path()))
            });
            if let Some(elements) = target.and_then(|coord| self.tiles.get_mut(&coord)) {
                for element in elements.iter_mut() {
                    if let TileElement::Path { broken, .. } = element {
                        *broken = false;
                    }
                }
            }
        }
    }

    /// Litter sours moods; entertainers lift guests inside their areas
    fn update_moods(&mut self) {
        let litter_per_guest = self.litter.len() as f32 / self.guests.len().max(1) as f32;
        let entertainers: Vec<Option<PatrolRect>> = self
            .staff
            .iter()
            .filter(|m| m.role == Role::Entertainer)
            .map(|m| m.patrol)
            .collect();

        for guest in &mut self.guests {
            let tile = guest.position.tile();
            let cheered = entertainers
                .iter()
                .any(|area| area.is_some_and(|rect| rect.contains(tile)));
            if cheered {
                guest.happiness = guest.happiness.saturating_add(3);
            } else if litter_per_guest > 0.1 {
                guest.happiness = guest.happiness.saturating_sub(2);
            }
            guest.thoughts.clear();
            if litter_per_guest > 0.2 {
                guest.thoughts.push(ThoughtKind::BadLitter);
            }
        }
    }

    fn patrol_from_fine(left: i32, top: i32, right: i32, bottom: i32) -> PatrolRect {
        PatrolRect::new(left / TILE_SIZE, top / TILE_SIZE, right / TILE_SIZE, bottom / TILE_SIZE)
    }

    fn entity_query<T: Clone>(&self, items: &[T], what: &str) -> QueryResult<Vec<T>> {
        if self.entity_queries_failing {
            return Err(QueryError::Unavailable(what.to_string()));
        }
        Ok(items.to_vec())
    }
}

impl ParkWorld for SandboxPark {
    fn map_size(&self) -> QueryResult<WorldSize> {
        if self.map_size_failing {
            return Err(QueryError::Unavailable("map size".into()));
        }
        Ok(self.size)
    }

    fn tile_elements(&self, coord: TileCoord) -> QueryResult<Vec<TileElement>> {
        if self.log_tiles {
            self.tile_log.borrow_mut().push(coord);
        }
        if !self.size.contains(coord) {
            return Err(QueryError::OutOfBounds {
                x: coord.x,
                y: coord.y,
            });
        }
        if self.failing_tiles.contains(&coord) {
            return Err(QueryError::Malformed(format!("tile ({}, {})", coord.x, coord.y)));
        }
        Ok(self.tiles.get(&coord).cloned().unwrap_or_default())
    }

    fn litter(&self) -> QueryResult<Vec<LitterItem>> {
        self.entity_query(&self.litter, "litter")
    }

    fn guests(&self) -> QueryResult<Vec<GuestInfo>> {
        self.entity_query(&self.guests, "guests")
    }

    fn staff(&self) -> QueryResult<Vec<StaffMember>> {
        self.entity_query(&self.staff, "staff")
    }

    fn structures(&self) -> QueryResult<Vec<StructureInfo>> {
        self.entity_query(&self.structures, "structures")
    }

    fn current_tick(&self) -> Tick {
        self.tick
    }
}

impl Session for SandboxPark {
    fn network_mode(&self) -> NetworkMode {
        self.mode
    }

    fn observer_count(&self) -> usize {
        self.observers
    }
}

impl EffectGateway for SandboxPark {
    fn execute(&mut self, action: &GameAction) -> Result<ActionOutcome, GatewayError> {
        if self.gateway_down {
            return Err(GatewayError {
                action: action.name().to_string(),
                reason: "gateway unavailable".into(),
            });
        }
        self.actions.push(action.clone());
        if self.rejecting_actions {
            return Ok(ActionOutcome::failure(REJECTED, "action rejected"));
        }

        let outcome = match *action {
            GameAction::StaffHire {
                staff_type,
                staff_orders,
                ..
            } => match Role::from_staff_type(staff_type) {
                Some(role) => {
                    self.add_staff(role, staff_orders);
                    ActionOutcome::success()
                }
                None => ActionOutcome::failure(REJECTED, "unknown staff type"),
            },
            GameAction::StaffSetOrders { id, staff_orders } => {
                match self.staff.iter_mut().find(|m| m.id == id) {
                    Some(member) => {
                        member.orders = staff_orders;
                        ActionOutcome::success()
                    }
                    None => ActionOutcome::failure(REJECTED, "no such staff member"),
                }
            }
            GameAction::StaffSetPatrolArea { id, range, mode } => {
                match self.staff.iter_mut().find(|m| m.id == id) {
                    Some(member) => {
                        member.patrol = match mode {
                            PatrolMode::Set => Some(Self::patrol_from_fine(
                                range.left,
                                range.top,
                                range.right,
                                range.bottom,
                            )),
                            PatrolMode::Clear => None,
                        };
                        ActionOutcome::success()
                    }
                    None => ActionOutcome::failure(REJECTED, "no such staff member"),
                }
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let a = SandboxPark::generate(7, 96, 96);
        let b = SandboxPark::generate(7, 96, 96);
        assert_eq!(a.structures().unwrap(), b.structures().unwrap());
        assert_eq!(a.guests().unwrap(), b.guests().unwrap());
        assert!(a.guest_total() >= 50);
        assert!(!a.structures().unwrap().is_empty());
    }

    #[test]
    fn test_gateway_applies_actions() {
        let mut park = SandboxPark::new(32, 32);
        let outcome = park.execute(&GameAction::hire(Role::Mechanic, 0, 3)).unwrap();
        assert!(outcome.is_success());
        let id = park.staff_members()[0].id;

        let rect = PatrolRect::new(2, 3, 10, 12);
        park.execute(&GameAction::set_patrol(id, rect)).unwrap();
        assert_eq!(park.staff_members()[0].patrol, Some(rect));

        park.execute(&GameAction::clear_patrol(id, rect)).unwrap();
        assert_eq!(park.staff_members()[0].patrol, None);

        let outcome = park
            .execute(&GameAction::StaffSetOrders {
                id: AgentId(99),
                staff_orders: 1,
            })
            .unwrap();
        assert_eq!(outcome.error, REJECTED);
        assert_eq!(park.actions().len(), 4);
    }

    #[test]
    fn test_out_of_bounds_tile_is_an_error() {
        let park = SandboxPark::new(4, 4);
        assert!(matches!(
            park.tile_elements(TileCoord::new(4, 0)),
            Err(QueryError::OutOfBounds { x: 4, y: 0 })
        ));
        assert_eq!(park.tile_elements(TileCoord::new(1, 1)).unwrap(), Vec::new());
    }

    #[test]
    fn test_handymen_sweep_inside_patrol() {
        let mut park = SandboxPark::new(32, 32);
        park.add_path(TileCoord::new(1, 1));
        let id = park.add_staff(Role::Handyman, 15);
        park.staff[0].patrol = Some(PatrolRect::new(0, 0, 5, 5));
        park.add_litter(TileCoord::new(2, 2).to_fine());
        park.add_litter(TileCoord::new(20, 20).to_fine());
        assert_eq!(park.staff_members()[0].id, id);

        park.staff_work();
        assert_eq!(park.litter_total(), 1);
        assert_eq!(park.litter[0].position.tile(), TileCoord::new(20, 20));
    }
}
