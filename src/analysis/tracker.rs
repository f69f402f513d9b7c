//! Ride detection and access topology
//!
//! Each ride is tracked once, ever. When it is first seen the tracker walks
//! the path network outward from its entrances and exits (breadth-first,
//! depth-capped) so mechanics can later be zoned around the tiles guests
//! actually use to reach it.

use std::collections::{BTreeMap, VecDeque};

use ahash::AHashSet;

use crate::core::types::{PatrolRect, StructureId, Tick, TileCoord, WorldSize};
use crate::world::{ParkWorld, StructureInfo, StructureKind, StructureStatus};

/// Default breadth-first search depth from an entrance or exit
pub const DEFAULT_BFS_DEPTH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTag {
    Station,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedPoint {
    pub coord: TileCoord,
    pub tag: PointTag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub id: StructureId,
    pub kind: StructureKind,
    pub status: StructureStatus,
    pub discovered_at: Tick,
    pub entrances: Vec<TileCoord>,
    pub exits: Vec<TileCoord>,
    /// Station starts followed by every path tile reached from an entrance or exit
    pub connected: Vec<TaggedPoint>,
}

impl StructureRecord {
    pub fn path_coverage(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.connected
            .iter()
            .filter(|p| p.tag == PointTag::Path)
            .map(|p| p.coord)
    }
}

pub struct RideTracker {
    records: BTreeMap<StructureId, StructureRecord>,
    newly_detected: Vec<StructureId>,
    last_known_count: usize,
    bfs_depth: u32,
    padding: i32,
}

impl RideTracker {
    pub fn new(bfs_depth: u32, padding: i32) -> Self {
        Self {
            records: BTreeMap::new(),
            newly_detected: Vec::new(),
            last_known_count: 0,
            bfs_depth,
            padding,
        }
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.newly_detected.clear();
        self.last_known_count = 0;
    }

    /// Track every ride in the roster not seen before; returns how many were new
    pub fn scan_all(&mut self, world: &dyn ParkWorld, tick: Tick) -> usize {
        let rides = match world.structures() {
            Ok(structures) => structures,
            Err(e) => {
                tracing::debug!("Structure roster unavailable: {}", e);
                return 0;
            }
        };

        let mut found = 0;
        let mut ride_count = 0;
        for structure in rides.iter().filter(|s| s.kind == StructureKind::Ride) {
            ride_count += 1;
            if self.track(world, structure, tick) {
                found += 1;
            }
        }
        self.last_known_count = ride_count;
        found
    }

    /// Record a ride and map its access paths; false if already tracked
    pub fn track(&mut self, world: &dyn ParkWorld, structure: &StructureInfo, tick: Tick) -> bool {
        if self.records.contains_key(&structure.id) {
            return false;
        }

        let mut entrances = Vec::new();
        let mut exits = Vec::new();
        let mut connected = Vec::new();
        for station in &structure.stations {
            if let Some(start) = station.start {
                connected.push(TaggedPoint {
                    coord: start,
                    tag: PointTag::Station,
                });
            }
            entrances.extend(station.entrance);
            exits.extend(station.exit);
        }

        let mut covered: AHashSet<TileCoord> = AHashSet::new();
        for &seed in entrances.iter().chain(exits.iter()) {
            for coord in self.reachable_paths(world, seed) {
                if covered.insert(coord) {
                    connected.push(TaggedPoint {
                        coord,
                        tag: PointTag::Path,
                    });
                }
            }
        }

        tracing::debug!(
            id = structure.id.0,
            entrances = entrances.len(),
            exits = exits.len(),
            paths = covered.len(),
            "Tracking new ride"
        );

        self.records.insert(
            structure.id,
            StructureRecord {
                id: structure.id,
                kind: structure.kind,
                status: structure.status,
                discovered_at: tick,
                entrances,
                exits,
                connected,
            },
        );
        self.newly_detected.push(structure.id);
        true
    }

    /// Path tiles reachable from `seed` within the depth cap, in discovery order
    fn reachable_paths(&self, world: &dyn ParkWorld, seed: TileCoord) -> Vec<TileCoord> {
        let mut found = Vec::new();
        let mut visited: AHashSet<TileCoord> = AHashSet::new();
        let mut frontier: VecDeque<(TileCoord, u32)> = VecDeque::new();

        visited.insert(seed);
        frontier.push_back((seed, 0));

        while let Some((coord, depth)) = frontier.pop_front() {
            if depth >= self.bfs_depth {
                continue;
            }
            for neighbor in coord.neighbors4() {
                if !visited.insert(neighbor) {
                    continue;
                }
                let is_path = world
                    .tile_elements(neighbor)
                    .map(|elements| elements.iter().any(|e| e.is_path()))
                    .unwrap_or(false);
                // Branch stops at the first non-path tile
                if is_path {
                    found.push(neighbor);
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        found
    }

    /// True if rides were added since the last look; also tracks them
    pub fn check_for_new_structures(&mut self, world: &dyn ParkWorld, tick: Tick) -> bool {
        let ride_count = match world.structures() {
            Ok(structures) => structures
                .iter()
                .filter(|s| s.kind == StructureKind::Ride)
                .count(),
            Err(e) => {
                tracing::debug!("Structure roster unavailable: {}", e);
                return false;
            }
        };

        if ride_count == self.last_known_count {
            return false;
        }
        self.scan_all(world, tick) > 0
    }

    /// Drain rides detected since the last call; each id is returned once
    pub fn get_newly_detected(&mut self) -> Vec<StructureId> {
        std::mem::take(&mut self.newly_detected)
    }

    /// Bounding box of a ride's entrances, exits and reachable paths,
    /// padded and clamped; `PatrolRect::EMPTY` if nothing is known
    pub fn coverage_bounding_box(&self, id: StructureId, size: WorldSize) -> PatrolRect {
        let Some(record) = self.records.get(&id) else {
            return PatrolRect::EMPTY;
        };

        let mut rect = PatrolRect::EMPTY;
        for &coord in record.entrances.iter().chain(record.exits.iter()) {
            rect.include(coord);
        }
        for coord in record.path_coverage() {
            rect.include(coord);
        }

        if rect.is_empty() {
            return PatrolRect::EMPTY;
        }
        rect.padded(self.padding).clamped(size)
    }

    pub fn get(&self, id: StructureId) -> Option<&StructureRecord> {
        self.records.get(&id)
    }

    /// Tracked ids in ascending order
    pub fn ids(&self) -> Vec<StructureId> {
        self.records.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
