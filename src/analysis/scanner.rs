//! Incremental world scanner
//!
//! A full pass over every tile is far too expensive for one tick, so the
//! scan is a resumable state machine: each `step` inspects at most
//! `cells_per_step` tiles and picks up where the previous step stopped.
//! Litter and guest density are not part of the full scan; they are
//! re-sampled from live entity lists on their own, shorter cadence.

use crate::core::types::{StructureId, TileCoord, WorldSize};
use crate::spatial::{Hotspot, SpatialIndex};
use crate::world::{EntranceKind, ParkWorld, StructureKind, TileElement};

/// Default number of tiles inspected per step
pub const DEFAULT_CELLS_PER_STEP: u32 = 500;

/// A walkable tile discovered by the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTile {
    pub coord: TileCoord,
    pub is_queue_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackTile {
    pub coord: TileCoord,
    pub structure: StructureId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntranceTile {
    pub coord: TileCoord,
    pub kind: EntranceKind,
    pub structure: Option<StructureId>,
}

/// Guest sample stored in the density index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuestSample {
    pub happiness_percent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    InProgress,
    Complete,
}

/// Linear cursor over `width * height` cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanProgress {
    pub progress: u64,
    pub total: u64,
    width: u64,
}

impl ScanProgress {
    pub fn new(size: WorldSize) -> Self {
        Self {
            progress: 0,
            total: size.cell_count(),
            width: size.width.max(0) as u64,
        }
    }

    pub fn is_done(&self) -> bool {
        self.progress >= self.total
    }

    /// Take the next batch of at most `budget` cells and advance past them
    pub fn next_batch(&mut self, budget: u32) -> impl Iterator<Item = TileCoord> {
        let start = self.progress;
        let end = (start + budget as u64).min(self.total);
        self.progress = end.max(start);
        let width = self.width.max(1);
        (start..end).map(move |i| TileCoord::new((i % width) as i32, (i / width) as i32))
    }

    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.progress.min(self.total) as f64 * 100.0 / self.total as f64) as f32
    }
}

/// Park topology and density model
pub struct ParkAnalyzer {
    size: WorldSize,
    scan: ScanProgress,
    cells_per_step: u32,
    scan_started: bool,
    finished: bool,
    completed_scans: u64,

    paths: Vec<PathTile>,
    vandalized_paths: usize,
    tracks: Vec<TrackTile>,
    entrances: Vec<EntranceTile>,

    ride_count: usize,
    shop_count: usize,

    litter_index: SpatialIndex<()>,
    guest_index: SpatialIndex<GuestSample>,
    guest_count: usize,
}

impl ParkAnalyzer {
    pub fn new(cells_per_step: u32, hotspot_cell_size: i32) -> Self {
        Self {
            size: WorldSize::default(),
            scan: ScanProgress::default(),
            cells_per_step: cells_per_step.max(1),
            scan_started: false,
            finished: false,
            completed_scans: 0,
            paths: Vec::new(),
            vandalized_paths: 0,
            tracks: Vec::new(),
            entrances: Vec::new(),
            ride_count: 0,
            shop_count: 0,
            litter_index: SpatialIndex::new(hotspot_cell_size),
            guest_index: SpatialIndex::new(hotspot_cell_size),
            guest_count: 0,
        }
    }

    /// Forget all topology and start a fresh pass over the map
    pub fn start_scan(&mut self, world: &dyn ParkWorld) {
        self.size = match world.map_size() {
            Ok(size) => size,
            Err(e) => {
                tracing::debug!("Map size unavailable, scan will be empty: {}", e);
                WorldSize::default()
            }
        };
        self.scan = ScanProgress::new(self.size);
        self.scan_started = true;
        self.finished = false;
        self.paths.clear();
        self.vandalized_paths = 0;
        self.tracks.clear();
        self.entrances.clear();

        tracing::debug!(
            width = self.size.width,
            height = self.size.height,
            total = self.scan.total,
            "Starting park scan"
        );
    }

    /// Inspect the next batch of cells
    ///
    /// Returns `Complete` once every cell has been inspected. Further
    /// calls are no-ops until the next `start_scan`.
    pub fn step(&mut self, world: &dyn ParkWorld) -> ScanStatus {
        if !self.scan_started {
            self.start_scan(world);
        }
        if self.finished {
            return ScanStatus::Complete;
        }

        let batch: Vec<TileCoord> = self.scan.next_batch(self.cells_per_step).collect();
        for coord in batch {
            match world.tile_elements(coord) {
                Ok(elements) => self.classify(coord, &elements),
                Err(e) => tracing::trace!("Tile ({}, {}) skipped: {}", coord.x, coord.y, e),
            }
        }

        if self.scan.is_done() {
            self.finish_scan(world);
            self.finished = true;
            ScanStatus::Complete
        } else {
            ScanStatus::InProgress
        }
    }

    fn classify(&mut self, coord: TileCoord, elements: &[TileElement]) {
        for element in elements {
            match *element {
                TileElement::Path { queue, broken } => {
                    self.paths.push(PathTile {
                        coord,
                        is_queue_line: queue,
                    });
                    if broken {
                        self.vandalized_paths += 1;
                    }
                }
                TileElement::Track { structure } => {
                    self.tracks.push(TrackTile { coord, structure });
                }
                TileElement::Entrance { kind, structure } => {
                    self.entrances.push(EntranceTile {
                        coord,
                        kind,
                        structure,
                    });
                }
                TileElement::Other => {}
            }
        }
    }

    fn finish_scan(&mut self, world: &dyn ParkWorld) {
        self.completed_scans += 1;
        match world.structures() {
            Ok(structures) => {
                self.ride_count = structures
                    .iter()
                    .filter(|s| s.kind == StructureKind::Ride)
                    .count();
                self.shop_count = structures.len() - self.ride_count;
            }
            Err(e) => tracing::debug!("Structure roster unavailable after scan: {}", e),
        }

        tracing::info!(
            paths = self.paths.len(),
            entrances = self.entrances.len(),
            rides = self.ride_count,
            shops = self.shop_count,
            "Park scan complete"
        );
    }

    /// Rebuild the litter index from the live litter list
    ///
    /// Vandalism is taken from the broken path additions seen by the last
    /// full scan; live re-sampling of paths belongs to the crime detector.
    pub fn update_litter_and_vandalism(&mut self, world: &dyn ParkWorld) {
        match world.litter() {
            Ok(items) => self.litter_index.rebuild(items.into_iter().map(|item| {
                let tile = item.position.tile();
                (tile.x, tile.y, ())
            })),
            Err(e) => {
                tracing::debug!("Litter query failed: {}", e);
                self.litter_index.clear();
            }
        }
    }

    /// Rebuild the guest density index from the live guest list
    pub fn update_guest_density(&mut self, world: &dyn ParkWorld) {
        match world.guests() {
            Ok(guests) => {
                self.guest_count = guests.len();
                self.guest_index.rebuild(guests.iter().map(|guest| {
                    let tile = guest.position.tile();
                    (
                        tile.x,
                        tile.y,
                        GuestSample {
                            happiness_percent: guest.happiness_percent(),
                        },
                    )
                }));
            }
            Err(e) => {
                tracing::debug!("Guest query failed: {}", e);
                self.guest_count = 0;
                self.guest_index.clear();
            }
        }
    }

    pub fn litter_hotspots(&self, limit: usize) -> Vec<Hotspot> {
        self.litter_index.hotspots(limit)
    }

    pub fn guest_hotspots(&self, limit: usize) -> Vec<Hotspot> {
        self.guest_index.hotspots(limit)
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    pub fn progress_percent(&self) -> f32 {
        if !self.scan_started {
            return 0.0;
        }
        self.scan.percent()
    }

    pub fn progress(&self) -> ScanProgress {
        self.scan
    }

    pub fn completed_scans(&self) -> u64 {
        self.completed_scans
    }

    pub fn world_size(&self) -> WorldSize {
        self.size
    }

    pub fn paths(&self) -> &[PathTile] {
        &self.paths
    }

    pub fn tracks(&self) -> &[TrackTile] {
        &self.tracks
    }

    pub fn entrances(&self) -> &[EntranceTile] {
        &self.entrances
    }

    pub fn park_entrances(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.entrances
            .iter()
            .filter(|e| e.kind == EntranceKind::ParkEntrance)
            .map(|e| e.coord)
    }

    pub fn vandalized_paths(&self) -> usize {
        self.vandalized_paths
    }

    pub fn ride_count(&self) -> usize {
        self.ride_count
    }

    pub fn shop_count(&self) -> usize {
        self.shop_count
    }

    pub fn litter_count(&self) -> usize {
        self.litter_index.len()
    }

    pub fn guest_count(&self) -> usize {
        self.guest_count
    }

    pub fn guest_index(&self) -> &SpatialIndex<GuestSample> {
        &self.guest_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FinePos;
    use crate::sandbox::SandboxPark;

    fn run_to_completion(analyzer: &mut ParkAnalyzer, park: &SandboxPark) -> usize {
        let mut steps = 1;
        while analyzer.step(park) == ScanStatus::InProgress {
            steps += 1;
            assert!(steps < 10_000, "scan never finished");
        }
        steps
    }

    #[test]
    fn test_scan_visits_every_cell_once() {
        let park = SandboxPark::new(37, 23);
        let mut analyzer = ParkAnalyzer::new(100, 8);
        analyzer.start_scan(&park);

        let steps = run_to_completion(&mut analyzer, &park);
        // 851 cells at 100 per step
        assert_eq!(steps, 9);

        let log = park.take_tile_log();
        assert_eq!(log.len(), 37 * 23);
        let mut unique = log.clone();
        unique.sort_by_key(|c| (c.y, c.x));
        unique.dedup();
        assert_eq!(unique.len(), log.len());
        assert_eq!(analyzer.completed_scans(), 1);

        // Extra steps do no more work and do not recount completion
        assert_eq!(analyzer.step(&park), ScanStatus::Complete);
        assert!(park.take_tile_log().is_empty());
        assert_eq!(analyzer.completed_scans(), 1);
    }

    #[test]
    fn test_progress_cursor_maps_row_major() {
        let mut progress = ScanProgress::new(WorldSize::new(4, 3));
        let first: Vec<TileCoord> = progress.next_batch(5).collect();
        assert_eq!(first[3], TileCoord::new(3, 0));
        assert_eq!(first[4], TileCoord::new(0, 1));
        assert!(!progress.is_done());
        let rest: Vec<TileCoord> = progress.next_batch(100).collect();
        assert_eq!(rest.len(), 7);
        assert_eq!(rest[6], TileCoord::new(3, 2));
        assert!(progress.is_done());
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_classifies_topology() {
        let mut park = SandboxPark::new(20, 20);
        park.add_path(TileCoord::new(2, 2));
        park.add_queue(TileCoord::new(3, 2));
        park.add_broken_path(TileCoord::new(4, 2));
        park.add_park_entrance(TileCoord::new(0, 10));
        park.add_ride(StructureId(1), TileCoord::new(6, 6), TileCoord::new(5, 2), None);
        park.add_stall(StructureId(2), TileCoord::new(10, 10));

        let mut analyzer = ParkAnalyzer::new(DEFAULT_CELLS_PER_STEP, 8);
        analyzer.start_scan(&park);
        run_to_completion(&mut analyzer, &park);

        assert_eq!(analyzer.paths().len(), 3);
        assert!(analyzer.paths()[1].is_queue_line);
        assert_eq!(analyzer.vandalized_paths(), 1);
        assert_eq!(analyzer.tracks().len(), 1);
        assert_eq!(
            analyzer.park_entrances().collect::<Vec<_>>(),
            vec![TileCoord::new(0, 10)]
        );
        assert_eq!(analyzer.ride_count(), 1);
        assert_eq!(analyzer.shop_count(), 1);
    }

    #[test]
    fn test_failed_tiles_do_not_abort_scan() {
        let mut park = SandboxPark::new(10, 10);
        park.add_path(TileCoord::new(1, 1));
        park.add_path(TileCoord::new(5, 5));
        park.fail_tile(TileCoord::new(5, 5));

        let mut analyzer = ParkAnalyzer::new(30, 8);
        analyzer.start_scan(&park);
        run_to_completion(&mut analyzer, &park);

        assert!(analyzer.is_complete());
        assert_eq!(analyzer.paths().len(), 1);
    }

    #[test]
    fn test_restart_resets_topology() {
        let mut park = SandboxPark::new(8, 8);
        park.add_path(TileCoord::new(1, 1));

        let mut analyzer = ParkAnalyzer::new(500, 8);
        analyzer.start_scan(&park);
        run_to_completion(&mut analyzer, &park);
        assert_eq!(analyzer.paths().len(), 1);

        analyzer.start_scan(&park);
        assert!(!analyzer.is_complete());
        assert!(analyzer.paths().is_empty());
        assert_eq!(analyzer.progress_percent(), 0.0);
        run_to_completion(&mut analyzer, &park);
        assert_eq!(analyzer.paths().len(), 1);
        assert_eq!(analyzer.completed_scans(), 2);
    }

    #[test]
    fn test_density_indexes_rebuild() {
        let mut park = SandboxPark::new(64, 64);
        for i in 0..5 {
            park.add_litter(FinePos::new(10 * 32 + i, 10 * 32));
        }
        park.add_litter(FinePos::new(50 * 32, 50 * 32));
        park.add_guest(TileCoord::new(3, 3), 255);
        park.add_guest(TileCoord::new(4, 3), 0);

        let mut analyzer = ParkAnalyzer::new(500, 8);
        analyzer.update_litter_and_vandalism(&park);
        analyzer.update_guest_density(&park);

        assert_eq!(analyzer.litter_count(), 6);
        let hotspots = analyzer.litter_hotspots(3);
        assert_eq!(hotspots[0].count, 5);
        assert_eq!(hotspots[0].key, (1, 1));
        assert_eq!(analyzer.guest_count(), 2);
        assert_eq!(analyzer.guest_hotspots(1)[0].count, 2);

        // A failing query empties the index instead of keeping stale data
        park.set_entity_queries_failing(true);
        analyzer.update_litter_and_vandalism(&park);
        assert_eq!(analyzer.litter_count(), 0);
    }

    #[test]
    fn test_unavailable_map_size_completes_empty() {
        let mut park = SandboxPark::new(10, 10);
        park.set_map_size_failing(true);

        let mut analyzer = ParkAnalyzer::new(500, 8);
        analyzer.start_scan(&park);
        assert_eq!(analyzer.step(&park), ScanStatus::Complete);
        assert!(analyzer.is_complete());
        assert_eq!(analyzer.completed_scans(), 1);
        assert!(analyzer.paths().is_empty());
    }
}
