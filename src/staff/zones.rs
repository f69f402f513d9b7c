//! Patrol zone planning
//!
//! Every agent gets one rectangular patrol area, chosen by a strategy per
//! role:
//! - handymen tile the map in an overlapping grid, round-robin
//! - mechanics split the known rides between them and cover each share's
//!   access paths (a coarser grid when no rides are known)
//! - security centre on crime, then crowds, then park entrances
//! - entertainers centre on the unhappiest crowds, then crowds, then entrances
//!
//! All zones are cleared before new ones are set, and every rectangle is
//! clamped to the map.

use crate::analysis::scanner::ParkAnalyzer;
use crate::analysis::tracker::RideTracker;
use crate::core::config::StaffConfig;
use crate::core::types::{AgentId, PatrolRect, Role, TileCoord, WorldSize};
use crate::effects::{Completion, EffectQueue, GameAction};
use crate::incident::{CrimeDetector, GuestFeedbackAnalyzer};
use crate::staff::directory::StaffDirectory;

/// Read-only model the strategies draw from
pub struct ZoneInputs<'a> {
    pub analyzer: &'a ParkAnalyzer,
    pub tracker: &'a RideTracker,
    pub crime: &'a CrimeDetector,
    pub feedback: &'a GuestFeedbackAnalyzer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneAssignment {
    pub agent: AgentId,
    pub role: Role,
    pub rect: PatrolRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneReport {
    pub cleared: usize,
    pub assigned: usize,
    /// Agents left without a new zone (empty coverage)
    pub skipped: usize,
}

/// Overlapping uniform grid over the map, row-major
pub fn grid_cells(size: WorldSize, zone_size: i32, overlap: i32) -> Vec<PatrolRect> {
    if size.width <= 0 || size.height <= 0 || zone_size <= 0 {
        return Vec::new();
    }
    let cols = (size.width + zone_size - 1) / zone_size;
    let rows = (size.height + zone_size - 1) / zone_size;

    let mut cells = Vec::with_capacity((cols * rows) as usize);
    for zy in 0..rows {
        for zx in 0..cols {
            let rect = PatrolRect::new(
                zx * zone_size - overlap,
                zy * zone_size - overlap,
                (zx + 1) * zone_size + overlap,
                (zy + 1) * zone_size + overlap,
            );
            cells.push(rect.clamped(size));
        }
    }
    cells
}

#[derive(Debug, Default)]
pub struct ZonePlanner {
    generations: u64,
}

impl ZonePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times zones have been fully regenerated
    pub fn generations(&self) -> u64 {
        self.generations
    }

    /// Compute (without enqueueing) a zone for every agent of every enabled role
    pub fn plan(
        &self,
        config: &StaffConfig,
        directory: &StaffDirectory,
        inputs: &ZoneInputs<'_>,
    ) -> (Vec<ZoneAssignment>, usize) {
        let size = inputs.analyzer.world_size();
        let mut assignments = Vec::new();
        let mut skipped = 0;

        for role in Role::ALL {
            if !config.role(role).enabled {
                continue;
            }
            let agents: Vec<AgentId> = directory.by_role(role).map(|m| m.id).collect();
            if agents.is_empty() {
                continue;
            }

            let rects = match role {
                Role::Handyman => handyman_zones(agents.len(), size, config),
                Role::Mechanic => mechanic_zones(agents.len(), size, config, inputs.tracker),
                Role::Security => security_zones(agents.len(), size, config, inputs),
                Role::Entertainer => entertainer_zones(agents.len(), size, config, inputs),
            };

            for (agent, rect) in agents.into_iter().zip(rects) {
                match rect {
                    Some(rect) if !rect.is_empty() => assignments.push(ZoneAssignment {
                        agent,
                        role,
                        rect: rect.clamped(size),
                    }),
                    _ => skipped += 1,
                }
            }
        }

        (assignments, skipped)
    }

    /// Clear every agent's zone, then enqueue fresh ones
    ///
    /// No-op without authority, before the first full scan, or with no staff.
    pub fn regenerate(
        &mut self,
        config: &StaffConfig,
        directory: &mut StaffDirectory,
        inputs: &ZoneInputs<'_>,
        can_mutate: bool,
        queue: &mut EffectQueue,
    ) -> ZoneReport {
        let mut report = ZoneReport::default();
        if !can_mutate || !inputs.analyzer.is_complete() || directory.is_empty() {
            return report;
        }

        let size = inputs.analyzer.world_size();
        let whole = PatrolRect::world(size);
        for member in directory.members() {
            queue.enqueue(
                GameAction::clear_patrol(member.id, whole),
                Completion::PatrolCleared,
            );
            report.cleared += 1;
        }

        let (assignments, skipped) = self.plan(config, directory, inputs);
        for assignment in &assignments {
            queue.enqueue(
                GameAction::set_patrol(assignment.agent, assignment.rect),
                Completion::PatrolSet,
            );
        }
        report.assigned = assignments.len();
        report.skipped = skipped;

        directory.clear_zones_stale();
        self.generations += 1;

        tracing::info!(
            assigned = report.assigned,
            skipped = report.skipped,
            "Patrol zones regenerated"
        );
        report
    }
}

fn handyman_zones(agents: usize, size: WorldSize, config: &StaffConfig) -> Vec<Option<PatrolRect>> {
    round_robin(agents, &grid_cells(size, config.zone_size, config.zone_overlap))
}

fn mechanic_zones(
    agents: usize,
    size: WorldSize,
    config: &StaffConfig,
    tracker: &RideTracker,
) -> Vec<Option<PatrolRect>> {
    if tracker.is_empty() {
        let cells = grid_cells(size, config.zone_size * 2, config.zone_overlap);
        return round_robin(agents, &cells);
    }

    let ids = tracker.ids();
    let per_agent = ids.len().div_ceil(agents);
    (0..agents)
        .map(|k| {
            let start = (k * per_agent).min(ids.len());
            let end = ((k + 1) * per_agent).min(ids.len());
            let rect = ids[start..end]
                .iter()
                .map(|&id| tracker.coverage_bounding_box(id, size))
                .fold(PatrolRect::EMPTY, |acc, r| acc.union(&r));
            (!rect.is_empty()).then_some(rect)
        })
        .collect()
}

fn security_zones(
    agents: usize,
    size: WorldSize,
    config: &StaffConfig,
    inputs: &ZoneInputs<'_>,
) -> Vec<Option<PatrolRect>> {
    let mut centers: Vec<TileCoord> = inputs
        .crime
        .crime_hotspots(agents)
        .iter()
        .map(|h| h.center)
        .collect();
    centers.extend(inputs.analyzer.guest_hotspots(agents).iter().map(|h| h.center));
    centers.extend(inputs.analyzer.park_entrances());
    centered(agents, size, config.zone_size, centers)
}

fn entertainer_zones(
    agents: usize,
    size: WorldSize,
    config: &StaffConfig,
    inputs: &ZoneInputs<'_>,
) -> Vec<Option<PatrolRect>> {
    let unhappy = inputs.feedback.unhappy_areas(
        inputs.analyzer.guest_index(),
        config.thresholds.unhappy_percent,
    );
    let mut centers: Vec<TileCoord> = unhappy.iter().take(agents).map(|a| a.center).collect();
    centers.extend(inputs.analyzer.guest_hotspots(agents).iter().map(|h| h.center));
    centers.extend(inputs.analyzer.park_entrances());
    centered(agents, size, config.zone_size, centers)
}

fn round_robin(agents: usize, cells: &[PatrolRect]) -> Vec<Option<PatrolRect>> {
    if cells.is_empty() {
        return vec![None; agents];
    }
    (0..agents).map(|k| Some(cells[k % cells.len()])).collect()
}

/// Zones of half-width `radius` around `centers` in priority order, world centre last
fn centered(
    agents: usize,
    size: WorldSize,
    radius: i32,
    mut centers: Vec<TileCoord>,
) -> Vec<Option<PatrolRect>> {
    centers.push(size.center());
    (0..agents)
        .map(|k| Some(PatrolRect::around(centers[k % centers.len()], radius).clamped(size)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scanner::ScanStatus;
    use crate::core::types::{FinePos, StructureId};
    use crate::sandbox::SandboxPark;

    struct Model {
        analyzer: ParkAnalyzer,
        tracker: RideTracker,
        crime: CrimeDetector,
        feedback: GuestFeedbackAnalyzer,
        directory: StaffDirectory,
    }

    impl Model {
        fn build(park: &SandboxPark, config: &StaffConfig) -> Self {
            let mut analyzer = ParkAnalyzer::new(100_000, config.hotspot_cell_size);
            analyzer.start_scan(park);
            assert_eq!(analyzer.step(park), ScanStatus::Complete);
            analyzer.update_litter_and_vandalism(park);
            analyzer.update_guest_density(park);

            let mut tracker = RideTracker::new(config.bfs_depth, config.structure_padding);
            tracker.scan_all(park, 0);

            let mut crime = CrimeDetector::new(config.crime_sample_limit, config.hotspot_cell_size);
            crime.update(park, analyzer.paths());

            let mut feedback = GuestFeedbackAnalyzer::new();
            feedback.update(park);

            let mut directory = StaffDirectory::new();
            directory.refresh(park, 0);

            Self {
                analyzer,
                tracker,
                crime,
                feedback,
                directory,
            }
        }

        fn inputs(&self) -> ZoneInputs<'_> {
            ZoneInputs {
                analyzer: &self.analyzer,
                tracker: &self.tracker,
                crime: &self.crime,
                feedback: &self.feedback,
            }
        }
    }

    #[test]
    fn test_grid_scenario_128_by_15() {
        let size = WorldSize::new(128, 128);
        let cells = grid_cells(size, 15, 2);
        assert_eq!(cells.len(), 81);

        let mut park = SandboxPark::new(128, 128);
        for _ in 0..5 {
            park.add_staff(Role::Handyman, 15);
        }
        let config = StaffConfig::default();
        let model = Model::build(&park, &config);

        let (assignments, skipped) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());
        assert_eq!(skipped, 0);
        assert_eq!(assignments.len(), 5);
        for (k, assignment) in assignments.iter().enumerate() {
            let zx = k as i32 % 9;
            assert_eq!(assignment.rect, cells[k]);
            assert_eq!(assignment.rect.x1, (zx * 15 - 2).max(0));
            assert_eq!(assignment.rect.x2, ((zx + 1) * 15 + 2).min(127));
            assert_eq!(assignment.rect.y1, 0);
            assert_eq!(assignment.rect.y2, 17);
        }
    }

    #[test]
    fn test_last_grid_column_clamped() {
        let cells = grid_cells(WorldSize::new(128, 128), 15, 2);
        let last = cells[80];
        assert_eq!(last, PatrolRect::new(118, 118, 127, 127));
    }

    #[test]
    fn test_empty_world_enqueues_nothing() {
        let park = SandboxPark::new(64, 64);
        let config = StaffConfig::default();
        let mut model = Model::build(&park, &config);
        let inputs = ZoneInputs {
            analyzer: &model.analyzer,
            tracker: &model.tracker,
            crime: &model.crime,
            feedback: &model.feedback,
        };

        let mut planner = ZonePlanner::new();
        let mut queue = EffectQueue::new(5);
        let report = planner.regenerate(&config, &mut model.directory, &inputs, true, &mut queue);
        assert_eq!(report, ZoneReport::default());
        assert!(queue.is_empty());
        assert_eq!(planner.generations(), 0);
    }

    #[test]
    fn test_regenerate_clears_before_setting() {
        let mut park = SandboxPark::new(64, 64);
        park.add_staff(Role::Handyman, 15);
        park.add_staff(Role::Security, 0);
        let config = StaffConfig::default();
        let mut model = Model::build(&park, &config);
        model.directory.mark_zones_stale();
        let inputs = ZoneInputs {
            analyzer: &model.analyzer,
            tracker: &model.tracker,
            crime: &model.crime,
            feedback: &model.feedback,
        };

        let mut planner = ZonePlanner::new();
        let mut queue = EffectQueue::new(5);
        let report = planner.regenerate(&config, &mut model.directory, &inputs, true, &mut queue);
        assert_eq!(report.cleared, 2);
        assert_eq!(report.assigned, 2);
        assert!(!model.directory.zones_stale());

        let completions: Vec<Completion> = queue.pending().map(|e| e.on_complete).collect();
        assert_eq!(
            completions,
            vec![
                Completion::PatrolCleared,
                Completion::PatrolCleared,
                Completion::PatrolSet,
                Completion::PatrolSet
            ]
        );
    }

    #[test]
    fn test_regenerate_needs_authority() {
        let mut park = SandboxPark::new(32, 32);
        park.add_staff(Role::Handyman, 15);
        let config = StaffConfig::default();
        let mut model = Model::build(&park, &config);
        let inputs = ZoneInputs {
            analyzer: &model.analyzer,
            tracker: &model.tracker,
            crime: &model.crime,
            feedback: &model.feedback,
        };

        let mut queue = EffectQueue::new(5);
        let report =
            ZonePlanner::new().regenerate(&config, &mut model.directory, &inputs, false, &mut queue);
        assert_eq!(report.cleared, 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_mechanics_split_rides() {
        let mut park = SandboxPark::new(100, 100);
        // Three rides with entrances far apart
        park.add_ride(StructureId(1), TileCoord::new(10, 12), TileCoord::new(10, 10), None);
        park.add_ride(StructureId(2), TileCoord::new(50, 52), TileCoord::new(50, 50), None);
        park.add_ride(StructureId(3), TileCoord::new(90, 92), TileCoord::new(90, 90), None);
        park.add_staff(Role::Mechanic, 3);
        park.add_staff(Role::Mechanic, 3);

        let config = StaffConfig::default();
        let model = Model::build(&park, &config);
        let (assignments, _) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());

        // ceil(3 / 2) = 2 rides for the first mechanic, 1 for the second
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].rect, PatrolRect::new(7, 7, 53, 53));
        assert_eq!(assignments[1].rect, PatrolRect::new(87, 87, 93, 93));
    }

    #[test]
    fn test_mechanics_without_rides_use_coarse_grid() {
        let mut park = SandboxPark::new(100, 100);
        park.add_staff(Role::Mechanic, 3);
        park.add_staff(Role::Mechanic, 3);

        let config = StaffConfig::default();
        let model = Model::build(&park, &config);
        let (assignments, _) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());
        let coarse = grid_cells(WorldSize::new(100, 100), 30, 2);
        assert_eq!(assignments[0].rect, coarse[0]);
        assert_eq!(assignments[1].rect, coarse[1]);
    }

    #[test]
    fn test_mechanic_with_empty_coverage_is_skipped() {
        let mut park = SandboxPark::new(50, 50);
        park.add_ride_without_stations(StructureId(1));
        park.add_staff(Role::Mechanic, 3);

        let config = StaffConfig::default();
        let model = Model::build(&park, &config);
        let (assignments, skipped) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());
        assert!(assignments.is_empty());
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_security_prefers_crime_then_falls_back() {
        let mut park = SandboxPark::new(100, 100);
        for x in 60..64 {
            park.add_broken_path(TileCoord::new(x, 60));
        }
        park.add_staff(Role::Security, 0);

        let config = StaffConfig::default();
        let model = Model::build(&park, &config);
        let (assignments, _) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());
        // Crime bucket (7,7) with cell size 8 is centred on (60,60)
        assert_eq!(assignments[0].rect, PatrolRect::around(TileCoord::new(60, 60), 15));

        // Nothing known at all: world centre
        let mut park = SandboxPark::new(100, 100);
        park.add_staff(Role::Security, 0);
        let model = Model::build(&park, &config);
        let (assignments, _) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());
        assert_eq!(assignments[0].rect, PatrolRect::around(TileCoord::new(50, 50), 15));
    }

    #[test]
    fn test_entertainers_go_to_unhappiest_area() {
        let mut park = SandboxPark::new(100, 100);
        // Happy crowd of 6 near (12,12), unhappy crowd of 3 near (84,84)
        for _ in 0..6 {
            park.add_guest(TileCoord::new(12, 12), 240);
        }
        for _ in 0..3 {
            park.add_guest(TileCoord::new(84, 84), 20);
        }
        park.add_litter(FinePos::new(0, 0));
        park.add_staff(Role::Entertainer, 0);
        park.add_staff(Role::Entertainer, 0);

        let config = StaffConfig::default();
        let model = Model::build(&park, &config);
        let (assignments, _) =
            ZonePlanner::new().plan(&config, &model.directory, &model.inputs());
        // Unhappy bucket (10,10) centre (84,84); then the busiest guest bucket (1,1) centre (12,12)
        assert_eq!(assignments[0].rect, PatrolRect::around(TileCoord::new(84, 84), 15));
        assert_eq!(
            assignments[1].rect,
            PatrolRect::around(TileCoord::new(12, 12), 15).clamped(WorldSize::new(100, 100))
        );
    }
}
