//! Tick system - the staff controller's cooperative loop
//!
//! `StaffManager::on_tick` runs once per simulation tick. It drains the
//! effect queue first, then either advances the incremental scan (and
//! stops there) or fires each periodic subsystem whose interval has
//! elapsed.
//!
//! Nothing here blocks or fails: degraded world queries mean less data,
//! and failed effects are counted, not retried.

use std::time::Instant;

use crate::analysis::scanner::{ParkAnalyzer, ScanStatus};
use crate::analysis::tracker::RideTracker;
use crate::core::config::StaffConfig;
use crate::core::error::Result;
use crate::core::orders::{default_orders, has_orders};
use crate::core::rng::DeterministicRandom;
use crate::core::types::{Role, StructureId, Tick};
use crate::effects::{Completion, Dispatched, DrainReport, EffectQueue, GameAction};
use crate::incident::{CrimeDetector, GuestFeedbackAnalyzer};
use crate::simulation::stats::{Statistics, StatsSnapshot};
use crate::staff::{
    DriverMetrics, HireContext, HireTrigger, HiringPolicy, NeedSignals, StaffDirectory,
    ZoneInputs, ZonePlanner, ZoneReport,
};
use crate::world::{DisplaySink, ParkHost, ParkWorld, Session};

/// Events generated during one controller tick
#[derive(Debug, Clone, PartialEq)]
pub enum StaffEvent {
    EffectsDrained(DrainReport),
    ScanProgressed { percent: f32 },
    ScanCompleted { paths: usize, rides: usize },
    StructuresDetected { ids: Vec<StructureId> },
    HiresRequested { count: usize, smart: bool },
    OrdersCorrected { count: usize },
    RescanStarted,
    ZonesRegenerated(ZoneReport),
    StatsPublished,
}

/// Tick each periodic task last ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LastRun {
    event_check: Tick,
    analysis: Tick,
    staff_process: Tick,
    hire_check: Tick,
    rescan: Tick,
    zone_regen: Tick,
    display: Tick,
}

fn due(now: Tick, last: Tick, interval: u64) -> bool {
    now.saturating_sub(last) >= interval
}

/// Owns every subsystem for one world session
pub struct StaffManager {
    config: StaffConfig,
    rng: DeterministicRandom,

    analyzer: ParkAnalyzer,
    tracker: RideTracker,
    crime: CrimeDetector,
    feedback: GuestFeedbackAnalyzer,
    directory: StaffDirectory,
    hiring: HiringPolicy,
    zones: ZonePlanner,
    queue: EffectQueue,
    stats: Statistics,

    tick: Tick,
    last: LastRun,
    /// Rides present when the first scan finished have been absorbed
    baseline_tracked: bool,
    observers: usize,
    display: Option<Box<dyn DisplaySink>>,
    results: Vec<Dispatched>,
}

impl StaffManager {
    pub fn new(config: StaffConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: DeterministicRandom::new(config.random_mode),
            analyzer: ParkAnalyzer::new(config.scan_cells_per_step, config.hotspot_cell_size),
            tracker: RideTracker::new(config.bfs_depth, config.structure_padding),
            crime: CrimeDetector::new(config.crime_sample_limit, config.hotspot_cell_size),
            feedback: GuestFeedbackAnalyzer::new(),
            directory: StaffDirectory::new(),
            hiring: HiringPolicy::new(),
            zones: ZonePlanner::new(),
            queue: EffectQueue::new(config.effects_per_tick),
            stats: Statistics::new(),
            tick: 0,
            last: LastRun::default(),
            baseline_tracked: false,
            observers: 0,
            display: None,
            results: Vec::new(),
            config,
        })
    }

    pub fn with_display(mut self, display: Box<dyn DisplaySink>) -> Self {
        self.display = Some(display);
        self
    }

    /// Run one controller tick
    ///
    /// Order of operations:
    /// 1. Read the host clock
    /// 2. Drain the effect queue and apply completions
    /// 3. Advance the scan if incomplete (push statistics, then stop)
    /// 4. Event-driven hiring
    /// 5. World-state refresh (litter, guests, crime, feedback)
    /// 6. Roster processing and order enforcement (timed)
    /// 7. Ratio hiring
    /// 8. Auto-rescan
    /// 9. Auto-zones, when stale or never generated
    /// 10. Statistics push
    pub fn on_tick<H: ParkHost>(&mut self, host: &mut H) -> Vec<StaffEvent> {
        let mut events = Vec::new();
        if !self.config.enabled {
            return events;
        }

        self.tick = host.current_tick();
        self.observers = host.observer_count();
        let can_mutate = host.can_mutate();

        self.drain_effects(host, can_mutate, &mut events);

        let world: &dyn ParkWorld = &*host;
        if !self.analyzer.is_complete() {
            self.advance_scan(world, &mut events);
            self.publish_stats(&mut events);
            return events;
        }

        let intervals = self.config.intervals;
        if due(self.tick, self.last.event_check, intervals.event_check) {
            self.last.event_check = self.tick;
            self.check_events(world, can_mutate, &mut events);
        }

        if due(self.tick, self.last.analysis, intervals.analysis) {
            self.last.analysis = self.tick;
            self.refresh_world_state(world);
        }

        if due(self.tick, self.last.staff_process, intervals.staff_process) {
            self.last.staff_process = self.tick;
            self.process_staff(world, can_mutate, &mut events);
        }

        if due(self.tick, self.last.hire_check, intervals.hire_check) {
            self.last.hire_check = self.tick;
            self.check_ratio_hiring(can_mutate, &mut events);
        }

        if due(self.tick, self.last.rescan, intervals.rescan) {
            self.last.rescan = self.tick;
            if self.config.auto_rescan {
                self.analyzer.start_scan(world);
                self.stats.auto_reanalyze += 1;
                events.push(StaffEvent::RescanStarted);
            }
        }

        if due(self.tick, self.last.zone_regen, intervals.zone_regen) {
            self.last.zone_regen = self.tick;
            if self.config.auto_zones
                && (self.directory.zones_stale() || self.zones.generations() == 0)
            {
                let before = self.zones.generations();
                let report = self.regenerate(world, can_mutate);
                if self.zones.generations() > before {
                    self.stats.auto_gen_zones += 1;
                    events.push(StaffEvent::ZonesRegenerated(report));
                }
            }
        }

        self.publish_stats(&mut events);
        events
    }

    /// Push a snapshot to the display when its interval has elapsed
    fn publish_stats(&mut self, events: &mut Vec<StaffEvent>) {
        if !due(self.tick, self.last.display, self.config.intervals.display) {
            return;
        }
        self.last.display = self.tick;
        let snapshot = self.snapshot();
        if let Some(display) = self.display.as_mut() {
            display.publish(&snapshot);
            events.push(StaffEvent::StatsPublished);
        }
    }

    fn drain_effects<H: ParkHost>(
        &mut self,
        host: &mut H,
        can_mutate: bool,
        events: &mut Vec<StaffEvent>,
    ) {
        let mut results = std::mem::take(&mut self.results);
        let report = self
            .queue
            .drain(can_mutate, host, self.config.debug, &mut results);

        if report.discarded > 0 {
            // Nothing queued here will ever reach the host
            self.hiring.clear_pending();
        }
        self.stats.dispatch_failures += report.dispatch_failures as u64;

        for dispatched in results.drain(..) {
            self.apply_completion(dispatched);
        }
        self.results = results;

        if report != DrainReport::default() {
            events.push(StaffEvent::EffectsDrained(report));
        }
    }

    fn apply_completion(&mut self, dispatched: Dispatched) {
        let ok = dispatched.outcome.is_success();
        match dispatched.on_complete {
            Completion::None => {}
            Completion::Hire { role, smart } => {
                self.hiring.on_hire_resolved(role);
                if ok {
                    self.stats.record_hire(role, smart);
                    self.directory.record_hire(role);
                    self.directory.mark_zones_stale();
                    tracing::info!(role = role.name(), smart, "Hired staff member");
                } else {
                    self.stats.hires_failed += 1;
                    tracing::debug!(
                        role = role.name(),
                        error = dispatched.outcome.error,
                        "Hire rejected"
                    );
                }
            }
            Completion::OrdersChanged => {
                if ok {
                    self.stats.orders_changed += 1;
                }
            }
            Completion::PatrolSet => {
                if ok {
                    self.stats.zones_set += 1;
                } else {
                    self.stats.zones_failed += 1;
                }
            }
            Completion::PatrolCleared => {
                if !ok {
                    tracing::debug!(error = dispatched.outcome.error, "Patrol clear rejected");
                }
            }
        }
    }

    fn advance_scan(&mut self, world: &dyn ParkWorld, events: &mut Vec<StaffEvent>) {
        match self.analyzer.step(world) {
            ScanStatus::InProgress => events.push(StaffEvent::ScanProgressed {
                percent: self.analyzer.progress_percent(),
            }),
            ScanStatus::Complete => {
                if !self.baseline_tracked {
                    // Rides that existed at load are not "new"
                    self.tracker.scan_all(world, self.tick);
                    self.tracker.get_newly_detected();
                    self.baseline_tracked = true;
                }
                events.push(StaffEvent::ScanCompleted {
                    paths: self.analyzer.paths().len(),
                    rides: self.analyzer.ride_count(),
                });
            }
        }
    }

    fn check_events(
        &mut self,
        world: &dyn ParkWorld,
        can_mutate: bool,
        events: &mut Vec<StaffEvent>,
    ) {
        let mut detected = Vec::new();
        if self.tracker.check_for_new_structures(world, self.tick) {
            detected = self.tracker.get_newly_detected();
            self.directory.mark_zones_stale();
            tracing::info!(count = detected.len(), "New rides detected");
            events.push(StaffEvent::StructuresDetected {
                ids: detected.clone(),
            });
        }

        let thresholds = &self.config.thresholds;
        let signals = NeedSignals {
            new_structures: detected.len(),
            needs_security: self.crime.needs_more_security(thresholds.crime),
            needs_handymen: self
                .feedback
                .needs_more_handymen(self.analyzer.litter_count(), thresholds),
            needs_entertainers: self.feedback.needs_more_entertainers(thresholds),
        };

        let ctx = HireContext {
            config: &self.config,
            directory: &self.directory,
            rng: &self.rng,
            tick: self.tick,
            can_mutate,
        };
        let count = self.hiring.evaluate_events(&ctx, &signals, &mut self.queue);
        if count > 0 {
            events.push(StaffEvent::HiresRequested { count, smart: true });
        }
    }

    fn refresh_world_state(&mut self, world: &dyn ParkWorld) {
        self.analyzer.update_litter_and_vandalism(world);
        self.analyzer.update_guest_density(world);
        self.crime.update(world, self.analyzer.paths());
        self.feedback.update(world);
    }

    fn process_staff(
        &mut self,
        world: &dyn ParkWorld,
        can_mutate: bool,
        events: &mut Vec<StaffEvent>,
    ) {
        let started = Instant::now();

        self.directory.refresh(world, self.tick);
        if self.config.enforce_orders && can_mutate {
            let count = self.enforce_orders();
            if count > 0 {
                events.push(StaffEvent::OrdersCorrected { count });
            }
        }

        self.stats.record_frame(started.elapsed().as_secs_f64() * 1000.0);
    }

    /// Queue an orders reset for every handyman or mechanic that drifted
    fn enforce_orders(&mut self) -> usize {
        let mut corrected = 0;
        for member in self.directory.members() {
            if !has_orders(member.role) {
                continue;
            }
            let wanted = default_orders(member.role, &self.config.tasks);
            if member.orders == wanted {
                continue;
            }
            let already_queued = self.queue.pending().any(|e| {
                matches!(e.action, GameAction::StaffSetOrders { id, .. } if id == member.id)
            });
            if already_queued {
                continue;
            }
            self.queue.enqueue(
                GameAction::StaffSetOrders {
                    id: member.id,
                    staff_orders: wanted,
                },
                Completion::OrdersChanged,
            );
            corrected += 1;
        }
        corrected
    }

    fn check_ratio_hiring(&mut self, can_mutate: bool, events: &mut Vec<StaffEvent>) {
        let metrics = DriverMetrics {
            guests: self.analyzer.guest_count(),
            structures: self.tracker.len(),
        };
        let ctx = HireContext {
            config: &self.config,
            directory: &self.directory,
            rng: &self.rng,
            tick: self.tick,
            can_mutate,
        };
        let count = self.hiring.evaluate_ratio(&ctx, &metrics, &mut self.queue);
        if count > 0 {
            events.push(StaffEvent::HiresRequested {
                count,
                smart: false,
            });
        }
    }

    fn regenerate(&mut self, world: &dyn ParkWorld, can_mutate: bool) -> ZoneReport {
        if !can_mutate || !self.analyzer.is_complete() {
            return ZoneReport::default();
        }
        self.directory.refresh(world, self.tick);
        let inputs = ZoneInputs {
            analyzer: &self.analyzer,
            tracker: &self.tracker,
            crime: &self.crime,
            feedback: &self.feedback,
        };
        self.zones.regenerate(
            &self.config,
            &mut self.directory,
            &inputs,
            can_mutate,
            &mut self.queue,
        )
    }

    // === OPERATOR ACTIONS ===

    /// Throw away the current topology and scan again from the first cell
    pub fn force_rescan(&mut self, world: &dyn ParkWorld) {
        tracing::info!("Rescan requested");
        self.analyzer.start_scan(world);
    }

    /// Regenerate every patrol zone now, ignoring the cadence
    pub fn regenerate_zones_now<H: ParkHost>(&mut self, host: &H) -> ZoneReport {
        let can_mutate = host.can_mutate();
        self.regenerate(host, can_mutate)
    }

    /// Queue one hire of `role`, bypassing auto-hire toggles but not caps
    pub fn hire_now(&mut self, session: &dyn Session, role: Role) -> bool {
        let ctx = HireContext {
            config: &self.config,
            directory: &self.directory,
            rng: &self.rng,
            tick: self.tick,
            can_mutate: session.can_mutate(),
        };
        self.hiring.submit(&ctx, role, HireTrigger::Manual, &mut self.queue)
    }

    pub fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    /// Start a fresh session for a newly loaded world
    ///
    /// Statistics are kept; everything derived from the old world is dropped.
    pub fn on_world_changed(&mut self) {
        tracing::info!("World changed; resetting controller state");
        let config = &self.config;
        self.analyzer = ParkAnalyzer::new(config.scan_cells_per_step, config.hotspot_cell_size);
        self.tracker.reset();
        self.crime.reset();
        self.feedback = GuestFeedbackAnalyzer::new();
        self.directory.reset();
        self.hiring = HiringPolicy::new();
        self.zones = ZonePlanner::new();
        self.queue.clear();
        self.tick = 0;
        self.last = LastRun::default();
        self.baseline_tracked = false;
    }

    // === ACCESSORS ===

    pub fn config(&self) -> &StaffConfig {
        &self.config
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn analyzer(&self) -> &ParkAnalyzer {
        &self.analyzer
    }

    pub fn tracker(&self) -> &RideTracker {
        &self.tracker
    }

    pub fn directory(&self) -> &StaffDirectory {
        &self.directory
    }

    pub fn hiring(&self) -> &HiringPolicy {
        &self.hiring
    }

    pub fn zones(&self) -> &ZonePlanner {
        &self.zones
    }

    pub fn queue(&self) -> &EffectQueue {
        &self.queue
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tick: self.tick,
            scan_percent: self.analyzer.progress_percent(),
            scan_complete: self.analyzer.is_complete(),
            completed_scans: self.analyzer.completed_scans(),
            hired: self.stats.hired,
            hires_failed: self.stats.hires_failed,
            orders_changed: self.stats.orders_changed,
            zones_set: self.stats.zones_set,
            zones_failed: self.stats.zones_failed,
            smart_hires: self.stats.smart_hires,
            dispatch_failures: self.stats.dispatch_failures,
            auto_reanalyze: self.stats.auto_reanalyze,
            auto_gen_zones: self.stats.auto_gen_zones,
            last_frame_ms: self.stats.last_frame_ms(),
            average_frame_ms: self.stats.average_frame_ms(),
            staff: self.directory.counts(),
            guests: self.analyzer.guest_count(),
            rides: self.analyzer.ride_count(),
            shops: self.analyzer.shop_count(),
            tracked_rides: self.tracker.len(),
            litter: self.analyzer.litter_count(),
            crimes: self.crime.crime_count(),
            happiness_percent: self.feedback.happiness_percent(),
            pending_effects: self.queue.len(),
            observers: self.observers,
        }
    }
}
