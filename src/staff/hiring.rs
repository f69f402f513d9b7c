//! Hiring policy
//!
//! Two independent triggers request hires:
//! - ratio-based: keep each role at `clamp(ceil(metric * ratio), min, max)`
//! - event-based ("smart"): a new ride, or an incident signal crossing its
//!   threshold, asks for one more of the relevant role
//!
//! Both are gated by mutation authority and the global auto-hire toggle,
//! and both count hires still waiting in the effect queue, so a burst of
//! triggers between roster refreshes never pushes a role past its max.

use crate::core::config::{RolePolicy, StaffConfig};
use crate::core::orders::default_orders;
use crate::core::rng::DeterministicRandom;
use crate::core::types::{Role, RoleCounts, Tick};
use crate::effects::{Completion, EffectQueue, GameAction};
use crate::staff::directory::StaffDirectory;

/// Number of entertainer costumes the host offers
pub const ENTERTAINER_COSTUMES: i64 = 11;

/// Why a hire was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HireTrigger {
    Ratio,
    StructureBuilt,
    Crime,
    Litter,
    Unhappiness,
    /// Operator asked directly; auto-hire toggles do not apply
    Manual,
}

impl HireTrigger {
    pub fn is_smart(self) -> bool {
        matches!(
            self,
            HireTrigger::StructureBuilt
                | HireTrigger::Crime
                | HireTrigger::Litter
                | HireTrigger::Unhappiness
        )
    }
}

/// Target headcount for a role: `clamp(ceil(metric * ratio), min, max)`
pub fn hire_target(metric: usize, policy: &RolePolicy) -> u32 {
    let raw = (metric as f64 * policy.ratio).ceil();
    let raw = if raw.is_finite() && raw > 0.0 {
        raw.min(u32::MAX as f64) as u32
    } else {
        0
    };
    raw.max(policy.min).min(policy.max)
}

/// Inputs for the ratio trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverMetrics {
    pub guests: usize,
    pub structures: usize,
}

impl DriverMetrics {
    pub fn for_role(&self, role: Role) -> usize {
        match role {
            Role::Mechanic => self.structures,
            Role::Handyman | Role::Security | Role::Entertainer => self.guests,
        }
    }
}

/// Inputs for the event trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeedSignals {
    pub new_structures: usize,
    pub needs_security: bool,
    pub needs_handymen: bool,
    pub needs_entertainers: bool,
}

/// Shared read-only state for one evaluation
pub struct HireContext<'a> {
    pub config: &'a StaffConfig,
    pub directory: &'a StaffDirectory,
    pub rng: &'a DeterministicRandom,
    pub tick: Tick,
    pub can_mutate: bool,
}

#[derive(Debug, Default)]
pub struct HiringPolicy {
    pending: RoleCounts,
}

impl HiringPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hires enqueued but not yet confirmed
    pub fn pending(&self, role: Role) -> u64 {
        self.pending.get(role)
    }

    /// Current headcount plus hires in flight or not yet on the roster
    pub fn effective_count(&self, directory: &StaffDirectory, role: Role) -> u64 {
        directory.count(role) as u64 + directory.unconfirmed(role) + self.pending(role)
    }

    /// A queued hire reached the host (whatever the result)
    pub fn on_hire_resolved(&mut self, role: Role) {
        let pending = self.pending.get(role);
        self.pending.set(role, pending.saturating_sub(1));
    }

    /// Queued hires were thrown away without reaching the host
    pub fn clear_pending(&mut self) {
        self.pending = RoleCounts::default();
    }

    /// Ratio trigger; returns the number of hires enqueued
    pub fn evaluate_ratio(
        &mut self,
        ctx: &HireContext<'_>,
        metrics: &DriverMetrics,
        queue: &mut EffectQueue,
    ) -> usize {
        let mut hired = 0;
        for role in Role::ALL {
            let target = hire_target(metrics.for_role(role), ctx.config.role(role)) as u64;
            if self.effective_count(ctx.directory, role) < target
                && self.submit(ctx, role, HireTrigger::Ratio, queue)
            {
                hired += 1;
            }
        }
        hired
    }

    /// Event trigger; returns the number of hires enqueued
    pub fn evaluate_events(
        &mut self,
        ctx: &HireContext<'_>,
        signals: &NeedSignals,
        queue: &mut EffectQueue,
    ) -> usize {
        if !ctx.config.smart_hiring {
            return 0;
        }

        let mut requests = Vec::new();
        requests.extend(
            std::iter::repeat((Role::Mechanic, HireTrigger::StructureBuilt))
                .take(signals.new_structures),
        );
        if signals.needs_security {
            requests.push((Role::Security, HireTrigger::Crime));
        }
        if signals.needs_handymen {
            requests.push((Role::Handyman, HireTrigger::Litter));
        }
        if signals.needs_entertainers {
            requests.push((Role::Entertainer, HireTrigger::Unhappiness));
        }

        requests
            .into_iter()
            .filter(|&(role, trigger)| self.submit(ctx, role, trigger, queue))
            .count()
    }

    /// Gate, cap and enqueue one hire
    pub fn submit(
        &mut self,
        ctx: &HireContext<'_>,
        role: Role,
        trigger: HireTrigger,
        queue: &mut EffectQueue,
    ) -> bool {
        if !ctx.can_mutate {
            return false;
        }

        let policy = ctx.config.role(role);
        if !policy.enabled {
            return false;
        }
        if trigger != HireTrigger::Manual && !(ctx.config.auto_hire && policy.auto_hire) {
            return false;
        }
        if self.effective_count(ctx.directory, role) >= policy.max as u64 {
            return false;
        }

        let costume = if role == Role::Entertainer {
            let seed = ctx.tick.wrapping_add(self.pending(role));
            ctx.rng.random_int(0, ENTERTAINER_COSTUMES - 1, seed) as u8
        } else {
            0
        };

        let action = GameAction::hire(role, costume, default_orders(role, &ctx.config.tasks));
        queue.enqueue(
            action,
            Completion::Hire {
                role,
                smart: trigger.is_smart(),
            },
        );
        self.pending.add(role, 1);

        tracing::debug!(role = role.name(), ?trigger, tick = ctx.tick, "Hire requested");
        true
    }
}
