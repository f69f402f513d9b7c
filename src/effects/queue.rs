//! Rate-limited FIFO of pending world mutations
//!
//! Every decision component enqueues here; nothing else talks to the
//! gateway. Draining is the single authority checkpoint: an instance
//! that may not mutate throws its queue away instead of dispatching.

use std::collections::VecDeque;

use crate::core::types::Role;
use crate::effects::action::{ActionOutcome, GameAction};
use crate::world::EffectGateway;

/// Error code recorded when the gateway failed before producing a result
pub const DISPATCH_ERROR: i32 = -1;

/// What to do with the gateway's result once an effect has been dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    None,
    Hire { role: Role, smart: bool },
    OrdersChanged,
    PatrolSet,
    PatrolCleared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingEffect {
    pub action: GameAction,
    pub on_complete: Completion,
}

/// An effect that reached the gateway, with the host's answer
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub on_complete: Completion,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    pub dispatched: usize,
    pub dispatch_failures: usize,
    /// Effects thrown away because this instance lacks authority
    pub discarded: usize,
}

#[derive(Debug, Clone)]
pub struct EffectQueue {
    pending: VecDeque<PendingEffect>,
    max_per_tick: usize,
}

impl EffectQueue {
    pub fn new(max_per_tick: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            max_per_tick: max_per_tick.max(1),
        }
    }

    pub fn max_per_tick(&self) -> usize {
        self.max_per_tick
    }

    pub fn enqueue(&mut self, action: GameAction, on_complete: Completion) {
        self.pending.push_back(PendingEffect {
            action,
            on_complete,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingEffect> {
        self.pending.iter()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Dispatch up to `max_per_tick` effects in FIFO order
    ///
    /// Every dispatched effect yields one entry in `results`. A gateway
    /// failure is counted and reported with `DISPATCH_ERROR`; it never stops
    /// the remaining dispatches.
    pub fn drain(
        &mut self,
        can_mutate: bool,
        gateway: &mut dyn EffectGateway,
        debug: bool,
        results: &mut Vec<Dispatched>,
    ) -> DrainReport {
        let mut report = DrainReport::default();

        if !can_mutate {
            report.discarded = self.pending.len();
            if report.discarded > 0 {
                tracing::debug!(
                    discarded = report.discarded,
                    "Not the authority; discarding pending effects"
                );
            }
            self.pending.clear();
            return report;
        }

        while report.dispatched < self.max_per_tick {
            let Some(effect) = self.pending.pop_front() else {
                break;
            };
            report.dispatched += 1;

            match gateway.execute(&effect.action) {
                Ok(outcome) => results.push(Dispatched {
                    on_complete: effect.on_complete,
                    outcome,
                }),
                Err(e) => {
                    report.dispatch_failures += 1;
                    if debug {
                        tracing::warn!("{}", e);
                    }
                    results.push(Dispatched {
                        on_complete: effect.on_complete,
                        outcome: ActionOutcome::failure(DISPATCH_ERROR, e.to_string()),
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;
    use crate::world::{GatewayError, NetworkMode, Session};

    struct FixedSession(NetworkMode);

    impl Session for FixedSession {
        fn network_mode(&self) -> NetworkMode {
            self.0
        }

        fn observer_count(&self) -> usize {
            0
        }
    }

    #[derive(Default)]
    struct RecordingGateway {
        seen: Vec<GameAction>,
        fail_orders: bool,
    }

    impl EffectGateway for RecordingGateway {
        fn execute(&mut self, action: &GameAction) -> Result<ActionOutcome, GatewayError> {
            self.seen.push(action.clone());
            if self.fail_orders && matches!(action, GameAction::StaffSetOrders { .. }) {
                return Err(GatewayError {
                    action: action.name().into(),
                    reason: "boom".into(),
                });
            }
            Ok(ActionOutcome::success())
        }
    }

    fn orders(id: u32) -> GameAction {
        GameAction::StaffSetOrders {
            id: AgentId(id),
            staff_orders: 1,
        }
    }

    #[test]
    fn test_drain_respects_per_tick_cap() {
        let mut queue = EffectQueue::new(3);
        for i in 0..7 {
            queue.enqueue(orders(i), Completion::OrdersChanged);
        }

        let session = FixedSession(NetworkMode::SinglePlayer);
        let mut gateway = RecordingGateway::default();
        let mut results = Vec::new();

        let report = queue.drain(session.can_mutate(), &mut gateway, false, &mut results);
        assert_eq!(report.dispatched, 3);
        assert_eq!(queue.len(), 4);
        assert_eq!(results.len(), 3);

        // FIFO order preserved
        assert_eq!(gateway.seen[0], orders(0));
        assert_eq!(gateway.seen[2], orders(2));
    }

    #[test]
    fn test_client_discards_queue() {
        let mut queue = EffectQueue::new(3);
        queue.enqueue(orders(1), Completion::None);
        queue.enqueue(orders(2), Completion::None);

        let session = FixedSession(NetworkMode::Client);
        let mut gateway = RecordingGateway::default();
        let mut results = Vec::new();

        let report = queue.drain(session.can_mutate(), &mut gateway, false, &mut results);
        assert_eq!(report.dispatched, 0);
        assert_eq!(report.discarded, 2);
        assert!(queue.is_empty());
        assert!(gateway.seen.is_empty());
    }

    #[test]
    fn test_dispatch_failure_does_not_abort_drain() {
        let mut queue = EffectQueue::new(5);
        queue.enqueue(orders(1), Completion::OrdersChanged);
        queue.enqueue(
            GameAction::hire(Role::Handyman, 0, 15),
            Completion::Hire {
                role: Role::Handyman,
                smart: false,
            },
        );

        let session = FixedSession(NetworkMode::Server);
        let mut gateway = RecordingGateway {
            fail_orders: true,
            ..Default::default()
        };
        let mut results = Vec::new();

        let report = queue.drain(session.can_mutate(), &mut gateway, true, &mut results);
        assert_eq!(report.dispatched, 2);
        assert_eq!(report.dispatch_failures, 1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].outcome.error, DISPATCH_ERROR);
        assert!(results[1].outcome.is_success());
        assert!(matches!(results[1].on_complete, Completion::Hire { .. }));
    }
}
