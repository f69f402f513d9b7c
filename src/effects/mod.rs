pub mod action;
pub mod queue;

pub use action::{ActionOutcome, FineRect, GameAction, PatrolMode};
pub use queue::{Completion, Dispatched, DrainReport, EffectQueue, PendingEffect, DISPATCH_ERROR};
