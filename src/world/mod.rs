//! Boundary with the host simulation
//!
//! The controller never owns the park. It reads through `ParkWorld`, asks
//! `Session` whether it may write, and writes only through `EffectGateway`.
//! Every world query returns a `QueryResult`; callers treat `Err` as
//! "no data" and carry on.

pub mod entities;
pub mod tile;

use thiserror::Error;

use crate::core::types::{Tick, TileCoord, WorldSize};
use crate::effects::action::{ActionOutcome, GameAction};
use crate::simulation::stats::StatsSnapshot;

pub use entities::{
    GuestInfo, LitterItem, StaffMember, StationInfo, StructureInfo, StructureKind,
    StructureStatus, ThoughtKind,
};
pub use tile::{EntranceKind, TileElement};

/// A world query that produced nothing usable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query unavailable: {0}")]
    Unavailable(String),

    #[error("tile ({x}, {y}) is outside the map")]
    OutOfBounds { x: i32, y: i32 },

    #[error("malformed data: {0}")]
    Malformed(String),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Read-only view of the park
pub trait ParkWorld {
    fn map_size(&self) -> QueryResult<WorldSize>;

    fn tile_elements(&self, coord: TileCoord) -> QueryResult<Vec<TileElement>>;

    fn litter(&self) -> QueryResult<Vec<LitterItem>>;

    fn guests(&self) -> QueryResult<Vec<GuestInfo>>;

    fn staff(&self) -> QueryResult<Vec<StaffMember>>;

    fn structures(&self) -> QueryResult<Vec<StructureInfo>>;

    fn current_tick(&self) -> Tick;
}

/// Role of this instance in a (possibly replicated) session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    SinglePlayer,
    Server,
    Client,
}

pub trait Session {
    fn network_mode(&self) -> NetworkMode;

    fn observer_count(&self) -> usize;

    /// Only single-player and the hosting server may mutate the world
    fn can_mutate(&self) -> bool {
        self.network_mode() != NetworkMode::Client
    }
}

/// Dispatch failed before the host produced a result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dispatch of {action} failed: {reason}")]
pub struct GatewayError {
    pub action: String,
    pub reason: String,
}

/// The single channel through which world mutations leave the controller
pub trait EffectGateway {
    fn execute(&mut self, action: &GameAction) -> Result<ActionOutcome, GatewayError>;
}

/// A single handle exposing every surface the controller consumes
pub trait ParkHost: ParkWorld + Session + EffectGateway {}

impl<T: ParkWorld + Session + EffectGateway> ParkHost for T {}

/// Receives periodic statistics pushes; never read back
pub trait DisplaySink {
    fn publish(&mut self, snapshot: &StatsSnapshot);
}
