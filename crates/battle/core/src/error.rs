//! Error infrastructure for battle-core.
//!
//! Three families of failures exist:
//! - [`DeployError`]: a deployment command was rejected; nothing changed.
//! - [`LayoutError`]: a village snapshot cannot seed a battle.
//! - [`EngineError`]: an internal invariant broke mid-tick; fatal for that battle only.
//!
//! Unreachable targets are not errors. The pathfinder reports them through
//! empty paths and wall-blockage results which the selector consumes.

use crate::catalog::TroopKind;
use crate::state::{BuildingId, Point, TroopId};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, rejected without state mutation. Retry with different input.
    Validation,

    /// Unexpected state inconsistency inside one battle.
    ///
    /// The battle is ended with an error marker; other battles are unaffected.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, handy for metrics and logs.
    fn error_code(&self) -> &'static str;
}

/// Why a deployment was rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DeployError {
    #[error("battle has already ended")]
    BattleEnded,

    #[error("no {kind} left to deploy")]
    NoTroopsRemaining { kind: TroopKind },

    #[error("position {position} is outside the battlefield")]
    OutOfBounds { position: Point },

    #[error("position {position} is blocked by wall {wall}")]
    Blocked { position: Point, wall: BuildingId },
}

impl BattleError for DeployError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleEnded => "DEPLOY_BATTLE_ENDED",
            Self::NoTroopsRemaining { .. } => "DEPLOY_NO_TROOPS_REMAINING",
            Self::OutOfBounds { .. } => "DEPLOY_OUT_OF_BOUNDS",
            Self::Blocked { .. } => "DEPLOY_BLOCKED",
        }
    }
}

/// A village snapshot that cannot seed a battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("building {id} is placed outside the battlefield")]
    OutOfBounds { id: BuildingId },

    #[error("building {id} has an empty footprint")]
    EmptyFootprint { id: BuildingId },

    #[error("building {id} starts with zero health")]
    ZeroHealth { id: BuildingId },

    #[error("building id {id} is used more than once")]
    DuplicateId { id: BuildingId },

    #[error("malformed layout: {0}")]
    Malformed(String),
}

impl BattleError for LayoutError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "LAYOUT_OUT_OF_BOUNDS",
            Self::EmptyFootprint { .. } => "LAYOUT_EMPTY_FOOTPRINT",
            Self::ZeroHealth { .. } => "LAYOUT_ZERO_HEALTH",
            Self::DuplicateId { .. } => "LAYOUT_DUPLICATE_ID",
            Self::Malformed(_) => "LAYOUT_MALFORMED",
        }
    }
}

/// Internal invariant violation detected while ticking.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("troop {troop} targets unknown building {building}")]
    UnknownBuilding { troop: TroopId, building: BuildingId },

    #[error("troop {troop} left the battlefield at {position}")]
    TroopOutOfBounds { troop: TroopId, position: Point },

    #[error("troop {troop} has {health} health above its maximum {max_health}")]
    HealthOverflow {
        troop: TroopId,
        health: u32,
        max_health: u32,
    },
}

impl BattleError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownBuilding { .. } => "ENGINE_UNKNOWN_BUILDING",
            Self::TroopOutOfBounds { .. } => "ENGINE_TROOP_OUT_OF_BOUNDS",
            Self::HealthOverflow { .. } => "ENGINE_HEALTH_OVERFLOW",
        }
    }
}
