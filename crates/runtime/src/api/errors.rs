//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from session lookup, worker coordination, rule validation,
//! and repositories so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{BattleError, DeployError, ErrorSeverity, LayoutError};

pub use crate::repository::RepositoryError;
use crate::types::{BattleId, VillageId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle {0} not found")]
    SessionNotFound(BattleId),

    #[error("battle {0} has already ended")]
    SessionEnded(BattleId),

    #[error("village {0} not found")]
    VillageNotFound(VillageId),

    #[error("battle {battle} is against {expected}, not {provided}")]
    VillageMismatch {
        battle: BattleId,
        expected: VillageId,
        provided: VillageId,
    },

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// Rejections are caller mistakes; everything else is infrastructure.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Deploy(err) => err.severity(),
            Self::Layout(err) => err.severity(),
            Self::SessionNotFound(_)
            | Self::SessionEnded(_)
            | Self::VillageNotFound(_)
            | Self::VillageMismatch { .. } => ErrorSeverity::Validation,
            Self::CommandChannelClosed
            | Self::ReplyChannelClosed(_)
            | Self::WorkerJoin(_)
            | Self::Repository(_) => ErrorSeverity::Fatal,
        }
    }
}
