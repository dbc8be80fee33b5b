//! Worker tasks that back the runtime orchestration.
//!
//! Each battle runs in its own session worker, which owns the authoritative
//! [`battle_core::BattleState`] and is the only place ticks happen.

mod session;

pub(crate) use session::{Command, SessionContext, SessionWorker};
