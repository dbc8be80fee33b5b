//! Sink contract for finished battles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use battle_core::BattleResult;

use super::Result;
use crate::types::{AttackerId, BattleId, VillageId};

/// Everything persisted about a finished battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub battle_id: BattleId,
    pub village_id: VillageId,
    pub attacker: AttackerId,
    #[serde(flatten)]
    pub result: BattleResult,
}

/// Destination for battle results (database, ledger, file...).
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, record: &BattleRecord) -> Result<()>;
}
