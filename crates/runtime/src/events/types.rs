//! Wire format of published events.

use serde::{Deserialize, Serialize};

use battle_core::BattleEvent;

use crate::types::BattleId;

/// A simulation event stamped for delivery.
///
/// `sequence` starts at 0 and increases by one per published event of a
/// battle; `timestamp_ms` is the simulated battle clock at emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub battle_id: BattleId,
    pub sequence: u64,
    pub timestamp_ms: u64,
    #[serde(flatten)]
    pub event: BattleEvent,
}
