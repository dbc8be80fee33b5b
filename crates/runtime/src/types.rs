//! Identifiers and read models shared across the runtime API.
use std::fmt;

use serde::{Deserialize, Serialize};

use battle_core::{Army, BattleResult, BattleStatus, Building, Troop};

/// Runtime-assigned battle session identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(pub u64);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "battle-{}", self.0)
    }
}

/// Defender village identifier, resolved through a [`crate::VillageOracle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VillageId(pub u64);

impl fmt::Display for VillageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "village-{}", self.0)
    }
}

/// Already-authenticated attacker identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackerId(pub u64);

impl fmt::Display for AttackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attacker-{}", self.0)
    }
}

/// Who is watching a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewer {
    /// The controlling client. Its presence drives abandonment.
    Attacker,
    /// Read-only observer.
    Spectator(u64),
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Viewer::Attacker => write!(f, "attacker"),
            Viewer::Spectator(id) => write!(f, "spectator-{id}"),
        }
    }
}

/// Point-in-time copy of a session, served without pausing the tick loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSnapshot {
    pub battle_id: BattleId,
    pub village_id: VillageId,
    pub attacker: AttackerId,
    pub status: BattleStatus,
    pub tick: u64,
    pub elapsed_ms: u64,
    pub buildings: Vec<Building>,
    pub troops: Vec<Troop>,
    pub army: Army,
    pub attacker_connected: bool,
    pub spectators: usize,
    pub result: Option<BattleResult>,
}
