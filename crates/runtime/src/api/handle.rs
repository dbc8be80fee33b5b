//! Cloneable façade for issuing commands to one battle session.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for
//! deploying troops, joining the event feed, or querying the battle.
use tokio::sync::{mpsc, oneshot};

use battle_core::{BattleResult, Point, TroopId, TroopKind};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, Subscription};
use crate::types::{AttackerId, BattleId, BattleSnapshot, VillageId, Viewer};
use crate::workers::Command;

/// Client-facing handle to a running battle
#[derive(Clone, Debug)]
pub struct SessionHandle {
    battle_id: BattleId,
    village_id: VillageId,
    attacker: AttackerId,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(
        battle_id: BattleId,
        village_id: VillageId,
        attacker: AttackerId,
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            battle_id,
            village_id,
            attacker,
            command_tx,
            event_bus,
        }
    }

    pub fn battle_id(&self) -> BattleId {
        self.battle_id
    }

    pub fn village_id(&self) -> VillageId {
        self.village_id
    }

    pub fn attacker(&self) -> AttackerId {
        self.attacker
    }

    /// Deploy one troop; acknowledged at the start of the next tick.
    pub async fn deploy_troop(&self, kind: TroopKind, position: Point) -> Result<TroopId> {
        self.request(|reply| Command::Deploy {
            kind,
            position,
            reply,
        })
        .await?
    }

    /// Open an event feed for `viewer`.
    ///
    /// The feed is subscribed before the session acknowledges the join, so no
    /// event published after this call returns can be missed.
    pub async fn join(&self, viewer: Viewer) -> Result<Subscription> {
        let subscription = self
            .event_bus
            .subscribe(viewer)
            .ok_or(RuntimeError::SessionEnded(self.battle_id))?;
        self.request(|reply| Command::Join { viewer, reply })
            .await??;
        Ok(subscription)
    }

    /// Tell the session `viewer` is gone. An attacker leaving starts the
    /// abandonment grace period.
    pub async fn leave(&self, viewer: Viewer) -> Result<()> {
        self.request(|reply| Command::Leave { viewer, reply })
            .await?
    }

    /// End the battle now and return its result.
    pub async fn surrender(&self) -> Result<BattleResult> {
        self.request(|reply| Command::Surrender { reply }).await?
    }

    /// Query the current battle state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Ask the worker to end the battle as abandoned and stop.
    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    pub fn is_ended(&self) -> bool {
        self.event_bus.is_closed()
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
