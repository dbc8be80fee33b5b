//! Session registry and battle lifecycle entry points.
//!
//! [`SessionManager`] resolves villages, spawns one [`SessionWorker`] per
//! battle, and routes client calls to the matching [`SessionHandle`]. Sessions
//! unregister themselves when their battle ends.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use battle_core::{Army, BattleResult, BattleState, Point, TroopId, TroopKind};

use crate::api::{Result, RuntimeError, SessionHandle};
use crate::config::RuntimeConfig;
use crate::events::{EventBus, Subscription};
use crate::oracle::VillageOracle;
use crate::repository::ResultSink;
use crate::types::{AttackerId, BattleId, BattleSnapshot, VillageId, Viewer};
use crate::workers::{SessionContext, SessionWorker};

/// Live sessions keyed by battle id.
pub(crate) type SessionRegistry = Arc<RwLock<HashMap<BattleId, SessionHandle>>>;

/// Owns every running battle of this process.
pub struct SessionManager {
    config: RuntimeConfig,
    villages: Arc<dyn VillageOracle>,
    sink: Arc<dyn ResultSink>,
    sessions: SessionRegistry,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl SessionManager {
    pub fn new(
        config: RuntimeConfig,
        villages: Arc<dyn VillageOracle>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            config,
            villages,
            sink,
            sessions: SessionRegistry::default(),
            workers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Starts a battle of `attacker` against a snapshot of `village_id`.
    ///
    /// The battle waits in the preparing phase until the first deployment.
    pub async fn create_battle(
        &self,
        attacker: AttackerId,
        village_id: VillageId,
        army: Army,
    ) -> Result<SessionHandle> {
        let layout = self
            .villages
            .village(village_id)
            .ok_or(RuntimeError::VillageNotFound(village_id))?;
        let state = BattleState::new(layout.to_buildings(), army, self.config.battle.clone())?;

        let battle_id = BattleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let event_bus = EventBus::new(battle_id, self.config.event_buffer_size);
        let handle = SessionHandle::new(battle_id, village_id, attacker, command_tx, event_bus.clone());

        // Registered before the worker starts so a battle that ends at once
        // still unregisters cleanly.
        self.sessions.write().await.insert(battle_id, handle.clone());

        let context = SessionContext {
            battle_id,
            village_id,
            attacker,
            config: self.config.clone(),
            sink: Arc::clone(&self.sink),
            sessions: Arc::clone(&self.sessions),
        };
        let worker = SessionWorker::new(context, state, command_rx, event_bus);
        let join = tokio::spawn(worker.run());

        let mut workers = self.workers.lock().await;
        workers.retain(|worker| !worker.is_finished());
        workers.push(join);

        info!(
            target: "runtime::manager",
            battle = %battle_id,
            village = %village_id,
            %attacker,
            "battle created"
        );
        Ok(handle)
    }

    /// Handle of a live battle.
    pub async fn session(&self, battle_id: BattleId) -> Result<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&battle_id)
            .cloned()
            .ok_or(RuntimeError::SessionNotFound(battle_id))
    }

    /// Subscribes `viewer` to a battle's events.
    ///
    /// `village_id` must name the village under attack.
    pub async fn join_battle(
        &self,
        battle_id: BattleId,
        village_id: VillageId,
        viewer: Viewer,
    ) -> Result<Subscription> {
        let handle = self.session(battle_id).await?;
        if handle.village_id() != village_id {
            return Err(RuntimeError::VillageMismatch {
                battle: battle_id,
                expected: handle.village_id(),
                provided: village_id,
            });
        }
        let subscription = handle.join(viewer).await?;
        debug!(target: "runtime::manager", battle = %battle_id, %viewer, "viewer joined");
        Ok(subscription)
    }

    pub async fn leave_battle(&self, battle_id: BattleId, viewer: Viewer) -> Result<()> {
        self.session(battle_id).await?.leave(viewer).await
    }

    pub async fn deploy_troop(
        &self,
        battle_id: BattleId,
        kind: TroopKind,
        position: Point,
    ) -> Result<TroopId> {
        self.session(battle_id).await?.deploy_troop(kind, position).await
    }

    pub async fn surrender(&self, battle_id: BattleId) -> Result<BattleResult> {
        self.session(battle_id).await?.surrender().await
    }

    pub async fn snapshot(&self, battle_id: BattleId) -> Result<BattleSnapshot> {
        self.session(battle_id).await?.snapshot().await
    }

    /// Ids of battles still running, ascending.
    pub async fn active_battles(&self) -> Vec<BattleId> {
        let mut ids: Vec<BattleId> = self.sessions.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Ends every running battle as abandoned and waits for the workers.
    pub async fn shutdown(&self) -> Result<()> {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();
        info!(target: "runtime::manager", sessions = handles.len(), "shutting down");

        for handle in handles {
            // A session that ended meanwhile has already dropped its receiver.
            if let Err(err) = handle.shutdown().await {
                debug!(target: "runtime::manager", battle = %handle.battle_id(), "shutdown skipped: {err}");
            }
        }

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }
        Ok(())
    }
}
