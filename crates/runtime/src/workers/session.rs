//! Session worker that owns the authoritative [`BattleState`] of one battle.
//!
//! Receives commands from [`crate::SessionHandle`], advances the battle through
//! [`BattleEngine`] on a fixed interval, and publishes every event to the
//! battle's [`EventBus`].

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use battle_core::{
    BattleEngine, BattleError, BattleEvent, BattleOutcome, BattleResult, BattleState, DeployError,
    Point, TroopId, TroopKind,
};

use crate::api::{Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{EventBus, EventEnvelope};
use crate::manager::SessionRegistry;
use crate::repository::{BattleRecord, ResultSink};
use crate::types::{AttackerId, BattleId, BattleSnapshot, VillageId, Viewer};

/// Commands that can be sent to a session worker
pub(crate) enum Command {
    /// Place a troop; applied before the next tick.
    Deploy {
        kind: TroopKind,
        position: Point,
        reply: oneshot::Sender<Result<TroopId>>,
    },
    Join {
        viewer: Viewer,
        reply: oneshot::Sender<Result<()>>,
    },
    Leave {
        viewer: Viewer,
        reply: oneshot::Sender<Result<()>>,
    },
    Surrender {
        reply: oneshot::Sender<Result<BattleResult>>,
    },
    /// Query the current battle state (read-only).
    Snapshot { reply: oneshot::Sender<BattleSnapshot> },
    /// End the battle as abandoned; sent by the manager on shutdown.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Everything a session needs besides its state and channels.
pub(crate) struct SessionContext {
    pub battle_id: BattleId,
    pub village_id: VillageId,
    pub attacker: AttackerId,
    pub config: RuntimeConfig,
    pub sink: Arc<dyn ResultSink>,
    pub sessions: SessionRegistry,
}

/// Background task driving one battle from creation to its result.
pub(crate) struct SessionWorker {
    context: SessionContext,
    state: BattleState,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    sequence: u64,
    started: Instant,
    attacker_connected: bool,
    /// Set while the attacker is away; cleared by a rejoin or a deployment.
    attacker_left_at: Option<Instant>,
    spectators: BTreeSet<u64>,
}

impl SessionWorker {
    pub fn new(
        context: SessionContext,
        state: BattleState,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            context,
            state,
            command_rx,
            event_bus,
            sequence: 0,
            started: Instant::now(),
            attacker_connected: true,
            attacker_left_at: None,
            spectators: BTreeSet::new(),
        }
    }

    /// Main worker loop.
    ///
    /// Commands queued since the previous tick are applied first, then the
    /// battle advances one step. Returns once the battle has ended and its
    /// result is recorded.
    pub async fn run(mut self) {
        info!(
            target: "runtime::session",
            battle = %self.context.battle_id,
            village = %self.context.village_id,
            attacker = %self.context.attacker,
            buildings = self.state.buildings.len(),
            "session started"
        );

        let mut ticker = time::interval(self.context.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.state.is_ended() {
            ticker.tick().await;
            self.drain_commands();
            if self.state.is_ended() {
                break;
            }
            self.step();
        }

        self.finalize().await;
    }

    /// The registry holds a handle until `finalize`, so the channel never reports
    /// a disconnect while the loop runs.
    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Deploy {
                kind,
                position,
                reply,
            } => {
                let result = self.deploy(kind, position);
                if reply.send(result).is_err() {
                    debug!("Deploy reply channel closed (caller dropped)");
                }
            }
            Command::Join { viewer, reply } => {
                let result = self.join(viewer);
                if reply.send(result).is_err() {
                    debug!("Join reply channel closed (caller dropped)");
                }
            }
            Command::Leave { viewer, reply } => {
                let result = self.leave(viewer);
                if reply.send(result).is_err() {
                    debug!("Leave reply channel closed (caller dropped)");
                }
            }
            Command::Surrender { reply } => {
                let result = self.surrender();
                if reply.send(result).is_err() {
                    debug!("Surrender reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown { reply } => {
                info!(
                    target: "runtime::session",
                    battle = %self.context.battle_id,
                    "shutdown requested"
                );
                self.end(BattleOutcome::Abandoned, None);
                let _ = reply.send(());
            }
        }
    }

    fn deploy(&mut self, kind: TroopKind, position: Point) -> Result<TroopId> {
        match BattleEngine::new(&mut self.state).deploy_troop(kind, position) {
            Ok(spawn) => {
                debug!(
                    target: "runtime::session",
                    battle = %self.context.battle_id,
                    troop = %spawn.troop_id,
                    %kind,
                    %position,
                    "troop deployed"
                );
                // A deployment proves the attacker is still driving the battle.
                self.attacker_connected = true;
                self.attacker_left_at = None;
                let troop_id = spawn.troop_id;
                self.publish(BattleEvent::TroopSpawn(spawn));
                Ok(troop_id)
            }
            Err(err) => {
                warn!(
                    target: "runtime::session",
                    battle = %self.context.battle_id,
                    code = err.error_code(),
                    %kind,
                    %position,
                    "deployment rejected: {err}"
                );
                Err(err.into())
            }
        }
    }

    fn join(&mut self, viewer: Viewer) -> Result<()> {
        if self.state.is_ended() {
            return Err(RuntimeError::SessionEnded(self.context.battle_id));
        }
        match viewer {
            Viewer::Attacker => {
                self.attacker_connected = true;
                self.attacker_left_at = None;
            }
            Viewer::Spectator(id) => {
                self.spectators.insert(id);
            }
        }
        debug!(target: "runtime::session", battle = %self.context.battle_id, %viewer, "viewer joined");
        Ok(())
    }

    fn leave(&mut self, viewer: Viewer) -> Result<()> {
        if self.state.is_ended() {
            return Err(RuntimeError::SessionEnded(self.context.battle_id));
        }
        match viewer {
            Viewer::Attacker => {
                self.attacker_connected = false;
                if self.attacker_left_at.is_none() {
                    self.attacker_left_at = Some(Instant::now());
                }
                info!(
                    target: "runtime::session",
                    battle = %self.context.battle_id,
                    grace_secs = self.context.config.disconnect_grace.as_secs(),
                    "attacker disconnected"
                );
            }
            Viewer::Spectator(id) => {
                self.spectators.remove(&id);
                debug!(target: "runtime::session", battle = %self.context.battle_id, %viewer, "viewer left");
            }
        }
        Ok(())
    }

    fn surrender(&mut self) -> Result<BattleResult> {
        if self.state.is_ended() {
            return Err(RuntimeError::SessionEnded(self.context.battle_id));
        }
        info!(target: "runtime::session", battle = %self.context.battle_id, "attacker surrendered");
        self.end(BattleOutcome::Surrendered, None);
        self.state
            .result
            .clone()
            .ok_or(RuntimeError::SessionEnded(self.context.battle_id))
    }

    fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            battle_id: self.context.battle_id,
            village_id: self.context.village_id,
            attacker: self.context.attacker,
            status: self.state.status,
            tick: self.state.tick,
            elapsed_ms: self.state.elapsed_ms,
            buildings: self.state.buildings.clone(),
            troops: self.state.troops.clone(),
            army: self.state.army.clone(),
            attacker_connected: self.attacker_connected,
            spectators: self.spectators.len(),
            result: self.state.result.clone(),
        }
    }

    /// One tick of the loop: session limits first, then the simulation.
    fn step(&mut self) {
        if self.started.elapsed() >= self.context.config.max_wall_clock {
            warn!(
                target: "runtime::session",
                battle = %self.context.battle_id,
                status = %self.state.status,
                "wall-clock limit reached"
            );
            self.end(BattleOutcome::TimeUp, None);
            return;
        }

        if let Some(left_at) = self.attacker_left_at
            && left_at.elapsed() >= self.context.config.disconnect_grace
        {
            info!(
                target: "runtime::session",
                battle = %self.context.battle_id,
                "attacker did not return within the grace period"
            );
            self.end(BattleOutcome::Abandoned, None);
            return;
        }

        match BattleEngine::new(&mut self.state).tick() {
            Ok(events) => {
                for event in events {
                    self.publish(event);
                }
            }
            Err(err) => {
                error!(
                    target: "runtime::session",
                    battle = %self.context.battle_id,
                    tick = self.state.tick,
                    code = err.error_code(),
                    "battle state corrupted: {err}"
                );
                self.end(BattleOutcome::Failed, Some(err.to_string()));
            }
        }
    }

    fn end(&mut self, outcome: BattleOutcome, error: Option<String>) {
        if let Some(event) = BattleEngine::new(&mut self.state).finish(outcome, error) {
            self.publish(event);
        }
    }

    fn publish(&mut self, event: BattleEvent) {
        let sequence = self.sequence;
        self.sequence += 1;
        trace!(
            target: "runtime::events",
            battle = %self.context.battle_id,
            sequence,
            event = event.name(),
            "publish"
        );
        self.event_bus.publish(EventEnvelope {
            battle_id: self.context.battle_id,
            sequence,
            timestamp_ms: self.state.elapsed_ms,
            event,
        });
    }

    /// Records the result, unregisters the session, and closes every stream.
    async fn finalize(mut self) {
        let battle_id = self.context.battle_id;

        if let Some(result) = self.state.result.clone() {
            info!(
                target: "runtime::session",
                battle = %battle_id,
                outcome = %result.outcome,
                stars = result.stars,
                destruction = result.destruction_percentage,
                loot_gold = result.loot_gold,
                loot_elixir = result.loot_elixir,
                duration_ms = result.duration_ms,
                "battle ended"
            );

            let record = BattleRecord {
                battle_id,
                village_id: self.context.village_id,
                attacker: self.context.attacker,
                result,
            };
            if let Err(err) = self.context.sink.record(&record).await {
                error!(target: "runtime::session", battle = %battle_id, "failed to record result: {err}");
            }
        }

        self.context.sessions.write().await.remove(&battle_id);
        self.event_bus.close();

        self.command_rx.close();
        while let Ok(command) = self.command_rx.try_recv() {
            self.reject(command);
        }
        debug!(target: "runtime::session", battle = %battle_id, "session worker stopped");
    }

    fn reject(&self, command: Command) {
        let battle_id = self.context.battle_id;
        match command {
            Command::Deploy { reply, .. } => {
                let _ = reply.send(Err(DeployError::BattleEnded.into()));
            }
            Command::Join { reply, .. } | Command::Leave { reply, .. } => {
                let _ = reply.send(Err(RuntimeError::SessionEnded(battle_id)));
            }
            Command::Surrender { reply } => {
                let _ = reply.send(Err(RuntimeError::SessionEnded(battle_id)));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }
}
