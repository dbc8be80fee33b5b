//! Tick pipeline and deployment entry point.
//!
//! [`BattleEngine`] is the only writer of [`BattleState`]. A tick resolves in
//! fixed phases so the event stream is reproducible from the same inputs:
//!
//! 1. target upkeep and movement (`TROOP_MOVE`)
//! 2. troop attacks (`BUILDING_ATTACK`), then defensive fire (`TROOP_ATTACK`)
//! 3. destruction and death bookkeeping (`BUILDING_DESTROYED`, `TROOP_DEATH`)
//! 4. invariant checks, then the end-condition check (`BATTLE_END`)
//!
//! Deployments are applied between ticks through [`BattleEngine::deploy_troop`].

mod invariants;

use crate::catalog::TroopKind;
use crate::combat;
use crate::config::BattleConfig;
use crate::error::{DeployError, EngineError};
use crate::events::{BattleEvent, BuildingDestroyed, TroopDeath, TroopMove, TroopSpawn};
use crate::scoring::{BattleOutcome, BattleResult};
use crate::state::{BattleState, BattleStatus, BuildingId, Point, Troop, TroopId};

/// Applies deployments and ticks to a borrowed [`BattleState`].
pub struct BattleEngine<'a> {
    state: &'a mut BattleState,
}

impl<'a> BattleEngine<'a> {
    pub fn new(state: &'a mut BattleState) -> Self {
        Self { state }
    }

    /// Places one troop of `kind` at `position`.
    ///
    /// Rejections leave the state untouched. The first successful deployment
    /// moves a preparing battle to active.
    pub fn deploy_troop(&mut self, kind: TroopKind, position: Point) -> Result<TroopSpawn, DeployError> {
        if self.state.is_ended() {
            return Err(DeployError::BattleEnded);
        }
        if !on_battlefield(position) {
            return Err(DeployError::OutOfBounds { position });
        }
        if let Some(wall) = self.state.wall_at(position.cell()) {
            return Err(DeployError::Blocked {
                position,
                wall: wall.id,
            });
        }
        if !self.state.army.take(kind) {
            return Err(DeployError::NoTroopsRemaining { kind });
        }

        let id = TroopId(self.state.next_troop_id);
        self.state.next_troop_id += 1;
        let troop = Troop::new(id, kind, position);
        let spawn = TroopSpawn {
            troop_id: id,
            troop_type: kind,
            position,
            health: troop.health,
        };
        self.state.troops.push(troop);

        if self.state.status == BattleStatus::Preparing {
            self.state.status = BattleStatus::Active;
        }
        Ok(spawn)
    }

    /// Advances the battle by one step and returns the events it produced.
    ///
    /// Preparing and ended battles do not advance. An `Err` means the state is
    /// inconsistent and the caller must end the battle as failed.
    pub fn tick(&mut self) -> Result<Vec<BattleEvent>, EngineError> {
        if self.state.status != BattleStatus::Active {
            return Ok(Vec::new());
        }

        let state = &mut *self.state;
        state.tick += 1;
        state.elapsed_ms += u64::from(state.config.step_ms);
        let step_ms = state.config.step_ms;
        let step_secs = state.config.step_secs();

        let mut events = Vec::new();

        for troop in state.troops.iter_mut() {
            if let Some(to) = combat::advance_troop(troop, &state.buildings, step_secs)? {
                events.push(BattleEvent::TroopMove(TroopMove {
                    troop_id: troop.id,
                    to,
                }));
            }
        }

        let mut destroyed: Vec<BuildingId> = Vec::new();
        for troop in state.troops.iter_mut() {
            if let Some(strike) = combat::troop_attack(troop, &mut state.buildings, step_ms) {
                if strike.destroyed {
                    destroyed.push(strike.attack.building_id);
                }
                events.push(BattleEvent::BuildingAttack(strike.attack));
            }
        }

        for building in state.buildings.iter_mut() {
            if let Some(shot) = combat::defense_fire(building, &mut state.troops, step_ms) {
                events.push(BattleEvent::TroopAttack(shot.attack));
            }
        }

        for id in destroyed {
            if let Some(building) = state.building(id) {
                events.push(BattleEvent::BuildingDestroyed(BuildingDestroyed {
                    building_id: id,
                    position: building.position,
                }));
            }
        }

        for troop in state.troops.iter().filter(|troop| !troop.is_alive()) {
            events.push(BattleEvent::TroopDeath(TroopDeath {
                troop_id: troop.id,
                position: troop.position,
            }));
        }
        state.troops.retain(Troop::is_alive);

        invariants::check(state)?;

        if let Some(outcome) = end_condition(state) {
            events.extend(self.finish(outcome, None));
        }
        Ok(events)
    }

    /// Ends the battle with `outcome` and returns its `BATTLE_END` event.
    ///
    /// Returns `None` if the battle had already ended, so at most one
    /// `BATTLE_END` is ever produced.
    pub fn finish(&mut self, outcome: BattleOutcome, error: Option<String>) -> Option<BattleEvent> {
        if self.state.is_ended() {
            return None;
        }
        let result = BattleResult::compute(
            &self.state.buildings,
            &self.state.config,
            self.state.elapsed_ms,
            outcome,
            error,
        );
        self.state.status = BattleStatus::Ended;
        self.state.result = Some(result.clone());
        Some(BattleEvent::BattleEnd(result))
    }
}

fn on_battlefield(position: Point) -> bool {
    let width = BattleConfig::GRID_WIDTH as f32;
    let height = BattleConfig::GRID_HEIGHT as f32;
    (0.0..width).contains(&position.x) && (0.0..height).contains(&position.y)
}

fn end_condition(state: &BattleState) -> Option<BattleOutcome> {
    if state.remaining_targets() == 0 {
        Some(BattleOutcome::AllDestroyed)
    } else if state.living_troops() == 0 && state.army.is_exhausted() {
        Some(BattleOutcome::OutOfTroops)
    } else if state.elapsed_ms >= state.config.max_duration_ms {
        Some(BattleOutcome::TimeUp)
    } else {
        None
    }
}
