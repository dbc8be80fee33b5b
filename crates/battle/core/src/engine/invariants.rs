use crate::config::BattleConfig;
use crate::error::EngineError;
use crate::state::BattleState;

/// Post-tick consistency checks over the troop list.
///
/// Runs after dead troops are removed. Every remaining troop must be inside the
/// battlefield, within its health cap and aimed at known buildings.
pub(super) fn check(state: &BattleState) -> Result<(), EngineError> {
    for troop in &state.troops {
        if troop.health > troop.max_health {
            return Err(EngineError::HealthOverflow {
                troop: troop.id,
                health: troop.health,
                max_health: troop.max_health,
            });
        }
        let cell = troop.position.cell();
        if !BattleConfig::in_bounds(cell.x, cell.y) {
            return Err(EngineError::TroopOutOfBounds {
                troop: troop.id,
                position: troop.position,
            });
        }
        if let Some(info) = troop.target {
            for id in [Some(info.target), info.wall_to_destroy].into_iter().flatten() {
                if state.building(id).is_none() {
                    return Err(EngineError::UnknownBuilding {
                        troop: troop.id,
                        building: id,
                    });
                }
            }
        }
    }
    Ok(())
}
