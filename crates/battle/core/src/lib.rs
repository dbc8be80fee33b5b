//! Deterministic raid rules shared by the runtime and offline tools.
//!
//! `battle-core` defines the canonical combat model (grid, pathfinding,
//! targeting, combat, scoring) and exposes pure, synchronous APIs. All state
//! mutation flows through [`engine::BattleEngine`]; the crate performs no I/O
//! and never logs.
pub mod catalog;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod layout;
pub mod pathfinding;
pub mod scoring;
pub mod state;
pub mod targeting;

pub use catalog::{
    Archetype, BuildingCategory, BuildingKind, DefenseProfile, Loot, ProjectileKind, TroopKind,
    TroopStats,
};
pub use config::BattleConfig;
pub use engine::BattleEngine;
pub use error::{BattleError, DeployError, EngineError, ErrorSeverity, LayoutError};
pub use events::{
    BattleEvent, BuildingAttack, BuildingDestroyed, Projectile, TroopAttack, TroopDeath,
    TroopMove, TroopSpawn,
};
pub use grid::Grid;
pub use layout::{BuildingSpec, VillageLayout};
pub use pathfinding::{
    GridNode, PathResult, find_path, find_path_with_wall_info, find_walls_in_path,
    has_line_of_sight,
};
pub use scoring::{BattleOutcome, BattleResult};
pub use state::{
    Army, BattleState, BattleStatus, Building, BuildingId, Cell, Point, TargetInfo, Troop,
    TroopId,
};
pub use targeting::select_target;
