//! Read-only data adapters consumed by the session manager.
//!
//! Defender layouts are immutable snapshots served by a [`VillageOracle`];
//! battle-time state lives in the session that owns it.
mod village;

pub use village::{StaticVillageOracle, VillageOracle};
