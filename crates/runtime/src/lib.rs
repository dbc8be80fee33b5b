//! Session runtime for live raid battles.
//!
//! This crate hosts many concurrent battles on top of `battle-core`. Each
//! battle runs in its own worker task with a fixed tick interval; clients talk
//! to it through [`SessionHandle`] and watch it through a [`Subscription`].
//!
//! Modules are organized by responsibility:
//! - [`manager`] creates battles and routes calls by battle id
//! - [`api`] exposes the handle and error types downstream clients interact with
//! - [`events`] provides the per-battle broadcast bus
//! - [`workers`] keeps the tick loop internal to the crate
//! - [`oracle`] and [`repository`] provide village input and result output
pub mod api;
pub mod config;
pub mod events;
pub mod manager;
pub mod oracle;
pub mod repository;
pub mod types;

mod workers;

pub use api::{Result, RuntimeError, SessionHandle};
pub use config::RuntimeConfig;
pub use events::{EventBus, EventEnvelope, Subscription};
pub use manager::SessionManager;
pub use oracle::{StaticVillageOracle, VillageOracle};
pub use repository::{
    BattleRecord, InMemoryResultSink, JsonLinesResultSink, RepositoryError, ResultSink,
};
pub use types::{AttackerId, BattleId, BattleSnapshot, VillageId, Viewer};
