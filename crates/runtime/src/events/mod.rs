//! Per-battle event fan-out.
//!
//! Every session owns one [`EventBus`]. The session worker is the only
//! publisher; the attacker and spectators hold read-only [`Subscription`]s.
//! Closing the bus ends every subscription once buffered events are drained.

mod bus;
mod subscription;
mod types;

pub use bus::EventBus;
pub use subscription::Subscription;
pub use types::EventEnvelope;
