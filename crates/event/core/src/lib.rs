//! Domain types and pure logic for guarded supply-drop events.
//!
//! This crate holds everything the orchestration runtime reasons about that
//! does not require I/O: identifier and handle newtypes, world positions,
//! difficulty profiles and their validation, guard ring placement math, loot
//! selection, and the event phase vocabulary. Dynamic state (live instances,
//! timers, world handles in flight) lives in the `runtime` crate.
//!
//! Modules are organized by responsibility:
//! - [`types`] defines identifiers, handles, and positions
//! - [`profile`] defines difficulty profiles and the validated profile set
//! - [`placement`] holds guard ring and proximity geometry
//! - [`loot`] implements the loot selection contract
//! - [`phase`] defines the event lifecycle vocabulary
//! - [`config`] holds cross-event tuning constants

pub mod config;
pub mod error;
pub mod loot;
pub mod phase;
pub mod placement;
pub mod profile;
pub mod types;

pub use config::EventConfig;
pub use error::ConfigurationError;
pub use loot::{LootItem, select_loot};
pub use phase::{EventPhase, Outcome};
pub use placement::{GuardSpawn, guard_ring, within_guarded_radius};
pub use profile::{AutoUnlock, DifficultyProfile, LootEntry, LootPolicy, MarkerStyle, ProfileSet};
pub use types::{
    ContainerHandle, EventId, GuardHandle, KillerIdentity, MarkerHandle, Position, VehicleHandle,
};
