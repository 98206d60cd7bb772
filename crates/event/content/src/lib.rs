//! Data-driven content loading for the event system.
//!
//! This crate converts human-editable TOML data files into validated
//! `event-core` values. Profiles are loaded once at startup; there is no
//! runtime schema migration. A file that fails validation fails the service
//! boot rather than silently yielding an empty or defaulted profile set.

pub mod loaders;

pub use loaders::{LoadResult, ProfileLoader};
