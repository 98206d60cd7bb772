//! Runtime orchestration for guarded supply-drop events.
//!
//! This crate wires the pure `event-core` domain into a running service: a
//! supervisor worker task owns every live event instance and processes
//! commands from a single channel, while cancellable timer tasks drive phase
//! transitions by sending commands back into that channel. Consumers embed
//! [`Supervisor`] to host events and interact with the world through
//! [`SupervisorHandle`].
//!
//! Modules are organized by responsibility:
//! - [`supervisor`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`gateway`] defines the world capability contract the host implements
//! - [`timer`] provides cancellable timer and stagger primitives
//! - `instance` and `workers` keep the per-event state machine and the
//!   supervisor task internal to the crate

pub mod api;
pub mod events;
pub mod gateway;
pub mod supervisor;
pub mod timer;

mod instance;
mod workers;

pub use api::{EventStatus, Result, RuntimeError, SupervisorHandle};
pub use events::{Announcement, EventBus, LifecycleEvent};
pub use gateway::{GuardSpec, ObjectKind, SpawnFailed, WorldGateway, WorldHandle};
pub use supervisor::{RuntimeConfig, Supervisor, SupervisorBuilder};
pub use timer::TaskHandle;
