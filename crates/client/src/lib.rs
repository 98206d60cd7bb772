//! Operator console for the skydrop event service.
//!
//! # Architecture
//!
//! This crate is the composition root that assembles:
//! 1. Supervisor (event orchestration) via `runtime::Supervisor`
//! 2. A world gateway — here the built-in simulated gateway, so the full
//!    event lifecycle can be exercised without a game host
//! 3. The permission-gated operator command surface (start/stop)
//!
//! A real deployment replaces the simulated gateway with a host-backed
//! `WorldGateway` implementation and wires the host's death and payload
//! callbacks into `SupervisorHandle`; everything else stays as is.

pub mod commands;
pub mod config;
pub mod messages;
pub mod sim;

pub use commands::{EnvAllowList, OperatorCommand, PermissionGate};
pub use config::ClientConfig;
pub use messages::Messages;
pub use sim::SimulatedGateway;
