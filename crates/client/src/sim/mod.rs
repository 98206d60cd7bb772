//! Built-in simulated world backend.

mod gateway;

pub use gateway::SimulatedGateway;
