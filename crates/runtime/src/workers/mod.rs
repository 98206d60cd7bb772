//! Background tasks internal to the crate.

mod supervisor;

pub(crate) use supervisor::{Command, Shared, SupervisorWorker};
