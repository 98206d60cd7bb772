//! Unified error types surfaced by the runtime API.
//!
//! Failures inside a running event are contained and logged, never
//! propagated; these errors cover the explicit request/reply surface only.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::gateway::SpawnFailed;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("supervisor command channel closed")]
    CommandChannelClosed,

    #[error("supervisor reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("supervisor worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("supervisor requires a profile set before building")]
    MissingProfiles,

    #[error("supervisor requires a world gateway before building")]
    MissingGateway,

    #[error(transparent)]
    Spawn(#[from] SpawnFailed),
}
