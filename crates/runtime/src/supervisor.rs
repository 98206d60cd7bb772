//! High-level supervisor orchestrator.
//!
//! The supervisor owns the worker task and the periodic refresh task, wires
//! up the command channel and event bus, and exposes a builder-based API for
//! hosts to start events, route callbacks, and shut everything down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use event_core::{EventConfig, ProfileSet};

use crate::api::{Result, RuntimeError, SupervisorHandle};
use crate::events::{Announcement, EventBus};
use crate::gateway::WorldGateway;
use crate::timer::TaskHandle;
use crate::workers::{Command, Shared, SupervisorWorker};

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub event: EventConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event: EventConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Process-wide event supervisor.
///
/// Design: the supervisor owns background tasks and coordinates execution;
/// [`SupervisorHandle`] provides a cloneable façade for clients and host
/// callbacks.
pub struct Supervisor {
    handle: SupervisorHandle,
    worker_handle: JoinHandle<()>,
    refresh_task: TaskHandle,
}

impl Supervisor {
    /// Create a new supervisor builder.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Get a cloneable handle to this supervisor.
    ///
    /// The handle can be shared across clients and async tasks; host death
    /// and delivery callbacks should be wired through a clone of it.
    pub fn handle(&self) -> SupervisorHandle {
        self.handle.clone()
    }

    /// Subscribe to player-visible announcements.
    pub fn subscribe_announcements(&self) -> broadcast::Receiver<Announcement> {
        self.handle.subscribe_announcements()
    }

    /// Shut down gracefully: cancel every running event (completion = false,
    /// no per-event announcements), then stop the worker.
    pub async fn shutdown(self) -> Result<()> {
        self.refresh_task.cancel();

        let (reply_tx, reply_rx) = oneshot::channel();
        if self.handle.send_shutdown(reply_tx).await.is_ok() {
            let _ = reply_rx.await;
        }
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Supervisor`] with flexible configuration.
pub struct SupervisorBuilder {
    config: RuntimeConfig,
    profiles: Option<ProfileSet>,
    gateway: Option<Arc<dyn WorldGateway>>,
}

impl SupervisorBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            profiles: None,
            gateway: None,
        }
    }

    /// Override runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the validated difficulty profile set (required).
    pub fn profiles(mut self, profiles: ProfileSet) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Set the world gateway implementation (required).
    pub fn gateway(mut self, gateway: Arc<dyn WorldGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Build the supervisor and spawn its background tasks.
    pub async fn build(self) -> Result<Supervisor> {
        let profiles = self.profiles.ok_or(RuntimeError::MissingProfiles)?;
        let gateway = self.gateway.ok_or(RuntimeError::MissingGateway)?;

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let bus = EventBus::with_capacity(self.config.event_buffer_size);

        let shared = Shared {
            gateway,
            bus: bus.clone(),
            config: self.config.event.clone(),
            command_tx: command_tx.downgrade(),
        };

        let refresh_task = spawn_refresh(
            command_tx.downgrade(),
            self.config.event.refresh_interval,
        );

        let worker = SupervisorWorker::new(shared, profiles, command_rx);
        let worker_handle = tokio::spawn(worker.run());

        Ok(Supervisor {
            handle: SupervisorHandle::new(command_tx, bus),
            worker_handle,
            refresh_task,
        })
    }
}

/// Periodic refresh driver. Holds only a weak sender so it cannot keep the
/// supervisor alive on its own.
fn spawn_refresh(tx: mpsc::WeakSender<Command>, interval: Duration) -> TaskHandle {
    TaskHandle::spawn(async move {
        loop {
            sleep(interval).await;
            let Some(tx) = tx.upgrade() else { return };
            if tx.send(Command::Refresh).await.is_err() {
                return;
            }
        }
    })
}
