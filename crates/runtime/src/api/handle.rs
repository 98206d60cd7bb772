//! Cloneable façade for issuing commands to the supervisor.
//!
//! [`SupervisorHandle`] hides channel plumbing and offers async helpers for
//! starting/stopping events, routing host callbacks, and subscribing to the
//! event bus.

use tokio::sync::{broadcast, mpsc, oneshot};

use event_core::{EventPhase, GuardHandle, KillerIdentity, Position, VehicleHandle};

use super::errors::{Result, RuntimeError};
use crate::events::{Announcement, EventBus, LifecycleEvent};
use crate::workers::Command;

/// Snapshot of one live event, returned by [`SupervisorHandle::active_events`].
#[derive(Clone, Debug)]
pub struct EventStatus {
    pub id: event_core::EventId,
    pub phase: EventPhase,
    pub profile: String,
    pub guards_alive: usize,
}

/// Client-facing handle to interact with the supervisor.
#[derive(Clone)]
pub struct SupervisorHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SupervisorHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Start a new event with a randomly selected difficulty profile.
    ///
    /// The only error surfaced here is a delivery-vehicle spawn failure;
    /// everything after the vehicle launches is driven by timers and host
    /// callbacks, whose failures are contained per instance.
    pub async fn start(&self) -> Result<event_core::EventId> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Start { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Cancel every running event, staggered by the configured stop delay.
    ///
    /// Returns the number of events scheduled for cancellation. Cancelled
    /// events emit no per-event announcement.
    pub async fn stop_all(&self) -> Result<usize> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::StopAll { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Host callback: the delivery vehicle released its payload at `position`.
    ///
    /// Routed to the owning instance by vehicle handle; unknown handles are
    /// dropped silently.
    pub async fn delivery_released(
        &self,
        vehicle: VehicleHandle,
        position: Position,
    ) -> Result<()> {
        self.command_tx
            .send(Command::DeliveryReleased { vehicle, position })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Host callback: a guard agent died or was removed from the world.
    ///
    /// Routed to the unique instance whose live-guard set contains the
    /// handle; a handle owned by no instance is dropped silently.
    pub async fn route_death(
        &self,
        guard: GuardHandle,
        killer: Option<KillerIdentity>,
    ) -> Result<()> {
        self.command_tx
            .send(Command::GuardDeath { guard, killer })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Returns true if `position` lies within the guarded radius of any
    /// live event. Used by external permission hooks to veto construction.
    pub async fn veto_build_at(&self, position: Position) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::VetoBuildAt {
                position,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Snapshot of all currently registered events.
    pub async fn active_events(&self) -> Result<Vec<EventStatus>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::ActiveEvents { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to granular lifecycle events (phase transitions, guard
    /// bookkeeping). Intended for observability and tests.
    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.event_bus.subscribe_lifecycle()
    }

    /// Subscribe to player-visible announcements. Each resolved event emits
    /// exactly one resolution announcement.
    pub fn subscribe_announcements(&self) -> broadcast::Receiver<Announcement> {
        self.event_bus.subscribe_announcements()
    }

    /// Get a reference to the event bus for advanced usage.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn send_shutdown(&self, reply: oneshot::Sender<()>) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown { reply })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
