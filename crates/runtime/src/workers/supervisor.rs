//! Supervisor worker that owns the registry of live event instances.
//!
//! Receives commands from [`crate::SupervisorHandle`] and from the timer
//! tasks it spawns, drives instance transitions, and publishes events to
//! the bus. All instance mutation happens on this single task, so phase
//! transitions for one event never interleave.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use event_core::{
    EventConfig, EventId, GuardHandle, KillerIdentity, Position, ProfileSet, VehicleHandle,
};

use crate::api::{EventStatus, Result};
use crate::events::EventBus;
use crate::gateway::WorldGateway;
use crate::instance::EventInstance;
use crate::timer::TaskHandle;

/// Commands that can be sent to the supervisor worker.
pub(crate) enum Command {
    /// Start a new event with a randomly selected profile.
    Start {
        reply: oneshot::Sender<Result<EventId>>,
    },
    /// Cancel every registered event, staggered. Replies with the snapshot
    /// count immediately.
    StopAll { reply: oneshot::Sender<usize> },
    /// Host callback: payload released at a position.
    DeliveryReleased {
        vehicle: VehicleHandle,
        position: Position,
    },
    /// Host callback: a guard died or was removed.
    GuardDeath {
        guard: GuardHandle,
        killer: Option<KillerIdentity>,
    },
    /// One step of an event's staggered guard spawn sequence.
    SpawnGuardStep { event: EventId, index: u32 },
    /// An event's spawn sequence issued its full roster.
    GuardSpawnComplete { event: EventId },
    /// An event's despawn timer fired.
    DespawnElapsed { event: EventId, generation: u64 },
    /// Cancel one event (bulk-stop step).
    Cancel { event: EventId },
    /// Periodic visual refresh pass.
    Refresh,
    /// Proximity veto query for external permission hooks.
    VetoBuildAt {
        position: Position,
        reply: oneshot::Sender<bool>,
    },
    /// Snapshot of all registered events.
    ActiveEvents {
        reply: oneshot::Sender<Vec<EventStatus>>,
    },
    /// Cancel everything and stop the worker.
    Shutdown { reply: oneshot::Sender<()> },
}

/// State shared between the worker and the instance transition methods:
/// the gateway, the bus, tuning constants, and a weak route back into the
/// command channel for timer tasks.
///
/// The sender is weak so the worker does not keep its own channel alive;
/// when every handle is dropped the loop ends and cleanup runs.
pub(crate) struct Shared {
    pub(crate) gateway: Arc<dyn WorldGateway>,
    pub(crate) bus: EventBus,
    pub(crate) config: EventConfig,
    pub(crate) command_tx: mpsc::WeakSender<Command>,
}

impl Shared {
    /// One-shot despawn timer: fires `DespawnElapsed` after `duration`.
    pub(crate) fn despawn_timer(
        &self,
        event: EventId,
        generation: u64,
        duration: Duration,
    ) -> TaskHandle {
        let tx = self.command_tx.clone();
        TaskHandle::spawn(async move {
            sleep(duration).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Command::DespawnElapsed { event, generation }).await;
            }
        })
    }

    /// Staggered guard spawn sequence: one `SpawnGuardStep` per guard,
    /// separated by the configured stagger, then `GuardSpawnComplete`.
    /// Cancelling the task mid-sleep stops issuing guards.
    pub(crate) fn guard_spawn_sequence(&self, event: EventId, count: u32) -> TaskHandle {
        let tx = self.command_tx.clone();
        let stagger = self.config.spawn_stagger;
        TaskHandle::spawn(async move {
            for index in 0..count {
                if index > 0 {
                    sleep(stagger).await;
                }
                let Some(tx) = tx.upgrade() else { return };
                if tx.send(Command::SpawnGuardStep { event, index }).await.is_err() {
                    return;
                }
            }
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Command::GuardSpawnComplete { event }).await;
            }
        })
    }

    /// Staggered bulk-stop sequence over a membership snapshot.
    pub(crate) fn stop_sequence(&self, events: Vec<EventId>) -> TaskHandle {
        let tx = self.command_tx.clone();
        let stagger = self.config.stop_stagger;
        TaskHandle::spawn(async move {
            for (i, event) in events.into_iter().enumerate() {
                if i > 0 {
                    sleep(stagger).await;
                }
                let Some(tx) = tx.upgrade() else { return };
                if tx.send(Command::Cancel { event }).await.is_err() {
                    return;
                }
            }
        })
    }
}

/// Background task that processes supervisor commands.
pub(crate) struct SupervisorWorker {
    shared: Shared,
    profiles: ProfileSet,
    rng: StdRng,
    /// Registry of live instances. Instances appear here from the moment
    /// their delivery is requested until their terminal phase completes.
    instances: Vec<EventInstance>,
    next_event_id: u64,
    stop_task: Option<TaskHandle>,
    command_rx: mpsc::Receiver<Command>,
}

impl SupervisorWorker {
    pub(crate) fn new(
        shared: Shared,
        profiles: ProfileSet,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        info!(profiles = profiles.len(), "supervisor worker initialized");
        Self {
            shared,
            profiles,
            rng: StdRng::from_entropy(),
            instances: Vec::new(),
            next_event_id: 1,
            stop_task: None,
            command_rx,
        }
    }

    /// Main worker loop. Ends on explicit shutdown or when every command
    /// sender is gone; either way all remaining instances are cancelled.
    pub(crate) async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            if let Command::Shutdown { reply } = cmd {
                self.teardown().await;
                let _ = reply.send(());
                return;
            }
            self.handle_command(cmd).await;
        }
        self.teardown().await;
    }

    async fn handle_command(&mut self, cmd: Command) {
        eprintln!("DBG handle_command: {}", match &cmd {
            Command::Start { .. } => "Start",
            Command::StopAll { .. } => "StopAll",
            Command::DeliveryReleased { .. } => "DeliveryReleased",
            Command::GuardDeath { .. } => "GuardDeath",
            Command::SpawnGuardStep { .. } => "SpawnGuardStep",
            Command::GuardSpawnComplete { .. } => "GuardSpawnComplete",
            Command::DespawnElapsed { .. } => "DespawnElapsed",
            Command::Cancel { .. } => "Cancel",
            Command::Refresh => "Refresh",
            Command::VetoBuildAt { .. } => "VetoBuildAt",
            Command::ActiveEvents { .. } => "ActiveEvents",
            Command::Shutdown { .. } => "Shutdown",
        });
        match cmd {
            Command::Start { reply } => self.handle_start(reply).await,
            Command::StopAll { reply } => self.handle_stop_all(reply),
            Command::DeliveryReleased { vehicle, position } => {
                self.handle_delivery_released(vehicle, position).await;
            }
            Command::GuardDeath { guard, killer } => {
                self.handle_guard_death(guard, killer).await;
            }
            Command::SpawnGuardStep { event, index } => {
                if let Some(instance) = self.instances.iter_mut().find(|i| i.id() == event) {
                    instance.spawn_guard_step(index, &self.shared).await;
                }
                self.reap();
            }
            Command::GuardSpawnComplete { event } => {
                if let Some(instance) = self.instances.iter_mut().find(|i| i.id() == event) {
                    instance.on_spawn_complete(&self.shared).await;
                }
                self.reap();
            }
            Command::DespawnElapsed { event, generation } => {
                if let Some(instance) = self.instances.iter_mut().find(|i| i.id() == event) {
                    instance.on_despawn_elapsed(generation, &self.shared).await;
                }
                self.reap();
            }
            Command::Cancel { event } => {
                if let Some(instance) = self.instances.iter_mut().find(|i| i.id() == event) {
                    instance.cancel(&self.shared).await;
                }
                self.reap();
            }
            Command::Refresh => self.handle_refresh().await,
            Command::VetoBuildAt { position, reply } => {
                let radius = self.shared.config.build_veto_radius;
                let veto = self.instances.iter().any(|i| i.covers(&position, radius));
                if reply.send(veto).is_err() {
                    debug!("VetoBuildAt reply channel closed (caller dropped)");
                }
            }
            Command::ActiveEvents { reply } => {
                let statuses = self.instances.iter().map(EventInstance::status).collect();
                if reply.send(statuses).is_err() {
                    debug!("ActiveEvents reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown { .. } => unreachable!("handled by the run loop"),
        }
    }

    async fn handle_start(&mut self, reply: oneshot::Sender<Result<EventId>>) {
        let profile = self.profiles.pick(&mut self.rng);
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;

        let mut instance = EventInstance::new(id, profile);
        match instance.begin_delivery(&self.shared).await {
            Ok(()) => {
                // Registered while still Delivering, before a drop location
                // exists, so a bulk stop can reach it.
                self.instances.push(instance);
                if reply.send(Ok(id)).is_err() {
                    debug!("Start reply channel closed (caller dropped)");
                }
            }
            Err(error) => {
                warn!(event = %id, %error, "delivery vehicle spawn failed, event aborted");
                let _ = reply.send(Err(error.into()));
            }
        }
    }

    fn handle_stop_all(&mut self, reply: oneshot::Sender<usize>) {
        let ids: Vec<EventId> = self.instances.iter().map(EventInstance::id).collect();

        // A newer bulk stop supersedes one still in flight.
        if let Some(task) = self.stop_task.take() {
            task.cancel();
        }
        if !ids.is_empty() {
            self.stop_task = Some(self.shared.stop_sequence(ids.clone()));
        }

        info!(count = ids.len(), "bulk stop scheduled");
        if reply.send(ids.len()).is_err() {
            debug!("StopAll reply channel closed (caller dropped)");
        }
    }

    async fn handle_delivery_released(&mut self, vehicle: VehicleHandle, position: Position) {
        let Some(instance) = self
            .instances
            .iter_mut()
            .find(|i| i.owns_vehicle(vehicle))
        else {
            trace!(?vehicle, "delivery release for an unknown vehicle dropped");
            return;
        };
        instance
            .on_delivery_released(position, &self.shared, &mut self.rng)
            .await;
        self.reap();
    }

    /// Routes a death to the unique instance owning the handle. At most one
    /// instance can own it by construction; a handle owned by none belongs
    /// to no active event (or its event already terminated) and is dropped.
    async fn handle_guard_death(&mut self, guard: GuardHandle, killer: Option<KillerIdentity>) {
        let Some(instance) = self.instances.iter_mut().find(|i| i.owns_guard(guard)) else {
            trace!(?guard, "death notification for an unowned guard dropped");
            return;
        };
        instance.on_guard_death(guard, killer, &self.shared).await;
        self.reap();
    }

    /// No-op-safe pass re-synchronizing purely-visual state. The gateway
    /// tolerates markers whose world object no longer exists.
    async fn handle_refresh(&self) {
        for instance in &self.instances {
            if let Some(marker) = instance.marker() {
                self.shared.gateway.refresh_marker(marker).await;
            }
        }
    }

    /// Drops instances that completed their terminal phase.
    fn reap(&mut self) {
        self.instances.retain(|i| !i.phase().is_terminal());
    }

    async fn teardown(&mut self) {
        if let Some(task) = self.stop_task.take() {
            task.cancel();
        }
        let mut instances = std::mem::take(&mut self.instances);
        for instance in &mut instances {
            instance.cancel(&self.shared).await;
        }
        info!("supervisor worker stopped");
    }
}
