//! State machine for a single guarded-drop event.
//!
//! An instance is owned by the supervisor worker and only ever mutated from
//! its command loop, so transitions for one event are strictly ordered. The
//! phase sequence is Delivering → SpawningGuards → Active → Resolving →
//! Terminated, with external cancellation reachable from any live phase.
//!
//! The live-guard set is authoritative: the event resolves as completed
//! exactly when the set becomes empty after having been non-empty.

use std::sync::Arc;

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use event_core::{
    ContainerHandle, DifficultyProfile, EventId, EventPhase, GuardHandle, GuardSpawn,
    KillerIdentity, MarkerHandle, Outcome, Position, VehicleHandle, guard_ring, select_loot,
    within_guarded_radius,
};

use crate::api::EventStatus;
use crate::events::{Announcement, LifecycleEvent};
use crate::gateway::{GuardSpec, SpawnFailed};
use crate::timer::TaskHandle;
use crate::workers::Shared;

pub(crate) struct EventInstance {
    id: EventId,
    profile: Arc<DifficultyProfile>,
    phase: EventPhase,
    /// Fixed once the payload is released; never changes afterwards.
    drop_position: Option<Position>,

    vehicle: Option<VehicleHandle>,
    container: Option<ContainerHandle>,
    marker: Option<MarkerHandle>,
    /// Live guards, in spawn order. Guards are added the moment they are
    /// created, because death notifications can race spawn completion.
    guards: Vec<GuardHandle>,
    /// Precomputed ring placements, indexed by spawn step.
    pending_spawns: Vec<GuardSpawn>,

    despawn_timer: Option<TaskHandle>,
    /// Bumped on every timer start; a fire carrying a stale generation is
    /// ignored, closing the race between an in-flight fire and a reset.
    timer_generation: u64,
    spawn_task: Option<TaskHandle>,
}

impl EventInstance {
    pub(crate) fn new(id: EventId, profile: Arc<DifficultyProfile>) -> Self {
        Self {
            id,
            profile,
            phase: EventPhase::Delivering,
            drop_position: None,
            vehicle: None,
            container: None,
            marker: None,
            guards: Vec::new(),
            pending_spawns: Vec::new(),
            despawn_timer: None,
            timer_generation: 0,
            spawn_task: None,
        }
    }

    pub(crate) fn id(&self) -> EventId {
        self.id
    }

    pub(crate) fn phase(&self) -> EventPhase {
        self.phase
    }

    pub(crate) fn marker(&self) -> Option<MarkerHandle> {
        self.marker
    }

    pub(crate) fn owns_vehicle(&self, vehicle: VehicleHandle) -> bool {
        self.vehicle == Some(vehicle)
    }

    pub(crate) fn owns_guard(&self, guard: GuardHandle) -> bool {
        self.guards.contains(&guard)
    }

    /// Flat-plane membership test against the guarded radius. An instance
    /// without a drop position guards nothing yet.
    pub(crate) fn covers(&self, position: &Position, radius: f32) -> bool {
        self.drop_position
            .is_some_and(|center| within_guarded_radius(&center, position, radius))
    }

    pub(crate) fn status(&self) -> EventStatus {
        EventStatus {
            id: self.id,
            phase: self.phase,
            profile: self.profile.name.clone(),
            guards_alive: self.guards.len(),
        }
    }

    /// Entry transition: request the delivery vehicle.
    ///
    /// A vehicle spawn failure aborts the instance before it owns anything;
    /// the caller surfaces the error to the initiating operator.
    pub(crate) async fn begin_delivery(&mut self, shared: &Shared) -> Result<(), SpawnFailed> {
        let vehicle = shared.gateway.spawn_delivery_vehicle().await?;
        self.vehicle = Some(vehicle);

        info!(event = %self.id, profile = %self.profile.name, "delivery vehicle launched");
        shared.bus.publish(LifecycleEvent::DeliveryLaunched {
            event: self.id,
            profile: self.profile.name.clone(),
        });
        shared.bus.announce(Announcement::Inbound {
            event: self.id,
            profile: self.profile.name.clone(),
        });
        Ok(())
    }

    /// The payload hit the ground: fix the location, place the container and
    /// marker, roll loot, and start the staggered guard spawn sequence.
    pub(crate) async fn on_delivery_released(
        &mut self,
        position: Position,
        shared: &Shared,
        rng: &mut StdRng,
    ) {
        if self.phase != EventPhase::Delivering {
            debug!(event = %self.id, phase = %self.phase, "stale delivery release ignored");
            return;
        }

        self.drop_position = Some(position);
        shared.bus.publish(LifecycleEvent::DeliveryReleased {
            event: self.id,
            position,
        });
        self.set_phase(EventPhase::SpawningGuards, shared);

        let container = match shared.gateway.spawn_container(position).await {
            Ok(container) => container,
            Err(error) => {
                warn!(event = %self.id, %error, "container spawn failed, aborting event");
                self.resolve(Outcome::Cancelled, shared).await;
                return;
            }
        };
        self.container = Some(container);

        let loot = select_loot(&self.profile.loot, rng);
        if !loot.is_empty() {
            shared.gateway.refill_loot(container, loot).await;
        }

        match shared.gateway.spawn_marker(position, &self.profile.marker).await {
            Ok(marker) => self.marker = Some(marker),
            Err(error) => {
                warn!(event = %self.id, %error, "marker spawn failed, aborting event");
                self.resolve(Outcome::Cancelled, shared).await;
                return;
            }
        }

        self.pending_spawns = guard_ring(
            position,
            self.profile.guard_count,
            shared.config.guard_ring_radius,
        );
        self.spawn_task = Some(shared.guard_spawn_sequence(self.id, self.profile.guard_count));
    }

    /// One step of the staggered spawn sequence: issue guard `index`.
    ///
    /// A failed guard spawn is skipped, not retried; the roster may come up
    /// short of the configured count.
    pub(crate) async fn spawn_guard_step(&mut self, index: u32, shared: &Shared) {
        if self.phase != EventPhase::SpawningGuards {
            return;
        }
        let Some(spawn) = self.pending_spawns.get(index as usize).copied() else {
            return;
        };

        let spec = GuardSpec {
            position: spawn.position,
            facing_deg: spawn.facing_deg,
            health: self.profile.guard_health,
            roam_radius: self.profile.guard_roam_radius,
            aggro_radius: self.profile.guard_aggro_radius,
            display_name: self.profile.guard_name.clone(),
        };

        match shared.gateway.spawn_guard(spec).await {
            Ok(guard) => {
                self.guards.push(guard);
                shared.bus.publish(LifecycleEvent::GuardSpawned {
                    event: self.id,
                    guard,
                    alive: self.guards.len(),
                });
            }
            Err(error) => {
                warn!(event = %self.id, index, %error, "guard spawn failed, continuing with a short roster");
                shared
                    .bus
                    .publish(LifecycleEvent::GuardSpawnSkipped {
                        event: self.id,
                        index,
                    });
            }
        }
    }

    /// The spawn sequence issued its full roster: enter Active and arm the
    /// despawn timer.
    pub(crate) async fn on_spawn_complete(&mut self, shared: &Shared) {
        if self.phase != EventPhase::SpawningGuards {
            return;
        }
        self.spawn_task = None;
        self.set_phase(EventPhase::Active, shared);
        self.restart_despawn_timer(shared);
        info!(event = %self.id, guards = self.guards.len(), "event active");
    }

    /// A routed guard death. While guards remain, the despawn timer restarts
    /// at full duration; the death that empties the set wins the event.
    pub(crate) async fn on_guard_death(
        &mut self,
        guard: GuardHandle,
        killer: Option<KillerIdentity>,
        shared: &Shared,
    ) {
        let Some(index) = self.guards.iter().position(|g| *g == guard) else {
            return;
        };
        self.guards.remove(index);
        shared.bus.publish(LifecycleEvent::GuardKilled {
            event: self.id,
            guard,
            alive: self.guards.len(),
        });

        if !self.phase.is_live() {
            return;
        }

        if self.guards.is_empty() {
            self.resolve(Outcome::Eliminated { killer }, shared).await;
        } else if self.phase == EventPhase::Active {
            self.restart_despawn_timer(shared);
        }
    }

    /// The despawn timer fired. Stale generations are leftovers of a reset
    /// that lost the race to an in-flight fire.
    pub(crate) async fn on_despawn_elapsed(&mut self, generation: u64, shared: &Shared) {
        if self.phase != EventPhase::Active || generation != self.timer_generation {
            debug!(event = %self.id, generation, "stale despawn timer fire ignored");
            return;
        }
        self.resolve(Outcome::TimedOut, shared).await;
    }

    /// External cancellation: same cleanup as any resolution, container
    /// always destroyed, no per-event announcement.
    pub(crate) async fn cancel(&mut self, shared: &Shared) {
        self.resolve(Outcome::Cancelled, shared).await;
    }

    /// Cancel-and-restart the despawn timer at full duration. Never extends
    /// in place; the generation bump invalidates any in-flight fire.
    fn restart_despawn_timer(&mut self, shared: &Shared) {
        if let Some(timer) = self.despawn_timer.take() {
            timer.cancel();
        }
        self.timer_generation += 1;
        self.despawn_timer = Some(shared.despawn_timer(
            self.id,
            self.timer_generation,
            self.profile.duration(),
        ));
    }

    /// Terminal cleanup. Idempotent: a second resolution request on an
    /// instance already past Active is a no-op.
    async fn resolve(&mut self, outcome: Outcome, shared: &Shared) {
        if !self.phase.is_live() {
            return;
        }
        self.set_phase(EventPhase::Resolving, shared);

        if let Some(timer) = self.despawn_timer.take() {
            timer.cancel();
        }
        if let Some(task) = self.spawn_task.take() {
            task.cancel();
        }

        if let Some(vehicle) = self.vehicle.take() {
            shared.gateway.destroy(vehicle.into()).await;
        }
        for guard in self.guards.drain(..) {
            shared.gateway.destroy(guard.into()).await;
        }
        if let Some(marker) = self.marker.take() {
            shared.gateway.destroy(marker.into()).await;
        }

        let completed = outcome.completed();
        if let Some(container) = self.container.take() {
            if completed {
                let unlock = &self.profile.auto_unlock;
                if unlock.enabled {
                    let remaining = (shared.config.base_unlock_secs - unlock.seconds).max(0.0);
                    shared.gateway.arm_container_unlock(container, remaining).await;
                }
            } else {
                shared.gateway.destroy(container.into()).await;
            }
        }

        match (&outcome, self.drop_position) {
            (Outcome::Eliminated { killer: Some(killer) }, Some(location)) => {
                shared.bus.announce(Announcement::Eliminated {
                    event: self.id,
                    location,
                    killer: killer.name.clone(),
                });
            }
            (Outcome::Eliminated { killer: None }, Some(location)) => {
                shared.bus.announce(Announcement::Cleared {
                    event: self.id,
                    location,
                });
            }
            (Outcome::TimedOut, Some(location)) => {
                shared.bus.announce(Announcement::TimedOut {
                    event: self.id,
                    location,
                });
            }
            // Cancellations are announced in bulk by the caller, and an
            // instance that never fixed a location has nothing to announce.
            (Outcome::Cancelled, _) | (_, None) => {}
        }

        info!(event = %self.id, outcome = ?outcome, "event resolved");
        shared.bus.publish(LifecycleEvent::Resolved {
            event: self.id,
            outcome,
        });
        self.set_phase(EventPhase::Terminated, shared);
    }

    fn set_phase(&mut self, phase: EventPhase, shared: &Shared) {
        self.phase = phase;
        shared.bus.publish(LifecycleEvent::PhaseChanged {
            event: self.id,
            phase,
        });
    }
}
