//! Simulated world gateway.
//!
//! Stands in for a game host: allocates handle ids, tracks which objects
//! exist, logs world effects through `tracing`, and simulates the delivery
//! flight by reporting a payload release at a random position after a
//! configurable delay. The console's `kill` command uses it to script guard
//! deaths, so the full event lifecycle is exercisable locally.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

use event_core::{
    ContainerHandle, GuardHandle, LootItem, MarkerHandle, MarkerStyle, Position, VehicleHandle,
};
use runtime::{GuardSpec, SpawnFailed, SupervisorHandle, WorldGateway, WorldHandle};

pub struct SimulatedGateway {
    next_id: AtomicU64,
    /// Ids of objects currently in the simulated world. Destroying an id
    /// that is not here is a no-op, matching the gateway contract.
    alive: Mutex<HashSet<u64>>,
    /// Live guards, available to the console's `kill` command.
    guards: Mutex<Vec<GuardHandle>>,
    /// Wired after the supervisor is built; carries release callbacks.
    handle: OnceLock<SupervisorHandle>,
    flight_time: Duration,
}

impl SimulatedGateway {
    pub fn new(flight_time: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            alive: Mutex::new(HashSet::new()),
            guards: Mutex::new(Vec::new()),
            handle: OnceLock::new(),
            flight_time,
        }
    }

    /// Wire the supervisor handle used for delivery-release callbacks.
    /// Must be called once, after the supervisor is built.
    pub fn attach(&self, handle: SupervisorHandle) {
        let _ = self.handle.set(handle);
    }

    /// Removes and returns one random live guard, as if it just died.
    pub fn take_random_guard(&self) -> Option<GuardHandle> {
        let mut guards = self.guards.lock().expect("guard list lock");
        if guards.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..guards.len());
        let guard = guards.swap_remove(index);
        self.alive.lock().expect("alive set lock").remove(&guard.0);
        Some(guard)
    }

    fn alloc(&self) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.alive.lock().expect("alive set lock").insert(id);
        id
    }
}

#[async_trait]
impl WorldGateway for SimulatedGateway {
    async fn spawn_delivery_vehicle(&self) -> Result<VehicleHandle, SpawnFailed> {
        let vehicle = VehicleHandle(self.alloc());
        info!(?vehicle, "simulated delivery vehicle takes off");

        let flight_time = self.flight_time;
        let handle = self.handle.get().cloned();
        tokio::spawn(async move {
            tokio::time::sleep(flight_time).await;
            let position = {
                let mut rng = rand::thread_rng();
                Position::new(rng.gen_range(-200.0..200.0), 0.0, rng.gen_range(-200.0..200.0))
            };
            if let Some(handle) = handle {
                let _ = handle.delivery_released(vehicle, position).await;
            }
        });

        Ok(vehicle)
    }

    async fn spawn_container(&self, position: Position) -> Result<ContainerHandle, SpawnFailed> {
        let container = ContainerHandle(self.alloc());
        info!(?container, %position, "simulated container placed");
        Ok(container)
    }

    async fn spawn_marker(
        &self,
        position: Position,
        style: &MarkerStyle,
    ) -> Result<MarkerHandle, SpawnFailed> {
        let marker = MarkerHandle(self.alloc());
        info!(?marker, %position, color = %style.color_primary, "simulated marker placed");
        Ok(marker)
    }

    async fn spawn_guard(&self, spec: GuardSpec) -> Result<GuardHandle, SpawnFailed> {
        let guard = GuardHandle(self.alloc());
        self.guards.lock().expect("guard list lock").push(guard);
        info!(
            ?guard,
            position = %spec.position,
            name = %spec.display_name,
            health = spec.health,
            "simulated guard spawned"
        );
        Ok(guard)
    }

    async fn destroy(&self, handle: WorldHandle) {
        let id = match handle {
            WorldHandle::Vehicle(h) => h.0,
            WorldHandle::Container(h) => h.0,
            WorldHandle::Marker(h) => h.0,
            WorldHandle::Guard(h) => h.0,
        };
        let existed = self.alive.lock().expect("alive set lock").remove(&id);
        if let WorldHandle::Guard(guard) = handle {
            self.guards.lock().expect("guard list lock").retain(|g| *g != guard);
        }
        if existed {
            debug!(?handle, "simulated object destroyed");
        } else {
            debug!(?handle, "destroy on a missing object ignored");
        }
    }

    async fn arm_container_unlock(&self, container: ContainerHandle, remaining_secs: f32) {
        info!(?container, remaining_secs, "simulated container unlock armed");
    }

    async fn refill_loot(&self, container: ContainerHandle, items: Vec<LootItem>) {
        info!(?container, count = items.len(), "simulated loot refilled");
        for item in &items {
            debug!(item = %item.item_id, quantity = item.quantity, "loot item");
        }
    }

    async fn refresh_marker(&self, marker: MarkerHandle) {
        let exists = self.alive.lock().expect("alive set lock").contains(&marker.0);
        debug!(?marker, exists, "simulated marker refreshed");
    }
}
