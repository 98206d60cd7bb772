//! World capability contract consumed by the runtime.
//!
//! The gateway is the seam between the event core and the host game world:
//! spawning and destroying concrete world objects, arming the container
//! unlock, and refilling loot. The runtime never manipulates world entities
//! directly; it owns opaque handles and hands them back here. Inbound
//! notifications (payload release, guard deaths) enter through
//! [`crate::SupervisorHandle`], which the host wires to its own callbacks.

use async_trait::async_trait;
use thiserror::Error;

use event_core::{
    ContainerHandle, GuardHandle, LootItem, MarkerHandle, MarkerStyle, Position, VehicleHandle,
};

/// Kind of world object a gateway request referred to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    Vehicle,
    Container,
    Marker,
    Guard,
}

/// The gateway could not create a requested world object.
///
/// Recovery is local to the instance: guard failures are skipped, primary
/// object failures abort the instance. Never fatal to the supervisor.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("world gateway failed to spawn {kind}")]
pub struct SpawnFailed {
    pub kind: ObjectKind,
}

impl SpawnFailed {
    pub fn new(kind: ObjectKind) -> Self {
        Self { kind }
    }
}

/// Any handle the runtime can ask the gateway to destroy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldHandle {
    Vehicle(VehicleHandle),
    Container(ContainerHandle),
    Marker(MarkerHandle),
    Guard(GuardHandle),
}

impl From<VehicleHandle> for WorldHandle {
    fn from(handle: VehicleHandle) -> Self {
        WorldHandle::Vehicle(handle)
    }
}

impl From<ContainerHandle> for WorldHandle {
    fn from(handle: ContainerHandle) -> Self {
        WorldHandle::Container(handle)
    }
}

impl From<MarkerHandle> for WorldHandle {
    fn from(handle: MarkerHandle) -> Self {
        WorldHandle::Marker(handle)
    }
}

impl From<GuardHandle> for WorldHandle {
    fn from(handle: GuardHandle) -> Self {
        WorldHandle::Guard(handle)
    }
}

/// Spawn parameters for one guard agent.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardSpec {
    pub position: Position,
    /// Yaw in degrees, oriented toward the drop point.
    pub facing_deg: f32,
    pub health: f32,
    pub roam_radius: f32,
    pub aggro_radius: f32,
    pub display_name: String,
}

/// Capability interface for manifesting and destroying world objects.
///
/// Implementations are provided by the host (or simulated for local runs
/// and tests). All methods are invoked from the single supervisor worker
/// task, so implementations may assume ordered, non-overlapping calls per
/// supervisor.
#[async_trait]
pub trait WorldGateway: Send + Sync {
    /// Request a delivery vehicle at no fixed location. The host must later
    /// report payload release through
    /// [`crate::SupervisorHandle::delivery_released`] exactly once, or never
    /// if the vehicle is destroyed prematurely.
    async fn spawn_delivery_vehicle(&self) -> Result<VehicleHandle, SpawnFailed>;

    /// Place the reward container at the ground impact point.
    async fn spawn_container(&self, position: Position) -> Result<ContainerHandle, SpawnFailed>;

    /// Place the map marker advertising the container.
    async fn spawn_marker(
        &self,
        position: Position,
        style: &MarkerStyle,
    ) -> Result<MarkerHandle, SpawnFailed>;

    /// Create one hostile guard agent.
    async fn spawn_guard(&self, spec: GuardSpec) -> Result<GuardHandle, SpawnFailed>;

    /// Destroy a world object. Idempotent: destroying an already-destroyed
    /// or never-created handle is a no-op, never an error.
    async fn destroy(&self, handle: WorldHandle);

    /// Arm the container's own unlock countdown to `remaining_secs`.
    async fn arm_container_unlock(&self, container: ContainerHandle, remaining_secs: f32);

    /// Replace the container's contents with the selected items.
    async fn refill_loot(&self, container: ContainerHandle, items: Vec<LootItem>);

    /// Re-synchronize the marker's visual state. Must tolerate a marker
    /// whose world object no longer exists.
    async fn refresh_marker(&self, marker: MarkerHandle);
}
