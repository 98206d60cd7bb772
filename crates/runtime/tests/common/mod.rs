//! Shared test rig: a recording mock gateway and supervisor helpers.
//!
//! All timing-sensitive tests run under `#[tokio::test(start_paused = true)]`
//! so sleeps resolve deterministically: awaiting a bus event lets the mock
//! clock auto-advance to the next timer deadline, and `tokio::time::advance`
//! moves it explicitly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use event_core::{
    ContainerHandle, DifficultyProfile, EventId, GuardHandle, LootItem, LootPolicy, MarkerHandle,
    MarkerStyle, Position, ProfileSet, VehicleHandle,
};
use runtime::{
    Announcement, GuardSpec, LifecycleEvent, ObjectKind, SpawnFailed, Supervisor,
    SupervisorHandle, WorldGateway, WorldHandle,
};

/// Everything the mock world has been asked to do, in call order.
#[derive(Default)]
pub struct MockState {
    pub vehicles: Vec<VehicleHandle>,
    pub containers: Vec<ContainerHandle>,
    pub markers: Vec<MarkerHandle>,
    pub guards: Vec<GuardHandle>,
    pub guard_specs: Vec<GuardSpec>,
    pub destroys: Vec<WorldHandle>,
    pub unlocks: Vec<(ContainerHandle, f32)>,
    pub refills: Vec<(ContainerHandle, Vec<LootItem>)>,
    pub refreshes: Vec<MarkerHandle>,
}

impl MockState {
    pub fn destroy_count(&self, handle: WorldHandle) -> usize {
        self.destroys.iter().filter(|h| **h == handle).count()
    }
}

/// World gateway that records every call and can be told to fail spawns.
#[derive(Default)]
pub struct MockGateway {
    next_id: AtomicU64,
    pub state: Mutex<MockState>,
    pub fail_vehicle_spawns: AtomicBool,
    pub fail_container_spawns: AtomicBool,
    pub fail_marker_spawns: AtomicBool,
    pub fail_guard_spawns: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn alloc(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }
}

#[async_trait]
impl WorldGateway for MockGateway {
    async fn spawn_delivery_vehicle(&self) -> Result<VehicleHandle, SpawnFailed> {
        if self.fail_vehicle_spawns.load(Ordering::Relaxed) {
            return Err(SpawnFailed::new(ObjectKind::Vehicle));
        }
        let vehicle = VehicleHandle(self.alloc());
        self.state().vehicles.push(vehicle);
        Ok(vehicle)
    }

    async fn spawn_container(&self, _position: Position) -> Result<ContainerHandle, SpawnFailed> {
        if self.fail_container_spawns.load(Ordering::Relaxed) {
            return Err(SpawnFailed::new(ObjectKind::Container));
        }
        let container = ContainerHandle(self.alloc());
        self.state().containers.push(container);
        Ok(container)
    }

    async fn spawn_marker(
        &self,
        _position: Position,
        _style: &MarkerStyle,
    ) -> Result<MarkerHandle, SpawnFailed> {
        if self.fail_marker_spawns.load(Ordering::Relaxed) {
            return Err(SpawnFailed::new(ObjectKind::Marker));
        }
        let marker = MarkerHandle(self.alloc());
        self.state().markers.push(marker);
        Ok(marker)
    }

    async fn spawn_guard(&self, spec: GuardSpec) -> Result<GuardHandle, SpawnFailed> {
        if self.fail_guard_spawns.load(Ordering::Relaxed) {
            return Err(SpawnFailed::new(ObjectKind::Guard));
        }
        let guard = GuardHandle(self.alloc());
        let mut state = self.state();
        state.guards.push(guard);
        state.guard_specs.push(spec);
        Ok(guard)
    }

    async fn destroy(&self, handle: WorldHandle) {
        self.state().destroys.push(handle);
    }

    async fn arm_container_unlock(&self, container: ContainerHandle, remaining_secs: f32) {
        self.state().unlocks.push((container, remaining_secs));
    }

    async fn refill_loot(&self, container: ContainerHandle, items: Vec<LootItem>) {
        self.state().refills.push((container, items));
    }

    async fn refresh_marker(&self, marker: MarkerHandle) {
        self.state().refreshes.push(marker);
    }
}

/// A profile with the given roster size and duration and everything else
/// neutral. Loot and auto-unlock are off unless a test turns them on.
pub fn profile_with(guard_count: u32, duration_secs: f32) -> DifficultyProfile {
    DifficultyProfile {
        name: "test".into(),
        duration_secs,
        guard_count,
        guard_health: 100.0,
        guard_roam_radius: 25.0,
        guard_aggro_radius: 80.0,
        guard_name: "Test Guard".into(),
        marker: MarkerStyle::default(),
        auto_unlock: Default::default(),
        loot: LootPolicy::default(),
    }
}

pub struct TestRig {
    pub supervisor: Supervisor,
    pub handle: SupervisorHandle,
    pub gateway: Arc<MockGateway>,
    pub lifecycle: broadcast::Receiver<LifecycleEvent>,
    pub announcements: broadcast::Receiver<Announcement>,
}

/// Builds a supervisor over the mock gateway with a single-profile set.
pub async fn start_supervisor(profile: DifficultyProfile) -> TestRig {
    let gateway = MockGateway::new();
    let profiles = ProfileSet::new(vec![profile]).expect("test profile is valid");

    let supervisor = Supervisor::builder()
        .profiles(profiles)
        .gateway(gateway.clone())
        .build()
        .await
        .expect("supervisor builds");

    let handle = supervisor.handle();
    let lifecycle = handle.subscribe_lifecycle();
    let announcements = handle.subscribe_announcements();

    TestRig {
        supervisor,
        handle,
        gateway,
        lifecycle,
        announcements,
    }
}

/// Starts an event and reports the payload released at `position`.
/// Returns the event id and the vehicle that carried it.
pub async fn start_and_release(rig: &TestRig, position: Position) -> (EventId, VehicleHandle) {
    let id = rig.handle.start().await.expect("event starts");
    let vehicle = *rig.gateway.state().vehicles.last().expect("vehicle spawned");
    rig.handle
        .delivery_released(vehicle, position)
        .await
        .expect("release routed");
    (id, vehicle)
}

/// Receives lifecycle events until one matches the predicate.
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<LifecycleEvent>, mut pred: F) -> LifecycleEvent
where
    F: FnMut(&LifecycleEvent) -> bool,
{
    loop {
        let event = rx.recv().await.expect("lifecycle stream open");
        if pred(&event) {
            return event;
        }
    }
}

/// Lets every queued command drain through the worker: a few scheduler
/// yields, then a request/reply round-trip that is FIFO-ordered behind all
/// previously sent commands.
pub async fn settle(handle: &SupervisorHandle) {
    for _ in 0..3 {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let _ = handle.active_events().await.expect("supervisor alive");
    }
}

/// Asserts the destroy log holds no duplicate destroys for any handle.
pub fn assert_no_double_destroy(state: &MockState) {
    let mut seen: HashMap<WorldHandle, usize> = HashMap::new();
    for handle in &state.destroys {
        *seen.entry(*handle).or_default() += 1;
    }
    for (handle, count) in seen {
        assert_eq!(count, 1, "{handle:?} destroyed {count} times");
    }
}

/// Drains all pending announcements without waiting.
pub fn drain_announcements(rx: &mut broadcast::Receiver<Announcement>) -> Vec<Announcement> {
    let mut drained = Vec::new();
    while let Ok(announcement) = rx.try_recv() {
        drained.push(announcement);
    }
    drained
}
