use std::time::Duration;

/// Cross-event tuning constants shared by every running instance.
///
/// Difficulty-dependent numbers live in [`crate::profile::DifficultyProfile`];
/// this struct carries the fixed pacing and geometry knobs of the event
/// system itself.
#[derive(Clone, Debug, PartialEq)]
pub struct EventConfig {
    /// Delay between consecutive guard spawns within one event.
    pub spawn_stagger: Duration,
    /// Delay between consecutive instance cancellations during a bulk stop.
    pub stop_stagger: Duration,
    /// Interval of the supervisor-wide visual refresh pass.
    pub refresh_interval: Duration,
    /// Radius of the guard ring around the drop point, in meters.
    pub guard_ring_radius: f32,
    /// Flat-plane radius around the drop point within which construction
    /// is vetoed, in meters.
    pub build_veto_radius: f32,
    /// The container's normal unlock countdown; auto-unlock arms the
    /// countdown to this minus the profile's configured discount.
    pub base_unlock_secs: f32,
}

impl EventConfig {
    pub const DEFAULT_SPAWN_STAGGER_MS: u64 = 750;
    pub const DEFAULT_STOP_STAGGER_MS: u64 = 750;
    pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
    pub const DEFAULT_GUARD_RING_RADIUS: f32 = 5.0;
    pub const DEFAULT_BUILD_VETO_RADIUS: f32 = 20.0;
    pub const DEFAULT_BASE_UNLOCK_SECS: f32 = 900.0;

    pub fn new() -> Self {
        Self {
            spawn_stagger: Duration::from_millis(Self::DEFAULT_SPAWN_STAGGER_MS),
            stop_stagger: Duration::from_millis(Self::DEFAULT_STOP_STAGGER_MS),
            refresh_interval: Duration::from_secs(Self::DEFAULT_REFRESH_INTERVAL_SECS),
            guard_ring_radius: Self::DEFAULT_GUARD_RING_RADIUS,
            build_veto_radius: Self::DEFAULT_BUILD_VETO_RADIUS,
            base_unlock_secs: Self::DEFAULT_BASE_UNLOCK_SECS,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::new()
    }
}
