//! End-to-end lifecycle tests over a mock world gateway.
//!
//! All tests run with a paused clock; `tokio::time::advance` drives the
//! despawn timer and the spawn stagger deterministically.

mod common;

use std::time::Duration;

use tokio::time;

use event_core::{AutoUnlock, EventPhase, KillerIdentity, LootEntry, LootPolicy, Position};
use runtime::{Announcement, LifecycleEvent, WorldHandle};

use common::{
    drain_announcements, assert_no_double_destroy, profile_with, start_and_release,
    start_supervisor, settle, wait_for,
};

fn drop_point() -> Position {
    Position::new(100.0, 0.0, -50.0)
}

/// The reference scenario: two guards, 100 second duration, no auto-unlock.
/// Kills at t=10 and t=20 resolve the event as completed with exactly one
/// "eliminated" announcement and the container left in the world.
#[tokio::test(start_paused = true)]
async fn killing_all_guards_completes_the_event() {
    let mut rig = start_supervisor(profile_with(2, 100.0)).await;
    let (id, vehicle) = start_and_release(&rig, drop_point()).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;

    let (guard0, guard1, container) = {
        let state = rig.gateway.state();
        assert_eq!(state.guards.len(), 2);
        (state.guards[0], state.guards[1], state.containers[0])
    };

    time::advance(Duration::from_secs_f32(9.25)).await; // t = 10
    rig.handle
        .route_death(guard0, Some(KillerIdentity::new(11, "Shooter")))
        .await
        .unwrap();
    settle(&rig.handle).await;

    let status = rig.handle.active_events().await.unwrap();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].guards_alive, 1);

    time::advance(Duration::from_secs(10)).await; // t = 20
    rig.handle
        .route_death(guard1, Some(KillerIdentity::new(12, "Alice")))
        .await
        .unwrap();

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::Resolved { .. })
    })
    .await;
    settle(&rig.handle).await;

    // Exactly one resolution announcement, attributed to the final killer.
    let announcements = drain_announcements(&mut rig.announcements);
    let mut resolutions = announcements.iter().filter(|a| {
        !matches!(a, Announcement::Inbound { .. })
    });
    match resolutions.next() {
        Some(Announcement::Eliminated { event, killer, .. }) => {
            assert_eq!(*event, id);
            assert_eq!(killer, "Alice");
        }
        other => panic!("expected an eliminated announcement, got {other:?}"),
    }
    assert!(resolutions.next().is_none());

    let state = rig.gateway.state();
    // Completed: the container survives, and with auto-unlock disabled it
    // stays locked for manual unlocking.
    assert_eq!(state.destroy_count(WorldHandle::Container(container)), 0);
    assert!(state.unlocks.is_empty());
    // Both guards died before cleanup, so neither is destroyed by us.
    assert_eq!(state.destroy_count(WorldHandle::Guard(guard0)), 0);
    assert_eq!(state.destroy_count(WorldHandle::Guard(guard1)), 0);
    assert_eq!(state.destroy_count(WorldHandle::Vehicle(vehicle)), 1);
    assert_no_double_destroy(&state);
    drop(state);

    assert!(rig.handle.active_events().await.unwrap().is_empty());

    rig.supervisor.shutdown().await.unwrap();
}

/// Guards spawn one at a time, 0.75 seconds apart, and Active begins only
/// once the full roster has been issued.
#[tokio::test(start_paused = true)]
async fn guard_spawns_are_staggered() {
    let rig = start_supervisor(profile_with(3, 100.0)).await;
    start_and_release(&rig, drop_point()).await;

    settle(&rig.handle).await;
    assert_eq!(rig.gateway.state().guards.len(), 1);

    time::advance(Duration::from_millis(750)).await;
    settle(&rig.handle).await;
    assert_eq!(rig.gateway.state().guards.len(), 2);

    let status = rig.handle.active_events().await.unwrap();
    assert_eq!(status[0].phase, EventPhase::SpawningGuards);

    time::advance(Duration::from_millis(750)).await;
    settle(&rig.handle).await;
    assert_eq!(rig.gateway.state().guards.len(), 3);

    let status = rig.handle.active_events().await.unwrap();
    assert_eq!(status[0].phase, EventPhase::Active);

    rig.supervisor.shutdown().await.unwrap();
}

/// Guards are placed on the fixed ring around the drop point, facing it.
#[tokio::test(start_paused = true)]
async fn guards_are_placed_on_the_ring() {
    let mut rig = start_supervisor(profile_with(4, 100.0)).await;
    let center = drop_point();
    start_and_release(&rig, center).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;

    let state = rig.gateway.state();
    assert_eq!(state.guard_specs.len(), 4);
    for spec in &state.guard_specs {
        let distance = spec.position.flat_distance(&center);
        assert!((distance - 5.0).abs() < 1e-3, "guard not on the ring: {distance}");
        assert_eq!(spec.display_name, "Test Guard");
    }

    rig.supervisor.shutdown().await.unwrap();
}

/// When every guard spawn fails, the event enters Active with an empty
/// roster and can only resolve by timeout, never by elimination.
#[tokio::test(start_paused = true)]
async fn all_guard_spawns_failing_yields_an_empty_roster() {
    let mut rig = start_supervisor(profile_with(3, 50.0)).await;
    rig.gateway
        .fail_guard_spawns
        .store(true, std::sync::atomic::Ordering::Relaxed);

    start_and_release(&rig, drop_point()).await;

    let mut skipped = 0;
    wait_for(&mut rig.lifecycle, |e| {
        if matches!(e, LifecycleEvent::GuardSpawnSkipped { .. }) {
            skipped += 1;
        }
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;
    assert_eq!(skipped, 3);

    let status = rig.handle.active_events().await.unwrap();
    assert_eq!(status[0].guards_alive, 0);

    // The only exit is the despawn timer; auto-advance fires it.
    let resolved = wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::Resolved { .. })
    })
    .await;
    match resolved {
        LifecycleEvent::Resolved { outcome, .. } => {
            assert_eq!(outcome, event_core::Outcome::TimedOut);
        }
        _ => unreachable!(),
    }
    settle(&rig.handle).await;

    let announcements = drain_announcements(&mut rig.announcements);
    assert!(announcements.iter().any(|a| matches!(a, Announcement::TimedOut { .. })));
    assert!(!announcements.iter().any(|a| {
        matches!(a, Announcement::Eliminated { .. } | Announcement::Cleared { .. })
    }));

    let state = rig.gateway.state();
    assert_eq!(state.destroys.iter().filter(|h| matches!(h, WorldHandle::Container(_))).count(), 1);

    rig.supervisor.shutdown().await.unwrap();
}

/// A partial roster: one failed spawn is skipped and the event continues
/// with fewer guards than configured.
#[tokio::test(start_paused = true)]
async fn failed_guard_spawn_is_skipped() {
    let mut rig = start_supervisor(profile_with(3, 100.0)).await;
    start_and_release(&rig, drop_point()).await;

    // First guard spawns, then the gateway starts failing.
    settle(&rig.handle).await;
    assert_eq!(rig.gateway.state().guards.len(), 1);
    rig.gateway
        .fail_guard_spawns
        .store(true, std::sync::atomic::Ordering::Relaxed);

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;

    let status = rig.handle.active_events().await.unwrap();
    assert_eq!(status[0].guards_alive, 1);

    rig.supervisor.shutdown().await.unwrap();
}

/// Each death while guards remain resets the despawn timer to the full
/// duration: a kill at duration-1 carries the event past the original
/// deadline, and the clock only runs out at the reset deadline.
#[tokio::test(start_paused = true)]
async fn guard_death_resets_the_despawn_timer() {
    let mut rig = start_supervisor(profile_with(2, 100.0)).await;
    start_and_release(&rig, drop_point()).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;
    let guard0 = rig.gateway.state().guards[0];

    // Kill one second before the original deadline.
    time::advance(Duration::from_secs(99)).await;
    rig.handle.route_death(guard0, None).await.unwrap();
    settle(&rig.handle).await;

    // Past the original deadline: still alive thanks to the reset.
    time::advance(Duration::from_secs(21)).await;
    settle(&rig.handle).await;
    assert_eq!(rig.handle.active_events().await.unwrap().len(), 1);
    assert!(drain_announcements(&mut rig.announcements)
        .iter()
        .all(|a| matches!(a, Announcement::Inbound { .. })));

    // One second before the reset deadline: still alive.
    time::advance(Duration::from_secs(78)).await;
    settle(&rig.handle).await;
    assert_eq!(rig.handle.active_events().await.unwrap().len(), 1);

    // The reset deadline passes with a guard alive: timed out.
    time::advance(Duration::from_secs(2)).await;
    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::Resolved { .. })
    })
    .await;
    settle(&rig.handle).await;

    let announcements = drain_announcements(&mut rig.announcements);
    assert!(announcements.iter().any(|a| matches!(a, Announcement::TimedOut { .. })));

    rig.supervisor.shutdown().await.unwrap();
}

/// The timer firing with guards alive destroys the container regardless of
/// the profile's auto-unlock configuration.
#[tokio::test(start_paused = true)]
async fn timeout_destroys_the_container_despite_auto_unlock() {
    let mut profile = profile_with(1, 60.0);
    profile.auto_unlock = AutoUnlock {
        enabled: true,
        seconds: 300.0,
    };

    let mut rig = start_supervisor(profile).await;
    start_and_release(&rig, drop_point()).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::Resolved { .. })
    })
    .await;
    settle(&rig.handle).await;

    let state = rig.gateway.state();
    assert!(state.unlocks.is_empty());
    let container = state.containers[0];
    assert_eq!(state.destroy_count(WorldHandle::Container(container)), 1);

    rig.supervisor.shutdown().await.unwrap();
}

/// A completion without an attributed final kill announces "cleared".
#[tokio::test(start_paused = true)]
async fn unattributed_final_kill_announces_cleared() {
    let mut rig = start_supervisor(profile_with(1, 100.0)).await;
    start_and_release(&rig, drop_point()).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;

    let guard = rig.gateway.state().guards[0];
    rig.handle.route_death(guard, None).await.unwrap();

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::Resolved { .. })
    })
    .await;
    settle(&rig.handle).await;

    let announcements = drain_announcements(&mut rig.announcements);
    let resolutions: Vec<_> = announcements
        .iter()
        .filter(|a| !matches!(a, Announcement::Inbound { .. }))
        .collect();
    assert_eq!(resolutions.len(), 1);
    assert!(matches!(resolutions[0], Announcement::Cleared { .. }));

    rig.supervisor.shutdown().await.unwrap();
}

/// Completing with auto-unlock enabled arms the container countdown to the
/// base unlock time minus the profile's discount.
#[tokio::test(start_paused = true)]
async fn completion_arms_auto_unlock() {
    let mut profile = profile_with(1, 100.0);
    profile.auto_unlock = AutoUnlock {
        enabled: true,
        seconds: 300.0,
    };

    let mut rig = start_supervisor(profile).await;
    start_and_release(&rig, drop_point()).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;

    let guard = rig.gateway.state().guards[0];
    rig.handle
        .route_death(guard, Some(KillerIdentity::new(5, "Raider")))
        .await
        .unwrap();
    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::Resolved { .. })
    })
    .await;
    settle(&rig.handle).await;

    let state = rig.gateway.state();
    let container = state.containers[0];
    assert_eq!(state.unlocks.as_slice(), &[(container, 600.0)]);
    assert_eq!(state.destroy_count(WorldHandle::Container(container)), 0);

    rig.supervisor.shutdown().await.unwrap();
}

/// An enabled loot policy refills the container right after it spawns,
/// with at most `max_items` distinct entries.
#[tokio::test(start_paused = true)]
async fn loot_is_refilled_on_container_spawn() {
    let mut profile = profile_with(1, 100.0);
    profile.loot = LootPolicy {
        enabled: true,
        max_items: 2,
        items: vec![
            LootEntry {
                item_id: "ammo.rifle".into(),
                min_amount: 60,
                max_amount: 120,
            },
            LootEntry {
                item_id: "rifle.ak".into(),
                min_amount: 1,
                max_amount: 1,
            },
            LootEntry {
                item_id: "syringe.medical".into(),
                min_amount: 2,
                max_amount: 6,
            },
        ],
    };

    let rig = start_supervisor(profile).await;
    start_and_release(&rig, drop_point()).await;
    settle(&rig.handle).await;

    let state = rig.gateway.state();
    assert_eq!(state.refills.len(), 1);
    let (container, items) = &state.refills[0];
    assert_eq!(*container, state.containers[0]);
    assert_eq!(items.len(), 2);
    assert_ne!(items[0].item_id, items[1].item_id);

    rig.supervisor.shutdown().await.unwrap();
}

/// The periodic pass re-syncs marker visuals for live events.
#[tokio::test(start_paused = true)]
async fn refresh_touches_live_markers() {
    let mut rig = start_supervisor(profile_with(1, 100.0)).await;
    start_and_release(&rig, drop_point()).await;

    wait_for(&mut rig.lifecycle, |e| {
        matches!(e, LifecycleEvent::PhaseChanged { phase: EventPhase::Active, .. })
    })
    .await;

    time::advance(Duration::from_secs(30)).await;
    settle(&rig.handle).await;

    let state = rig.gateway.state();
    assert!(!state.refreshes.is_empty());
    assert_eq!(state.refreshes[0], state.markers[0]);

    rig.supervisor.shutdown().await.unwrap();
}
