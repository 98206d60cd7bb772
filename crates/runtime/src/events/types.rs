//! Event types for the two bus topics.

use serde::{Deserialize, Serialize};

use event_core::{EventId, EventPhase, GuardHandle, Outcome, Position};

/// Granular lifecycle events: one per observable step of an instance.
///
/// These exist for observability and tests; nothing in the core reacts to
/// them. Player-visible messaging goes through [`Announcement`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A delivery vehicle was requested and is en route.
    DeliveryLaunched { event: EventId, profile: String },

    /// The payload was released; the drop position is now fixed.
    DeliveryReleased { event: EventId, position: Position },

    /// The instance moved to a new phase.
    PhaseChanged { event: EventId, phase: EventPhase },

    /// A guard was created and added to the live set.
    GuardSpawned {
        event: EventId,
        guard: GuardHandle,
        alive: usize,
    },

    /// A guard spawn failed and was skipped; the roster comes up short.
    GuardSpawnSkipped { event: EventId, index: u32 },

    /// A guard death was routed to this instance.
    GuardKilled {
        event: EventId,
        guard: GuardHandle,
        alive: usize,
    },

    /// The instance reached its terminal determination.
    Resolved { event: EventId, outcome: Outcome },
}

/// Player-visible broadcasts.
///
/// Exactly one resolution announcement (`Eliminated`/`Cleared`/`TimedOut`)
/// is emitted per resolved event; cancelled events emit none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Announcement {
    /// A delivery vehicle has launched; an event is inbound.
    Inbound { event: EventId, profile: String },

    /// All guards eliminated, final kill attributed to a named actor.
    Eliminated {
        event: EventId,
        location: Position,
        killer: String,
    },

    /// All guards eliminated with no attributed final kill.
    Cleared { event: EventId, location: Position },

    /// The despawn timer expired with guards still alive.
    TimedOut { event: EventId, location: Position },
}
