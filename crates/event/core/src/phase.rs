//! Event lifecycle vocabulary.
//!
//! The phase sequence is fixed: Delivering → SpawningGuards → Active →
//! Resolving → Terminated. Transitions are monotonic; the only repeatable
//! operation inside a phase is the despawn timer reset while Active.

use crate::types::KillerIdentity;

/// Lifecycle phase of a single event instance.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventPhase {
    /// Delivery vehicle requested; no drop location exists yet.
    Delivering,
    /// Drop location fixed; container placed, guard roster being issued.
    SpawningGuards,
    /// Full roster issued; despawn timer running, deaths being routed.
    Active,
    /// Terminal determination reached; world objects being cleaned up.
    Resolving,
    /// Fully cleaned up and deregistered. No further transitions.
    Terminated,
}

impl EventPhase {
    /// Returns true once the instance has finished all cleanup.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventPhase::Terminated)
    }

    /// Returns true while the instance still owns world objects or tasks.
    pub fn is_live(self) -> bool {
        !matches!(self, EventPhase::Resolving | EventPhase::Terminated)
    }
}

/// Terminal determination of an event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Every guard was eliminated before the despawn timer fired. The killer
    /// of the final guard is attached when the host attributed one.
    Eliminated { killer: Option<KillerIdentity> },
    /// The despawn timer fired while at least one guard was still alive.
    TimedOut,
    /// Externally cancelled (bulk stop, shutdown, or an unrecoverable spawn
    /// failure). Never announced per-event.
    Cancelled,
}

impl Outcome {
    /// True only for the "guards eliminated" resolution; gates whether the
    /// container survives and may auto-unlock.
    pub fn completed(&self) -> bool {
        matches!(self, Outcome::Eliminated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_follows_lifecycle() {
        assert!(EventPhase::Delivering < EventPhase::SpawningGuards);
        assert!(EventPhase::SpawningGuards < EventPhase::Active);
        assert!(EventPhase::Active < EventPhase::Resolving);
        assert!(EventPhase::Resolving < EventPhase::Terminated);
    }

    #[test]
    fn phase_display_is_snake_case() {
        assert_eq!(EventPhase::SpawningGuards.to_string(), "spawning_guards");
        assert_eq!(EventPhase::Active.to_string(), "active");
    }

    #[test]
    fn only_elimination_counts_as_completed() {
        assert!(Outcome::Eliminated { killer: None }.completed());
        assert!(!Outcome::TimedOut.completed());
        assert!(!Outcome::Cancelled.completed());
    }
}
