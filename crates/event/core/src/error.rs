//! Load-time configuration errors.
//!
//! These are fatal to startup: a service with no valid profiles must refuse
//! to come up rather than silently run events that can never start.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("profile set is empty; at least one difficulty profile is required")]
    EmptyProfileSet,

    #[error("profile '{profile}' has non-positive event duration {duration_secs}")]
    NonPositiveDuration { profile: String, duration_secs: f32 },

    #[error("profile '{profile}' has zero guard count")]
    ZeroGuardCount { profile: String },

    #[error("profile '{profile}' has marker opacity {opacity} outside [0, 1]")]
    InvalidMarkerOpacity { profile: String, opacity: f32 },

    #[error(
        "profile '{profile}' loot entry '{item}' has invalid amount range {min}..={max}"
    )]
    InvalidLootRange {
        profile: String,
        item: String,
        min: u32,
        max: u32,
    },
}
