//! Difficulty profiles and the validated profile collection.
//!
//! Profiles are immutable content: loaded once at startup, validated once,
//! then shared by reference between the supervisor and every instance it
//! starts. Validation lives here (invoked by the content loader) so that a
//! bad data file fails the service at boot instead of failing an event
//! start mid-session.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::ConfigurationError;

/// Map marker appearance for the dropped container.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerStyle {
    pub color_primary: String,
    pub color_secondary: String,
    pub opacity: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color_primary: "#F4D142".into(),
            color_secondary: "#FFFFFF".into(),
            opacity: 0.9,
        }
    }
}

/// Auto-unlock behavior applied when the guards are eliminated.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutoUnlock {
    pub enabled: bool,
    /// Seconds shaved off the container's normal unlock countdown.
    pub seconds: f32,
}

/// One candidate loot item with its quantity range.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootEntry {
    pub item_id: String,
    pub min_amount: u32,
    pub max_amount: u32,
}

/// Loot refill policy for the container.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LootPolicy {
    pub enabled: bool,
    /// Maximum number of distinct entries selected per event.
    pub max_items: usize,
    pub items: Vec<LootEntry>,
}

/// Immutable difficulty tier configuration, one of which is chosen at
/// random for each new event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyProfile {
    pub name: String,
    /// Length of the active-guard phase before the event times out.
    pub duration_secs: f32,
    pub guard_count: u32,
    pub guard_health: f32,
    pub guard_roam_radius: f32,
    pub guard_aggro_radius: f32,
    pub guard_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub marker: MarkerStyle,
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_unlock: AutoUnlock,
    #[cfg_attr(feature = "serde", serde(default))]
    pub loot: LootPolicy,
}

impl DifficultyProfile {
    /// Active-guard phase duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f32(self.duration_secs)
    }

    /// Checks the invariants a profile must satisfy before any event may
    /// use it.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.duration_secs <= 0.0 {
            return Err(ConfigurationError::NonPositiveDuration {
                profile: self.name.clone(),
                duration_secs: self.duration_secs,
            });
        }
        if self.guard_count == 0 {
            return Err(ConfigurationError::ZeroGuardCount {
                profile: self.name.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.marker.opacity) {
            return Err(ConfigurationError::InvalidMarkerOpacity {
                profile: self.name.clone(),
                opacity: self.marker.opacity,
            });
        }
        for entry in &self.loot.items {
            if entry.min_amount == 0 || entry.min_amount > entry.max_amount {
                return Err(ConfigurationError::InvalidLootRange {
                    profile: self.name.clone(),
                    item: entry.item_id.clone(),
                    min: entry.min_amount,
                    max: entry.max_amount,
                });
            }
        }
        Ok(())
    }
}

/// Validated, non-empty collection of difficulty profiles.
///
/// Construction is the only place profile invariants are checked; once a
/// set exists, [`ProfileSet::pick`] cannot fail.
#[derive(Clone, Debug)]
pub struct ProfileSet {
    profiles: Vec<Arc<DifficultyProfile>>,
}

impl ProfileSet {
    pub fn new(profiles: Vec<DifficultyProfile>) -> Result<Self, ConfigurationError> {
        if profiles.is_empty() {
            return Err(ConfigurationError::EmptyProfileSet);
        }
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
        })
    }

    /// Selects a profile uniformly at random.
    pub fn pick(&self, rng: &mut impl Rng) -> Arc<DifficultyProfile> {
        let index = rng.gen_range(0..self.profiles.len());
        Arc::clone(&self.profiles[index])
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DifficultyProfile>> {
        self.profiles.iter()
    }
}
