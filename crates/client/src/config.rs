//! Client configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Settings for the console binary, following the `from_env` convention:
/// every knob has a default and an environment override.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Path to the difficulty profile TOML file.
    pub profiles_path: PathBuf,
    /// Optional path to a localized message catalog; `None` uses the
    /// built-in English catalog.
    pub messages_path: Option<PathBuf>,
    /// Operators allowed to run start/stop. Empty means the local console
    /// is trusted and everyone is allowed.
    pub operators: Vec<String>,
    /// Name the console acts as when issuing commands and kills.
    pub operator_name: String,
    /// Simulated flight time before the payload is released.
    pub flight_time: Duration,
}

impl ClientConfig {
    pub const DEFAULT_PROFILES_PATH: &'static str = "config/profiles.toml";
    pub const DEFAULT_FLIGHT_SECS: u64 = 15;

    pub fn from_env() -> Self {
        let profiles_path = std::env::var("SKYDROP_PROFILES")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_PROFILES_PATH));

        let messages_path = std::env::var("SKYDROP_MESSAGES").ok().map(PathBuf::from);

        let operators = std::env::var("SKYDROP_OPERATORS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let operator_name =
            std::env::var("SKYDROP_OPERATOR").unwrap_or_else(|_| "console".into());

        let flight_time = std::env::var("SKYDROP_FLIGHT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(Self::DEFAULT_FLIGHT_SECS));

        Self {
            profiles_path,
            messages_path,
            operators,
            operator_name,
            flight_time,
        }
    }
}
