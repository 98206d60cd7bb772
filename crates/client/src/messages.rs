//! Localized message catalog for operator responses and announcements.
//!
//! Templates use `{name}` placeholders substituted at format time. The
//! built-in catalog is English; deployments can override it with a TOML
//! file without recompiling.

use std::path::Path;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub permission_denied: String,
    pub event_started: String,
    pub event_start_failed: String,
    pub events_stopped: String,
    pub unknown_command: String,
    pub no_guard_to_kill: String,
    pub announce_inbound: String,
    pub announce_eliminated: String,
    pub announce_cleared: String,
    pub announce_timed_out: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            permission_denied: "You do not have permission to manage events.".into(),
            event_started: "Guarded drop event {id} started.".into(),
            event_start_failed: "Could not start an event: {error}".into(),
            events_stopped: "Stopping {count} running event(s).".into(),
            unknown_command: "Unknown command. Try: start, stop, status, kill, quit.".into(),
            no_guard_to_kill: "No live guard to kill.".into(),
            announce_inbound: "A guarded supply drop is inbound! Difficulty: {profile}.".into(),
            announce_eliminated: "The guards at {location} were eliminated by {killer}!".into(),
            announce_cleared: "The guards at {location} were cleared!".into(),
            announce_timed_out: "The supply drop at {location} was lost to time.".into(),
        }
    }
}

impl Messages {
    /// Load an override catalog from a TOML file; missing keys fall back to
    /// the built-in English text.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read messages file {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse messages TOML: {}", e))
    }

    /// Substitute one `{placeholder}` in a template.
    pub fn format(template: &str, key: &str, value: &str) -> String {
        template.replace(&format!("{{{key}}}"), value)
    }
}
