//! Permission-gated operator command surface.
//!
//! Two commands mutate the event system: `start` and `stop`. The rest are
//! console conveniences (`status`, `kill`, `quit`). Responses are localized
//! status strings, not exit codes; the service keeps running after every
//! command.

use event_core::KillerIdentity;
use runtime::SupervisorHandle;

use crate::messages::Messages;
use crate::sim::SimulatedGateway;

/// Decides whether an operator may manage events.
pub trait PermissionGate: Send + Sync {
    fn can_manage_events(&self, operator: &str) -> bool;
}

/// Allow-list gate backed by the `SKYDROP_OPERATORS` environment variable.
///
/// An empty list trusts the local console and allows everyone.
pub struct EnvAllowList {
    operators: Vec<String>,
}

impl EnvAllowList {
    pub fn new(operators: Vec<String>) -> Self {
        Self { operators }
    }
}

impl PermissionGate for EnvAllowList {
    fn can_manage_events(&self, operator: &str) -> bool {
        self.operators.is_empty() || self.operators.iter().any(|o| o == operator)
    }
}

/// A parsed console command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Start one new event.
    Start,
    /// Cancel all running events.
    Stop,
    /// List running events.
    Status,
    /// Simulate a player killing one live guard (simulated gateway only).
    Kill,
    /// Shut the console down.
    Quit,
}

impl OperatorCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "status" => Some(Self::Status),
            "kill" => Some(Self::Kill),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Executes one command and returns the operator-facing response.
pub async fn dispatch(
    command: OperatorCommand,
    handle: &SupervisorHandle,
    gate: &dyn PermissionGate,
    operator: &str,
    messages: &Messages,
    sim: &SimulatedGateway,
) -> String {
    match command {
        OperatorCommand::Start => {
            if !gate.can_manage_events(operator) {
                return messages.permission_denied.clone();
            }
            match handle.start().await {
                Ok(id) => Messages::format(&messages.event_started, "id", &id.to_string()),
                Err(error) => {
                    Messages::format(&messages.event_start_failed, "error", &error.to_string())
                }
            }
        }
        OperatorCommand::Stop => {
            if !gate.can_manage_events(operator) {
                return messages.permission_denied.clone();
            }
            match handle.stop_all().await {
                Ok(count) => {
                    Messages::format(&messages.events_stopped, "count", &count.to_string())
                }
                Err(error) => error.to_string(),
            }
        }
        OperatorCommand::Status => match handle.active_events().await {
            Ok(events) if events.is_empty() => "No running events.".into(),
            Ok(events) => events
                .iter()
                .map(|e| {
                    format!(
                        "{} [{}] phase={} guards={}",
                        e.id, e.profile, e.phase, e.guards_alive
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(error) => error.to_string(),
        },
        OperatorCommand::Kill => match sim.take_random_guard() {
            Some(guard) => {
                let killer = KillerIdentity::new(1, operator);
                match handle.route_death(guard, Some(killer)).await {
                    Ok(()) => format!("Killed {guard:?}."),
                    Err(error) => error.to_string(),
                }
            }
            None => messages.no_guard_to_kill.clone(),
        },
        OperatorCommand::Quit => "Shutting down.".into(),
    }
}
