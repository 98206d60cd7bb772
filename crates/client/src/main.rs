//! Skydrop operator console binary.
//!
//! Composition root: loads configuration and profiles, builds the
//! supervisor over the simulated gateway, prints announcements, and runs
//! the permission-gated command loop until `quit`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use event_content::ProfileLoader;
use runtime::{Announcement, Supervisor};
use skydrop_client::{
    ClientConfig, EnvAllowList, Messages, OperatorCommand, SimulatedGateway, commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ClientConfig::from_env();

    tracing::info!("Starting skydrop console");
    tracing::info!("Profiles: {}", config.profiles_path.display());

    let profiles = ProfileLoader::load(&config.profiles_path)
        .with_context(|| format!("loading profiles from {}", config.profiles_path.display()))?;
    tracing::info!("Loaded {} difficulty profile(s)", profiles.len());

    let messages = match &config.messages_path {
        Some(path) => Messages::load(path)
            .with_context(|| format!("loading messages from {}", path.display()))?,
        None => Messages::default(),
    };

    let gateway = Arc::new(SimulatedGateway::new(config.flight_time));

    let supervisor = Supervisor::builder()
        .profiles(profiles)
        .gateway(gateway.clone())
        .build()
        .await?;

    let handle = supervisor.handle();
    gateway.attach(handle.clone());

    // Announcement printer: what players would see in-game.
    let announcer = {
        let mut rx = supervisor.subscribe_announcements();
        let messages = messages.clone();
        tokio::spawn(async move {
            while let Ok(announcement) = rx.recv().await {
                println!("{}", render_announcement(&messages, &announcement));
            }
        })
    };

    let gate = EnvAllowList::new(config.operators.clone());
    let operator = config.operator_name.clone();

    println!("skydrop console ready. Commands: start, stop, status, kill, quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = OperatorCommand::parse(&line) else {
            println!("{}", messages.unknown_command);
            continue;
        };

        let response =
            commands::dispatch(command, &handle, &gate, &operator, &messages, &gateway).await;
        println!("{response}");

        if command == OperatorCommand::Quit {
            break;
        }
    }

    announcer.abort();
    drop(handle);
    supervisor.shutdown().await?;
    tracing::info!("Console shutdown complete");
    Ok(())
}

fn render_announcement(messages: &Messages, announcement: &Announcement) -> String {
    match announcement {
        Announcement::Inbound { profile, .. } => {
            Messages::format(&messages.announce_inbound, "profile", profile)
        }
        Announcement::Eliminated {
            location, killer, ..
        } => {
            let text =
                Messages::format(&messages.announce_eliminated, "location", &location.to_string());
            Messages::format(&text, "killer", killer)
        }
        Announcement::Cleared { location, .. } => {
            Messages::format(&messages.announce_cleared, "location", &location.to_string())
        }
        Announcement::TimedOut { location, .. } => {
            Messages::format(&messages.announce_timed_out, "location", &location.to_string())
        }
    }
}
