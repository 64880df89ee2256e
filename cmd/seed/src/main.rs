//! Seeds the configured store with a demo data set.
//!
//! Everything goes through the triage service so the stored rows obey the
//! same rules as live traffic. Uses the configured roster when it has at
//! least one student and one admin, otherwise a built-in one.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::SessionDirectory;
use configs::{AppConfig, LogFormat};
use domains::{Actor, ComplaintStatus, DomainError, Role, Submission};
use services::{AdminConsole, StudentDesk, TriageService};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEMO: &[(&str, &str, &str)] = &[
    ("Wifi down", "No wifi on the second floor since Monday.", "Technical"),
    ("Leaking tap", "The tap in room 204 has been dripping all week.", "Hostel"),
    ("Mentor unavailable", "My mentor has missed the last three reviews.", "Mentor"),
    ("Broken projector", "The projector in lab 3 shows no signal.", "Infrastructure"),
    ("Interview prep", "Need more mock interviews before placements.", "Placement"),
    ("Noisy corridor", "Late night noise near the common room.", "Other"),
];

fn demo_roster() -> Vec<Actor> {
    vec![
        Actor::new("Alice", Role::Student),
        Actor::new("Bob", Role::Student),
        Actor::new("Dana", Role::Admin),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }

    let has = |role| config.roster.iter().any(|a: &Actor| a.role == role);
    let roster = if has(Role::Student) && has(Role::Admin) {
        config.roster.clone()
    } else {
        info!("roster incomplete, using demo actors");
        demo_roster()
    };

    let store = storage_adapters::open_store(&config.storage).await?;
    let directory = Arc::new(SessionDirectory::with_actors(roster.iter().cloned()));
    let service = TriageService::new(store, directory.clone());

    let students: Vec<&Actor> = roster.iter().filter(|a| a.role == Role::Student).collect();
    for (n, (title, description, category)) in DEMO.iter().enumerate() {
        let student = students[n % students.len()];
        directory.attach(student.id).await?;
        let mut desk = StudentDesk::open(service.clone()).await?;
        desk.submit(&Submission::new(*title, *description, *category)).await?;
        desk.sign_out().await?;
    }

    let admin = roster
        .iter()
        .find(|a| a.role == Role::Admin)
        .context("roster has no admin")?;
    directory.attach(admin.id).await?;
    let mut console = AdminConsole::open(service).await?;

    let ids: Vec<_> = console.state().snapshot().iter().map(|c| c.id()).collect();
    for (n, id) in ids.iter().enumerate() {
        match n % 3 {
            0 => {
                console.advance(*id, ComplaintStatus::InProgress).await?;
                console.annotate(*id, "Assigned to the facilities team.").await?;
            }
            1 => {
                console.advance(*id, ComplaintStatus::InProgress).await?;
                console.advance(*id, ComplaintStatus::Solved).await?;
            }
            _ => {}
        }
    }

    // A solved complaint must refuse to move again.
    if let Some(id) = ids.get(1) {
        match console.advance(*id, ComplaintStatus::InProgress).await {
            Err(DomainError::IllegalTransition { from, to }) => {
                info!(%from, %to, "terminal status held")
            }
            other => warn!(?other, "solved complaint moved"),
        }
    }

    let summary = console.state().summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    console.sign_out().await?;
    Ok(())
}
