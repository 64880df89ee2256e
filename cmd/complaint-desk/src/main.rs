//! # complaint-desk
//!
//! Operator entry point. Wires the configured store and the roster-backed
//! session directory into the triage service, then runs one command as the
//! actor named by `--as` and prints the result as JSON.
//!
//! ```text
//! complaint-desk admin-report  --as <actor> [--query <text>] [--status <all|pending|in_progress|solved>]
//! complaint-desk my-complaints --as <actor>
//! complaint-desk submit        --as <actor> --title <t> --description <d> --category <c>
//! complaint-desk advance       --as <actor> --id <complaint> --to <status>
//! complaint-desk annotate      --as <actor> --id <complaint> --notes <text>
//! ```
//!
//! `<actor>` is a roster id or display name.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use auth_adapters::SessionDirectory;
use configs::{AppConfig, LogFormat, LoggingConfig};
use domains::{ActorId, ComplaintId, ComplaintStatus, StatusFilter, Submission};
use serde_json::json;
use services::{AdminConsole, StudentDesk, TriageService};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: complaint-desk <admin-report|my-complaints|submit|advance|annotate> --as <actor> [options]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).ok_or_else(|| anyhow!(USAGE))?;

    let store = storage_adapters::open_store(&config.storage).await?;
    let directory = Arc::new(SessionDirectory::with_actors(config.roster.iter().cloned()));

    let who = flag(&args, "--as").ok_or_else(|| anyhow!("--as <actor> is required"))?;
    let actor_id = resolve_actor(&config, who)?;
    directory.attach(actor_id).await?;

    let service = TriageService::new(store, directory);
    let output = match command {
        "admin-report" => admin_report(service, &args).await?,
        "my-complaints" => {
            let desk = StudentDesk::open(service).await?;
            json!({
                "complaints": desk.complaints(),
                "top_complainer": desk.top_complainer(),
            })
        }
        "submit" => {
            let submission = Submission::new(
                required(&args, "--title")?,
                required(&args, "--description")?,
                required(&args, "--category")?,
            );
            let mut desk = StudentDesk::open(service).await?;
            let stored = desk.submit(&submission).await?;
            json!({ "submitted": stored, "complaints": desk.complaints() })
        }
        "advance" => {
            let id = complaint_id(&args)?;
            let to = ComplaintStatus::from_str(required(&args, "--to")?)?;
            let mut console = AdminConsole::open(service).await?;
            json!({ "updated": console.advance(id, to).await? })
        }
        "annotate" => {
            let id = complaint_id(&args)?;
            let notes = required(&args, "--notes")?;
            let mut console = AdminConsole::open(service).await?;
            json!({ "updated": console.annotate(id, notes).await? })
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    info!(command, "done");
    Ok(())
}

async fn admin_report(service: TriageService, args: &[String]) -> anyhow::Result<serde_json::Value> {
    let mut console = AdminConsole::open(service).await?;
    if let Some(query) = flag(args, "--query") {
        console.set_query(query);
    }
    if let Some(status) = flag(args, "--status") {
        console.set_status_filter(StatusFilter::from_str(status)?);
    }
    let state = console.state();
    Ok(json!({
        "admin": console.principal().actor().display_name,
        "query": state.query,
        "status": state.status_filter.to_string(),
        "summary": state.summary(),
        "complaints": state.visible(),
    }))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn required<'a>(args: &'a [String], name: &str) -> anyhow::Result<&'a str> {
    flag(args, name).ok_or_else(|| anyhow!("{name} is required"))
}

fn complaint_id(args: &[String]) -> anyhow::Result<ComplaintId> {
    let raw = required(args, "--id")?;
    ComplaintId::from_str(raw).with_context(|| format!("'{raw}' is not a complaint id"))
}

/// Roster id first, then a case-insensitive display-name match.
fn resolve_actor(config: &AppConfig, who: &str) -> anyhow::Result<ActorId> {
    if let Ok(id) = ActorId::from_str(who) {
        return Ok(id);
    }
    config
        .roster
        .iter()
        .find(|a| a.display_name.eq_ignore_ascii_case(who))
        .map(|a| a.id)
        .ok_or_else(|| anyhow!("no roster entry named '{who}'"))
}
