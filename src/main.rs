use anyhow::Context;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;

use research_sidebar::activity::events::{RenderEvent, ToolRenderBridge};
use research_sidebar::activity::scope;
use research_sidebar::commands;
use research_sidebar::config::AppConfig;
use research_sidebar::logging::init_logging;
use research_sidebar::models::activity::ActivitySnapshot;
use research_sidebar::state::AppState;
use research_sidebar::ui::panel::AgentActivityPanel;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    init_logging(verbose);

    let config = AppConfig::from_env().context("failed to read configuration")?;
    let state = AppState::init(config).context("failed to initialise state")?;

    let result = match args.iter().find(|a| !a.starts_with('-')).map(String::as_str) {
        Some("sessions") => list_sessions(&state).await,
        Some(other) => Err(anyhow::anyhow!("unknown command '{other}'")),
        None => scope::provide(state.activity.clone(), watch_stdin(&state)).await,
    };
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    result
}

async fn list_sessions(state: &AppState) -> anyhow::Result<()> {
    let sessions = match commands::sessions::list_sessions(state).await {
        Ok(sessions) => sessions,
        Err(err) => {
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };
    for session in sessions {
        let created = session
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}",
            session.id,
            session.title.as_deref().unwrap_or("Untitled"),
            session.status,
            created
        );
    }
    Ok(())
}

/// Feeds newline-delimited render events through the bridge and reprints the
/// panel whenever a new snapshot is published.
async fn watch_stdin(state: &AppState) -> anyhow::Result<()> {
    let activity = scope::current()?;
    let mut bridge = ToolRenderBridge::new(activity.clone());
    let mut panel = AgentActivityPanel::new();
    let mut snapshots = activity.subscribe();
    let max_chars = state.config.activity.key_argument_max_chars;
    let adapters = activity.adapters();

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let mut print = |snapshot: &ActivitySnapshot| {
        let rendered = panel.render(snapshot, &adapters, max_chars);
        for line in rendered {
            println!("{line}");
        }
        println!();
    };

    loop {
        tokio::select! {
            line = lines.next() => {
                let Some(line) = line else { break };
                let line = line.context("failed to read stdin")?;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<RenderEvent>(line) {
                    Ok(event) => {
                        let delivery = bridge.deliver(event);
                        tracing::debug!(?delivery, "event delivered");
                    }
                    Err(err) => tracing::warn!(error = %err, "skipping malformed event"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print(&snapshot);
            }
        }
    }

    activity.flush();
    if snapshots.has_changed().unwrap_or(false) {
        let snapshot = snapshots.borrow_and_update().clone();
        print(&snapshot);
    }
    Ok(())
}
