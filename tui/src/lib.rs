//! Terminal front end for the newtab start page: one input line with the
//! `//` command grammar, debounced remote suggestions and ghost-text
//! completion.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod app_event;
mod app_event_sender;
mod composer;
mod dispatcher;
mod tui;
mod updates;

use app::App;
use app_event::AppEvent;
use app_event_sender::AppEventSender;
use composer::SearchComposer;
use dispatcher::PageController;
use newtab_state::StateStore;
use newtab_suggest::SuggestClient;

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "newtab-tui", version, about = "Start page with // commands")]
pub struct Cli {
    /// Path of the JSON state file. Defaults to the platform data directory.
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Suggestion endpoint (Google-suggest wire format).
    #[arg(long, value_name = "URL", default_value = newtab_suggest::DEFAULT_SUGGEST_URL)]
    pub suggest_url: String,

    /// Manifest consulted by the startup update check.
    #[arg(long, value_name = "URL", default_value = updates::DEFAULT_MANIFEST_URL)]
    pub manifest_url: String,

    /// Skip the startup update check.
    #[arg(long)]
    pub no_update_check: bool,
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let data_dir = data_dir()?;
    let _log_guard = init_logging(&data_dir)?;

    let state_path = cli
        .state_file
        .unwrap_or_else(|| data_dir.join("state.json"));
    let store = StateStore::new(state_path);

    let (app_event_tx, mut app_event_rx) = unbounded_channel();
    let app_event_tx = AppEventSender::new(app_event_tx);

    let controller = PageController::load(store, app_event_tx.clone()).await?;
    let composer = SearchComposer::new(app_event_tx.clone());
    let app = App::new(
        composer,
        controller,
        SuggestClient::new(cli.suggest_url),
        app_event_tx.clone(),
    );

    if !cli.no_update_check {
        spawn_update_check(cli.manifest_url, app_event_tx.clone());
    }

    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal, &mut app_event_rx).await;
    let restore_result = tui::restore();
    result.and(restore_result)
}

fn data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine the platform data directory"))?;
    Ok(base.join("newtab"))
}

fn init_logging(data_dir: &std::path::Path) -> anyhow::Result<WorkerGuard> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, "newtab-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Stdout belongs to the TUI; logs only go to the file.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("newtab_tui=info,newtab_suggest=info,newtab_state=info,newtab_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

/// Fire-and-forget version probe; a newer published version becomes a
/// notice, failures are only logged.
fn spawn_update_check(manifest_url: String, app_event_tx: AppEventSender) {
    tokio::spawn(async move {
        match updates::newer_published_version(&manifest_url, CURRENT_VERSION).await {
            Ok(Some(version)) => {
                app_event_tx.send(AppEvent::Notice(format!(
                    "Version {version} is available (running {CURRENT_VERSION})."
                )));
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("update check failed: {err:#}"),
        }
    });
}
