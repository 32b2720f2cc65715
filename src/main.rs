//! MATCHDAY — match prediction cards
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the match board and serves the dashboard until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use matchday::board::MatchBoard;
use matchday::card::kickoff::SystemClock;
use matchday::card::submission::SimulatedSubmitter;
use matchday::config;
use matchday::dashboard::{self, DashboardState};
use matchday::notify::{FanoutSink, NotificationLog, NotificationSink, TracingSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("MATCHDAY_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging(&cfg);

    info!(
        app = %cfg.app.name,
        teams = cfg.teams.len(),
        matches = cfg.matches.len(),
        delay_ms = cfg.submission.delay_ms,
        failure_rate = cfg.submission.failure_rate,
        "MATCHDAY starting up"
    );

    // -- Collaborators ---------------------------------------------------

    let catalog = Arc::new(cfg.catalog()?);
    let submitter = Arc::new(
        SimulatedSubmitter::new(cfg.submission.delay()).with_failure_rate(cfg.submission.failure_rate),
    );
    let notifications = Arc::new(NotificationLog::default());
    let sink: Arc<dyn NotificationSink> = Arc::new(FanoutSink::new(vec![
        notifications.clone() as Arc<dyn NotificationSink>,
        Arc::new(TracingSink),
    ]));

    let board = MatchBoard::from_config(&cfg.matches, catalog, submitter, sink)?;
    if board.is_empty() {
        warn!("No [[matches]] configured — the board will be empty");
    }

    // -- Serve -----------------------------------------------------------

    let state = Arc::new(DashboardState::new(board, notifications).with_clock(Arc::new(SystemClock)));

    if cfg.dashboard.enabled {
        dashboard::serve(state.clone(), cfg.dashboard.port, shutdown_signal()).await?;
    } else {
        info!("Dashboard disabled. Press Ctrl+C to stop.");
        shutdown_signal().await;
    }

    state.board.dispose_all();
    info!("MATCHDAY shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging(cfg: &config::AppConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matchday=info"));

    let json_logging = cfg.app.log_json || std::env::var("MATCHDAY_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
