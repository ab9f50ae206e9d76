//! `smux-tui`: live terminal dashboard for a streammux server.
//!
//! Opens one `/ws` session and renders every stream and mux the server
//! reports, with per-endpoint on/off switches, counters and the server
//! process panel. Logs go to a file so they never corrupt the terminal.

mod action;
mod app;
mod bridge;
mod event;
mod screens;
mod selection;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use smux_api::ApiClient;
use smux_config::Config;

use crate::app::{App, AppConfig};

/// Live terminal dashboard for a streammux server.
#[derive(Parser, Debug)]
#[command(name = "smux-tui", version, about)]
struct Cli {
    /// Server base URL (e.g., http://127.0.0.1:8080/)
    #[arg(short = 'u', long, env = "SMUX_URL")]
    url: Option<String>,

    /// Log file path (defaults to smux-tui.log in the data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_path(cli: &Cli, cfg: &Config) -> PathBuf {
    cli.log_file
        .clone()
        .or_else(|| cfg.tui.log_file.clone())
        .unwrap_or_else(|| smux_config::data_dir().join("smux-tui.log"))
}

/// File-only tracing. The returned guard must live until exit so the
/// writer flushes.
fn setup_tracing(cli: &Cli, cfg: &Config) -> Result<WorkerGuard> {
    let verbosity = if cfg.debug { cli.verbose.max(2) } else { cli.verbose };
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("smux_tui={level},smux_core={level},smux_api={level}"))
    });

    let path = log_path(cli, cfg);
    let dir = path.parent().map_or_else(|| PathBuf::from("."), PathBuf::from);
    std::fs::create_dir_all(&dir).wrap_err_with(|| format!("creating {}", dir.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "smux-tui.log".into(), ToOwned::to_owned);

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .init();
    Ok(guard)
}

fn app_config(cfg: &Config) -> Result<AppConfig> {
    let base = cfg.base_url()?;
    let (_, ws_url) = smux_api::endpoints(&base)?;
    let client = ApiClient::with_timeout(base, cfg.request_timeout())?;
    Ok(AppConfig {
        client,
        ws_url,
        timeout: cfg.request_timeout(),
        tick: cfg.tick_interval(),
        render: cfg.render_interval(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tui::install_hooks()?;

    let mut cfg = smux_config::load_config_or_default();
    if let Some(ref url) = cli.url {
        cfg.url.clone_from(url);
    }
    let _log_guard = setup_tracing(&cli, &cfg)?;
    info!(url = %cfg.url, "starting smux-tui");

    let config = app_config(&cfg)?;
    let mut app = App::new(Instant::now());
    app.run(config).await
}
