mod config;
mod display;
mod models;
mod mta;
mod web;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use config::{Config, ConfigError};
use display::colors::RouteStyle;
use display::terminal::{render_board, render_self_test};
use models::Board;
use mta::client::MtaClient;
use mta::feeds;
use mta::resolver::resolve;
use mta::stations::{StationDirectory, StationSource, StationSourceError};

#[derive(Parser, Debug)]
#[command(
    name = "subway-arrivals",
    version,
    about = "NYC MTA Subway train tracker",
    long_about = "Shows the trains approaching along one subway line, grouped by \
                  section of the line, from the live MTA GTFS-Realtime feed."
)]
struct Args {
    /// Subway route to track (overrides the config file)
    #[arg(short = 'r', short_alias = 'l', long)]
    route: Option<String>,

    /// Config file (defaults to config.json in the current or parent directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep refreshing on the configured interval
    #[arg(short, long)]
    watch: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Print every route with its colors and names, then exit
    #[arg(long)]
    self_test: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state for watch mode: lock-free board reads via ArcSwap.
pub struct AppState {
    pub config: Config,
    pub directory: StationDirectory,
    pub stations: StationSource,
    pub board: ArcSwap<Board>,
    pub shutdown: CancellationToken,
    pub last_fetch_success: AtomicU64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing (structured logging) on stderr; the board owns stdout
    let default_filter = if args.verbose {
        "subway_arrivals=debug"
    } else {
        "subway_arrivals=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.self_test {
        match StationSource::embedded() {
            Ok(stations) => print!("{}", render_self_test(!args.no_color, &stations)),
            Err(e) => {
                error!("Failed to load station data: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config_path = args.config.clone().unwrap_or_else(find_config_path);
    let config = match load_config(&config_path, args.route.as_deref()) {
        Ok(cfg) => {
            info!(
                "Config loaded: route {}, refresh every {}s",
                cfg.route, cfg.refresh.interval_secs
            );
            cfg
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let source = match load_station_source(config.stations_path.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to load station data: {}", e);
            std::process::exit(1);
        }
    };
    let directory = StationDirectory::build(&source, &config.route);

    let Some(feed_url) = feeds::feed_url_for_route(&config.route) else {
        error!("No realtime feed for route {}", config.route);
        std::process::exit(1);
    };

    let mut client = match MtaClient::new() {
        Ok(c) => c,
        Err(e) => {
            error!("[FETCH] {}", e);
            std::process::exit(1);
        }
    };

    let style = RouteStyle::for_route(&config.route, config.display.color && !args.no_color);

    if !args.watch {
        let Some(snapshot) = client.fetch_snapshot(&feed_url).await else {
            error!("Error fetching data for route {}", config.route);
            std::process::exit(1);
        };
        let board = resolve(&snapshot, &directory, &config.route);
        print!("{}", render_board(&board, &directory, &style));
        return;
    }

    let state = Arc::new(AppState {
        board: ArcSwap::from_pointee(Board::empty(&config.route)),
        config,
        directory,
        stations: source,
        shutdown: CancellationToken::new(),
        last_fetch_success: AtomicU64::new(0),
    });

    // Spawn fetch task
    let fetch_state = Arc::clone(&state);
    let fetch_handle = tokio::spawn(fetch_task(fetch_state, client, feed_url, style));

    // Spawn web server task
    let web_handle = if state.config.web.enabled {
        Some(tokio::spawn(web::server::run(Arc::clone(&state))))
    } else {
        None
    };

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");
    state.shutdown.cancel();

    let _ = fetch_handle.await;
    if let Some(handle) = web_handle {
        let _ = handle.await;
    }

    info!("Shutdown complete");
}

/// Find the config.json file (check CWD, then parent directory).
fn find_config_path() -> PathBuf {
    let candidates = [
        PathBuf::from("config.json"),
        PathBuf::from("../config.json"),
    ];
    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }
    // Default even if it doesn't exist
    PathBuf::from("config.json")
}

/// Load the config file and apply a command-line route override.
fn load_config(path: &Path, route: Option<&str>) -> Result<Config, ConfigError> {
    let config = Config::load(path)?;
    match route {
        Some(route) => config.with_route(route),
        None => Ok(config),
    }
}

/// Station directory document from disk, or the embedded copy.
fn load_station_source(path: Option<&Path>) -> Result<StationSource, StationSourceError> {
    match path {
        Some(path) => {
            info!("[STATIONS] Loading {}", path.display());
            StationSource::load(path)
        }
        None => StationSource::embedded(),
    }
}

/// Fetch, resolve and publish one board. Returns false when no snapshot was available.
async fn refresh_board(
    client: &mut MtaClient,
    state: &AppState,
    feed_url: &str,
    last_train_count: &mut Option<usize>,
) -> bool {
    let Some(snapshot) = client.fetch_snapshot(feed_url).await else {
        return false;
    };

    let board = resolve(&snapshot, &state.directory, &state.config.route);
    let train_count = board.train_count();
    state.board.store(Arc::new(board));

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    state.last_fetch_success.store(now, Ordering::Relaxed);

    if *last_train_count != Some(train_count) {
        info!("[FETCH] {} trains on route {}", train_count, state.config.route);
        *last_train_count = Some(train_count);
    }
    true
}

/// Background fetch task: one fetch-then-resolve cycle per interval, never overlapping.
async fn fetch_task(state: Arc<AppState>, mut client: MtaClient, feed_url: String, style: RouteStyle) {
    let mut last_train_count: Option<usize> = None;
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.refresh.interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("[FETCH] Background fetch task started");

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                info!("[FETCH] Shutting down");
                break;
            }
            _ = interval.tick() => {
                if refresh_board(&mut client, &state, &feed_url, &mut last_train_count).await {
                    let board = state.board.load();
                    print!("\x1b[2J\x1b[H{}", render_board(&board, &state.directory, &style));
                }
            }
        }
    }
}

/// Wait for SIGTERM or SIGINT (Ctrl-C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
