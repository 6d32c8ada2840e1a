//! LedgerBoard Server Binary
//!
//! Opens the ledger, rebuilds the index and serves the TCP gateway.

use std::sync::Arc;

use clap::Parser;
use ledgerboard::config::LogSyncStrategy;
use ledgerboard::network::Server;
use ledgerboard::{Board, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// LedgerBoard Server
#[derive(Parser, Debug)]
#[command(name = "ledgerboard-server")]
#[command(about = "Topic/post/comment board synchronized against a key-value ledger")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./ledgerboard_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9099")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "256")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// fsync the ledger every N writes instead of every write
    #[arg(long)]
    sync_every: Option<usize>,

    /// Start with an empty index instead of rebuilding from the ledger
    #[arg(long)]
    no_rebuild: bool,

    /// Seed the demo board when the ledger is empty
    #[arg(long)]
    seed_demo: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ledgerboard=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("LedgerBoard Server v{}", ledgerboard::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = match args.sync_every {
        Some(count) => LogSyncStrategy::EveryNEntries { count },
        None => LogSyncStrategy::EveryWrite,
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .log_sync_strategy(sync_strategy)
        .rebuild_on_open(!args.no_rebuild)
        .build();

    let board = match Board::open_config(&config) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            tracing::error!("Failed to open board: {}", e);
            std::process::exit(1);
        }
    };

    if args.seed_demo {
        match board.seed_demo() {
            Ok(true) => tracing::info!("Demo board seeded"),
            Ok(false) => tracing::info!("Ledger not empty, skipping demo seed"),
            Err(e) => tracing::error!("Failed to seed demo board: {}", e),
        }
    }

    tracing::info!("Board ready: {} topics", board.list_topics().len());

    let mut server = Server::new(config, board);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
