//! shardkv Server Binary
//!
//! Starts the TCP server for shardkv.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use shardkv::config::WalSyncStrategy;
use shardkv::network::Server;
use shardkv::{Config, KvStore};
use tracing_subscriber::{fmt, EnvFilter};

/// shardkv Server
#[derive(Parser, Debug)]
#[command(name = "shardkv-server")]
#[command(about = "Sharded key-value store with a write-ahead log")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:9090")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Number of shards
    #[arg(short, long, default_value = "16")]
    shards: usize,

    /// Write-ahead log path (omit to run in memory only)
    #[arg(short, long)]
    wal: Option<PathBuf>,

    /// fsync the log after every record instead of only flushing it
    #[arg(long)]
    fsync: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shardkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("shardkv server v{}", shardkv::VERSION);
    match &args.wal {
        Some(path) => tracing::info!("WAL: {}", path.display()),
        None => tracing::info!("WAL disabled, running in memory"),
    }

    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .worker_threads(args.threads)
        .shard_count(args.shards)
        .wal_sync_strategy(if args.fsync {
            WalSyncStrategy::Fsync
        } else {
            WalSyncStrategy::Flush
        });
    if let Some(path) = &args.wal {
        builder = builder.wal_path(path);
    }
    let config = builder.build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let store = match KvStore::open(&config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store initialized with {} entries", store.len());

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
