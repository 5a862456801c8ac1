//! TCP Server
//!
//! Accepts connections and dispatches them to the worker pool.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Connection;
use crate::config::Config;
use crate::error::Result;
use crate::pool::ThreadPool;
use crate::store::KvStore;

/// TCP server for shardkv
pub struct Server {
    config: Config,
    store: Arc<KvStore>,
    listener: TcpListener,
    local_addr: SocketAddr,
    pool: ThreadPool,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listener and start the worker pool
    pub fn bind(config: Config, store: Arc<KvStore>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;
        let pool = ThreadPool::new(config.worker_threads)?;

        tracing::info!(
            "Listening on {} ({} workers, {} shards)",
            local_addr,
            config.worker_threads,
            store.shard_count()
        );

        Ok(Self {
            config,
            store,
            listener,
            local_addr,
            pool,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr,
        }
    }

    /// Accept connections until shut down (blocking)
    ///
    /// Every connection becomes one task on the pool. After the accept loop
    /// ends, the pool is drained: open connections are served until their
    /// clients disconnect.
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            self.dispatch(stream)?;
        }

        tracing::info!("Accept loop stopped, draining workers");
        self.pool.shutdown();
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream) -> Result<()> {
        let store = Arc::clone(&self.store);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        self.pool.submit(move || {
            let result = Connection::new(stream, store).and_then(|mut conn| {
                conn.set_timeouts(read_ms, write_ms)?;
                conn.handle()
            });
            if let Err(e) = result {
                tracing::warn!("Connection ended with error: {}", e);
            }
        })
    }
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }
        // Wake the blocking accept so the loop observes the flag
        let mut addr = self.addr;
        if addr.ip().is_unspecified() {
            let loopback: IpAddr = match addr {
                SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
            };
            addr.set_ip(loopback);
        }
        if let Err(e) = TcpStream::connect(addr) {
            tracing::debug!("Wake-up connection to {} failed: {}", addr, e);
        }
    }
}
