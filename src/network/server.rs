//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of workers.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::board::Board;
use crate::config::Config;
use crate::error::{BoardError, Result};
use crate::protocol::{write_response, Response};
use crate::store::Store;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL: Duration = Duration::from_millis(20);

/// TCP gateway for a board
pub struct Server<S: Store + 'static> {
    config: Config,
    board: Arc<Board<S>>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl<S: Store + 'static> Server<S> {
    /// Create a new server with the given config and board
    pub fn new(config: Config, board: Arc<Board<S>>) -> Self {
        Self {
            config,
            board,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listen address; returns the bound address
    ///
    /// `run` binds on its own if this was not called. Binding first lets
    /// callers learn the port when listening on `:0`.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        tracing::info!("Listening on {}", addr);
        Ok(addr)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = self
            .listener
            .take()
            .ok_or_else(|| BoardError::Config("listener not bound".to_string()))?;

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections.max(1));
        let workers: Vec<JoinHandle<()>> = (0..self.config.worker_threads.max(1))
            .map(|i| self.spawn_worker(i, receiver.clone()))
            .collect::<std::io::Result<_>>()?;
        drop(receiver);

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
                        tracing::warn!("Rejecting {}: connection limit reached", addr);
                        reject(stream);
                        continue;
                    }
                    stream.set_nonblocking(false)?;
                    self.active.fetch_add(1, Ordering::SeqCst);
                    if sender.send(stream).is_err() {
                        self.active.fetch_sub(1, Ordering::SeqCst);
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        tracing::info!("Shutting down, waiting for {} workers", workers.len());
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Connection worker panicked");
            }
        }
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Flag that stops the accept loop when set, for use from another thread
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Connections currently being served or queued
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn spawn_worker(&self, id: usize, receiver: Receiver<TcpStream>) -> std::io::Result<JoinHandle<()>> {
        let board = Arc::clone(&self.board);
        let active = Arc::clone(&self.active);
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        thread::Builder::new()
            .name(format!("ledgerboard-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    let served = Connection::new(stream, Arc::clone(&board)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = served {
                        tracing::debug!("Connection ended with error: {}", e);
                    }
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
    }
}

/// Tell an over-limit client why it is being dropped
fn reject(mut stream: TcpStream) {
    let _ = stream.set_nonblocking(false);
    let _ = write_response(&mut stream, &Response::error("connection limit reached"));
}
