use super::state::MatchmakingState;
use crate::config::Config;
use crate::game::connection::run_connection;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

/// Failures that stop the whole server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Listener(#[source] io::Error),
}

/// Accept loop: seats connections in pairs and runs a handler per connection,
/// never more than `max_handlers` at once.
pub struct Server {
    listener: TcpListener,
    state: Arc<MatchmakingState>,
    budget: Arc<Semaphore>,
    max_handlers: usize,
}

impl Server {
    pub fn new(listener: TcpListener, config: &Config) -> Self {
        Self {
            listener,
            state: Arc::new(MatchmakingState::new()),
            budget: Arc::new(Semaphore::new(config.max_handlers)),
            max_handlers: config.max_handlers,
        }
    }

    pub async fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        Ok(Self::new(listener, config))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<MatchmakingState> {
        self.state.clone()
    }

    /// Run until accepting fails. Per-connection failures never end the loop.
    pub async fn run(self) -> Result<(), ServerError> {
        info!(
            addr = ?self.listener.local_addr().ok(),
            max_handlers = self.max_handlers,
            "Accepting connections"
        );

        loop {
            // Surplus connections wait in the backlog until a handler exits
            let Ok(permit) = self.budget.clone().acquire_owned().await else {
                return Ok(());
            };

            let (stream, peer) = self.listener.accept().await.map_err(ServerError::Listener)?;

            let (tx, rx) = mpsc::unbounded_channel();
            let seat = self.state.admit(tx);
            debug!(%peer, game_id = seat.game.id(), mark = %seat.mark, "Accepted connection");

            let state = self.state.clone();
            tokio::spawn(async move {
                run_connection(stream, state, seat, rx).await;
                drop(permit);
            });
        }
    }
}
