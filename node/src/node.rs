//! The node itself: economy state plus the HTTP API, with checkpoint
//! hydration at startup and persistence at shutdown.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use webcash_ledger::EconomyState;
use webcash_rpc::{api_router, ApiContext};
use webcash_types::Timestamp;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::persist;
use crate::shutdown::ShutdownController;

pub struct WebcashNode {
    config: NodeConfig,
    context: Arc<ApiContext>,
    shutdown: Arc<ShutdownController>,
}

impl WebcashNode {
    /// Build a node from configuration, hydrating the economy from the
    /// data directory's checkpoint when one exists.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let economy = match persist::load_checkpoint(&config.data_dir)? {
            Some(checkpoint) => {
                info!(
                    reports = checkpoint.num_reports,
                    difficulty = checkpoint.difficulty,
                    "resuming from checkpoint"
                );
                EconomyState::from_checkpoint(config.economy.clone(), checkpoint)
            }
            None => {
                info!("starting a fresh economy");
                EconomyState::new(config.economy.clone(), Timestamp::now())
            }
        };
        Ok(Self {
            config,
            context: Arc::new(ApiContext::new(Arc::new(economy))),
            shutdown: Arc::new(ShutdownController::new()),
        })
    }

    pub fn economy(&self) -> &Arc<EconomyState> {
        &self.context.economy
    }

    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// The full API router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        api_router(Arc::clone(&self.context))
    }

    /// Serve the API until shutdown is triggered, then persist the
    /// checkpoint.
    pub async fn run(&self) -> Result<(), NodeError> {
        let addr = format!("{}:{}", self.config.listen_addr, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, "webcash server listening");

        let signal_waiter = {
            let shutdown = Arc::clone(&self.shutdown);
            tokio::spawn(async move { shutdown.wait_for_signal().await })
        };

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(self.shutdown.signalled())
            .await;
        signal_waiter.abort();

        // Counters accepted during the session are persisted even when
        // the server loop itself failed.
        self.persist()?;
        served?;
        info!("node stopped");
        Ok(())
    }

    /// Write the current counters to the data directory.
    pub fn persist(&self) -> Result<(), NodeError> {
        let checkpoint = self.context.economy.checkpoint();
        persist::save_checkpoint(&self.config.data_dir, &checkpoint)?;
        info!(
            reports = checkpoint.num_reports,
            difficulty = checkpoint.difficulty,
            "checkpoint persisted"
        );
        Ok(())
    }
}
