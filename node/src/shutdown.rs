//! Shutdown signalling.
//!
//! A [`ShutdownController`] fans a single stop request out to every part
//! of the server that needs to wind down: the HTTP listener drains via
//! `with_graceful_shutdown`, and the node then writes its checkpoint.
//! The request can come from an OS signal or from code (tests).

use tokio::signal;
use tokio::sync::broadcast;

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        // Capacity 1: the only message ever sent is the stop request.
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Request shutdown. Idempotent; resolves every pending
    /// [`signalled`](Self::signalled) future.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// A future that completes once shutdown has been requested. Shaped
    /// for `axum::serve(..).with_graceful_shutdown`.
    pub fn signalled(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            // A RecvError means the controller was dropped, which also
            // counts as shutdown.
            let _ = rx.recv().await;
        }
    }

    /// Block until SIGINT or SIGTERM arrives, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
            _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        }

        self.trigger();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_resolves_signalled_future() {
        let controller = ShutdownController::new();
        let fut = controller.signalled();
        controller.trigger();
        fut.await;
    }

    #[tokio::test]
    async fn all_pending_futures_resolve() {
        let controller = ShutdownController::new();
        let first = controller.signalled();
        let second = controller.signalled();
        controller.trigger();
        first.await;
        second.await;
    }

    #[tokio::test]
    async fn futures_taken_after_trigger_still_resolve() {
        let controller = ShutdownController::new();
        let early = controller.signalled();
        controller.trigger();
        early.await;
        // A second trigger wakes subscribers that joined late.
        let late = controller.signalled();
        controller.trigger();
        late.await;
    }
}
