//! Network actor - runs dispatches in the Tokio runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};

/// Network actor that executes pending dispatches off the app task
pub struct NetworkActor {
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Dispatch(pending)) => {
                            let response_tx = self.response_tx.clone();
                            // no cancellation: the task runs until the transport resolves
                            self.active_requests.spawn(async move {
                                let (id, result) = pending.execute().await;
                                let _ = response_tx.send(NetworkResponse::Completed { id, result });
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                    }
                }

                Some(result) = self.active_requests.join_next() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Dispatch task panicked");
                    }
                }
            }
        }
    }
}
