//! Network messages - communication between App and Network layers

use crate::app::dispatch::PendingDispatch;
use crate::error::TransportError;
use crate::models::Response;

/// Commands sent from App layer to Network layer
#[derive(Debug)]
pub enum NetworkCommand {
    /// Run a validated dispatch
    Dispatch(PendingDispatch),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The transport resolved, successfully or not
    Completed {
        id: u64,
        result: Result<Response, TransportError>,
    },
}

impl NetworkResponse {
    /// Get the dispatch ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
        }
    }
}
