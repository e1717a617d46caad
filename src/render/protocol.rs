//! Protocol definitions shared between the poll loop and the fetch worker.

use crate::error::LttviewError;

/// Identifier attached to cross-thread requests so responses can be correlated.
pub type RequestId = u64;

/// Commands sent from the poll loop to the fetch worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCommand {
    /// Pull whatever records arrived since the previous poll.
    Poll { request_id: RequestId },
    /// Release the source and stop.
    Shutdown,
}

/// Responses emitted by the fetch worker.
#[derive(Debug)]
pub enum FetchResponse {
    /// Raw records in arrival order; empty when nothing new arrived.
    Batch {
        request_id: RequestId,
        records: Vec<String>,
        /// The source will produce nothing further.
        exhausted: bool,
    },
    Failed {
        request_id: RequestId,
        error: LttviewError,
    },
    /// The source has been released; the worker exits after sending this.
    Released,
}

impl FetchResponse {
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            FetchResponse::Batch { request_id, .. } | FetchResponse::Failed { request_id, .. } => {
                Some(*request_id)
            }
            FetchResponse::Released => None,
        }
    }
}
