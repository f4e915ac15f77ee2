//! Transports that carry JSON-RPC envelopes to a node.
use std::fmt::Debug;

use jsonrpc_core::{BoxFuture, Request, Response};

use crate::error::Result;

mod http;
mod local;

pub use http::{HttpProvider, DEFAULT_RPC_URL};
pub use local::LocalProvider;

/// Delivers a serialized request and hands back the node's reply.
///
/// `Ok(None)` means the node accepted the request without answering, which
/// only happens for notifications.
pub trait Provider: Debug + Send + Sync {
    fn send(&self, request: Request) -> BoxFuture<Result<Option<Response>>>;
}
