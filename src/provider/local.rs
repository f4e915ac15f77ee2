use std::fmt;
use std::sync::Arc;

use jsonrpc_core::{BoxFuture, MetaIoHandler, Request, Response};
use tracing_subscriber::filter::LevelFilter;

use super::Provider;
use crate::error::Result;
use crate::logging_middleware::{LoggingMiddleware, Meta};
use crate::namespaces::AccountNamespaceT;

/// Provider that dispatches into an in-process handler instead of a socket.
#[derive(Clone)]
pub struct LocalProvider {
    io: Arc<MetaIoHandler<Meta, LoggingMiddleware>>,
}

impl LocalProvider {
    pub fn new(io: MetaIoHandler<Meta, LoggingMiddleware>) -> Self {
        Self { io: Arc::new(io) }
    }

    /// Serves the account namespace implemented by `node`.
    pub fn serve<T: AccountNamespaceT>(node: T, log_level_filter: LevelFilter) -> Self {
        let mut io = MetaIoHandler::with_middleware(LoggingMiddleware::new(log_level_filter));
        io.extend_with(node.to_delegate());
        Self::new(io)
    }
}

impl fmt::Debug for LocalProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalProvider").finish_non_exhaustive()
    }
}

impl Provider for LocalProvider {
    fn send(&self, request: Request) -> BoxFuture<Result<Option<Response>>> {
        let io = self.io.clone();
        Box::pin(async move { Ok(io.handle_rpc_request(request, Meta::default()).await) })
    }
}
