use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};

use colored::Colorize;
use jsonrpc_core::{Call, Id, MethodCall, Output, Params, Request, Response, Version};
use serde_json::Value;

use crate::error::{RequestError, Result};
use crate::provider::Provider;

/// Anything that can hand out the shared [RequestManager].
pub trait HasRequestManager {
    fn request_manager(&self) -> &RequestManager;
}

/// Shared dispatcher for all bound methods.
///
/// Clones share the provider slot and the id counter, so swapping the provider
/// on one clone is visible to every method bound to it.
#[derive(Clone)]
pub struct RequestManager {
    inner: Arc<RequestManagerInner>,
}

struct RequestManagerInner {
    provider: RwLock<Option<Arc<dyn Provider>>>,
    next_id: AtomicU64,
}

impl RequestManager {
    pub fn new<P: Provider + 'static>(provider: P) -> Self {
        Self::with_provider(Some(Arc::new(provider)))
    }

    /// A manager that fails every call with [RequestError::NoProvider] until
    /// [RequestManager::set_provider] is called.
    pub fn without_provider() -> Self {
        Self::with_provider(None)
    }

    fn with_provider(provider: Option<Arc<dyn Provider>>) -> Self {
        Self {
            inner: Arc::new(RequestManagerInner {
                provider: RwLock::new(provider),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn set_provider<P: Provider + 'static>(&self, provider: P) {
        self.replace_provider(Some(Arc::new(provider)));
    }

    pub fn reset_provider(&self) {
        self.replace_provider(None);
    }

    fn replace_provider(&self, provider: Option<Arc<dyn Provider>>) {
        match self.inner.provider.write() {
            Ok(mut guard) => *guard = provider,
            Err(err) => tracing::error!("failed acquiring provider lock: {:?}", err),
        }
    }

    pub fn provider(&self) -> Option<Arc<dyn Provider>> {
        self.inner
            .provider
            .read()
            .map_err(|err| tracing::error!("failed acquiring provider lock: {:?}", err))
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Returns true when both handles dispatch through the same manager.
    pub fn same_as(&self, other: &RequestManager) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn next_call(&self, method: &str, params: Vec<Value>) -> MethodCall {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        MethodCall {
            jsonrpc: Some(Version::V2),
            method: method.to_string(),
            params: Params::Array(params),
            id: Id::Num(id),
        }
    }

    /// Sends a single call and returns its result.
    pub async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let provider = self.provider().ok_or(RequestError::NoProvider)?;
        let call = self.next_call(method, params);
        let id = call.id.clone();

        tracing::debug!("{} dispatched as {:?}", method.cyan(), id);
        let response = provider
            .send(Request::Single(Call::MethodCall(call)))
            .await?;
        tracing::trace!("response for {:?} => {:?}", id, response);

        match response {
            Some(Response::Single(output)) => decode_output(output, &id),
            Some(Response::Batch(_)) => Err(RequestError::InvalidResponse(
                "expected a single response, got a batch".to_string(),
            )),
            None => Err(RequestError::InvalidResponse("empty response".to_string())),
        }
    }

    /// Sends all calls as one batch. Results come back in request order.
    pub async fn send_batch(&self, calls: Vec<(String, Vec<Value>)>) -> Result<Vec<Result<Value>>> {
        if calls.is_empty() {
            return Ok(vec![]);
        }
        let provider = self.provider().ok_or(RequestError::NoProvider)?;

        let calls: Vec<MethodCall> = calls
            .into_iter()
            .map(|(method, params)| self.next_call(&method, params))
            .collect();
        let ids: Vec<Id> = calls.iter().map(|call| call.id.clone()).collect();

        tracing::debug!("batch of {} calls dispatched", calls.len());
        let response = provider
            .send(Request::Batch(calls.into_iter().map(Call::MethodCall).collect()))
            .await?;

        let mut outputs = match response {
            Some(Response::Batch(outputs)) => outputs,
            // A node rejecting the whole batch answers with a single error.
            Some(Response::Single(Output::Failure(failure))) => {
                return Err(RequestError::Rpc(failure.error))
            }
            Some(Response::Single(_)) => {
                return Err(RequestError::InvalidResponse(
                    "expected a batch response, got a single one".to_string(),
                ))
            }
            None => return Err(RequestError::InvalidResponse("empty response".to_string())),
        };

        Ok(ids
            .iter()
            .map(|id| {
                match outputs.iter().position(|output| output.id() == id) {
                    Some(index) => decode_output(outputs.swap_remove(index), id),
                    None => Err(RequestError::InvalidResponse(format!(
                        "missing response for {:?}",
                        id
                    ))),
                }
            })
            .collect())
    }
}

impl HasRequestManager for RequestManager {
    fn request_manager(&self) -> &RequestManager {
        self
    }
}

impl fmt::Debug for RequestManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestManager")
            .field("provider", &self.provider())
            .field("next_id", &self.inner.next_id.load(Ordering::SeqCst))
            .finish()
    }
}

fn decode_output(output: Output, expected_id: &Id) -> Result<Value> {
    if output.id() != expected_id {
        return Err(RequestError::InvalidResponse(format!(
            "response id {:?} does not match request id {:?}",
            output.id(),
            expected_id
        )));
    }

    let versioned = match &output {
        Output::Success(success) => success.jsonrpc == Some(Version::V2),
        Output::Failure(failure) => failure.jsonrpc == Some(Version::V2),
    };
    if !versioned {
        return Err(RequestError::InvalidResponse(
            "missing jsonrpc version".to_string(),
        ));
    }

    match output {
        Output::Success(success) => Ok(success.result),
        Output::Failure(failure) => Err(RequestError::Rpc(failure.error)),
    }
}
