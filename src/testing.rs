//! This file hold testing helpers for other unit tests.
//!
//! There is MockServer that can help simulate a node answering account calls.
//!

#![cfg(test)]

use httptest::{
    matchers::{eq, json_decoded, request},
    responders::{json_encoded, status_code},
    Expectation, Server,
};
use jsonrpc_core::{
    BoxFuture, Call, MethodCall, Output, Params, Request, Response, Success, Version,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::provider::Provider;

/// A HTTP server that can be used to mock a node.
pub struct MockServer {
    /// The implementation for [httptest::Server].
    pub inner: Server,
}

impl MockServer {
    /// Start the mock server.
    pub fn run() -> Self {
        MockServer {
            inner: Server::run(),
        }
    }

    /// URL the node is reachable at.
    pub fn url(&self) -> String {
        self.inner.url_str("/")
    }

    /// Expect exactly one call of `method` with `params` and answer it with `result`.
    pub fn expect_call(&self, id: u64, method: &str, params: Value, result: Value) {
        self.inner.expect(
            Expectation::matching(request::body(json_decoded(eq(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            })))))
            .respond_with(json_encoded(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result,
            }))),
        );
    }

    /// Expect exactly one call of `method` with `params` and answer it with an error.
    pub fn expect_error(&self, id: u64, method: &str, params: Value, code: i64, message: &str) {
        self.inner.expect(
            Expectation::matching(request::body(json_decoded(eq(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            })))))
            .respond_with(json_encoded(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": code,
                    "message": message,
                },
            }))),
        );
    }

    /// Expect exactly one batch matching `batch` and answer it with `response`.
    pub fn expect_batch(&self, batch: Value, response: Value) {
        self.inner.expect(
            Expectation::matching(request::body(json_decoded(eq(batch))))
                .respond_with(json_encoded(response)),
        );
    }

    /// Answer the next POST with a bare status code.
    pub fn expect_status(&self, code: u16) {
        self.inner.expect(
            Expectation::matching(request::method_path("POST", "/"))
                .respond_with(status_code(code)),
        );
    }

    /// Answer the next POST with `body` verbatim.
    pub fn expect_raw_body(&self, body: &'static str) {
        self.inner.expect(
            Expectation::matching(request::method_path("POST", "/"))
                .respond_with(status_code(200).body(body)),
        );
    }
}

/// Records every call it receives and answers each through `reply`.
#[derive(Debug, Clone)]
pub struct RecordingProvider {
    calls: Arc<Mutex<Vec<MethodCall>>>,
    reply: fn(&MethodCall) -> Output,
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self::replying(echo)
    }
}

impl RecordingProvider {
    /// Provider answering every call with `{"method": .., "params": ..}`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: fn(&MethodCall) -> Output) -> Self {
        Self {
            calls: Default::default(),
            reply,
        }
    }

    /// Calls received so far, in arrival order.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.calls.lock().expect("poisoned").clone()
    }

    fn record(&self, call: MethodCall) -> Output {
        let output = (self.reply)(&call);
        self.calls.lock().expect("poisoned").push(call);
        output
    }
}

impl Provider for RecordingProvider {
    fn send(&self, request: Request) -> BoxFuture<Result<Option<Response>>> {
        let response = match request {
            Request::Single(Call::MethodCall(call)) => Some(Response::Single(self.record(call))),
            Request::Batch(calls) => Some(Response::Batch(
                calls
                    .into_iter()
                    .filter_map(|call| match call {
                        Call::MethodCall(call) => Some(self.record(call)),
                        _ => None,
                    })
                    .collect(),
            )),
            _ => None,
        };
        Box::pin(async move { Ok(response) })
    }
}

/// Answers every request with the same prepared response.
#[derive(Debug, Clone)]
pub struct CannedProvider {
    response: Option<Response>,
}

impl CannedProvider {
    pub fn new(response: Option<Response>) -> Self {
        Self { response }
    }
}

impl Provider for CannedProvider {
    fn send(&self, _: Request) -> BoxFuture<Result<Option<Response>>> {
        let response = self.response.clone();
        Box::pin(async move { Ok(response) })
    }
}

/// Echoes the remote call and its params back as the result.
pub fn echo(call: &MethodCall) -> Output {
    let params = match &call.params {
        Params::Array(values) => Value::Array(values.clone()),
        _ => Value::Null,
    };
    Output::Success(Success {
        jsonrpc: Some(Version::V2),
        result: serde_json::json!({ "method": call.method, "params": params }),
        id: call.id.clone(),
    })
}
