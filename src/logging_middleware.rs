use colored::Colorize;
use futures::Future;
use futures::{future::Either, FutureExt};
use itertools::Itertools;
use jsonrpc_core::{
    middleware, Call, FutureResponse, Metadata, MethodCall, Middleware, Params, Request, Response,
};
use tracing_subscriber::filter::LevelFilter;

/// Params longer than this are truncated below `TRACE`.
const MAX_PARAM_LEN: usize = 70;

#[derive(Clone, Debug, Default)]
pub struct Meta();
impl Metadata for Meta {}

/// Logs every call dispatched into an in-process handler.
#[derive(Debug)]
pub struct LoggingMiddleware {
    log_level_filter: LevelFilter,
}

impl LoggingMiddleware {
    pub fn new(log_level_filter: LevelFilter) -> Self {
        Self { log_level_filter }
    }

    fn render_params(&self, params: &Params) -> String {
        let values = match params {
            Params::Array(values) if !values.is_empty() => values,
            _ => return String::default(),
        };

        if self.log_level_filter == LevelFilter::TRACE {
            format!("with [{}]", values.iter().join(", "))
        } else {
            format!(
                "with [{}]",
                values
                    .iter()
                    .map(|value| {
                        let s = value.to_string();
                        if s.len() > MAX_PARAM_LEN {
                            format!("{:.67}...", s)
                        } else {
                            s
                        }
                    })
                    .join(", ")
            )
        }
    }

    fn log_call(&self, method_call: &MethodCall) {
        let params = self.render_params(&method_call.params);
        if self.log_level_filter == LevelFilter::TRACE {
            tracing::trace!("{} was called {}", method_call.method.cyan(), params);
        } else {
            tracing::debug!("{} was called {}", method_call.method.cyan(), params);
        }
    }
}

impl Middleware<Meta> for LoggingMiddleware {
    type Future = FutureResponse;
    type CallFuture = middleware::NoopCallFuture;

    fn on_request<F, X>(&self, request: Request, meta: Meta, next: F) -> Either<Self::Future, X>
    where
        F: Fn(Request, Meta) -> X + Send + Sync,
        X: Future<Output = Option<Response>> + Send + 'static,
    {
        match &request {
            Request::Single(Call::MethodCall(method_call)) => self.log_call(method_call),
            Request::Batch(calls) => {
                tracing::debug!("batch of {} calls received", calls.len());
                calls.iter().for_each(|call| {
                    if let Call::MethodCall(method_call) = call {
                        self.log_call(method_call);
                    }
                });
            }
            _ => {}
        }

        Either::Left(Box::pin(next(request, meta).map(move |res| {
            tracing::trace!("local response => {:?}", res);
            res
        })))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_params_empty() {
        let middleware = LoggingMiddleware::new(LevelFilter::DEBUG);
        assert_eq!("", middleware.render_params(&Params::Array(vec![])));
        assert_eq!("", middleware.render_params(&Params::None));
    }

    #[test]
    fn test_render_params_truncates_below_trace() {
        let long = "a".repeat(100);
        let middleware = LoggingMiddleware::new(LevelFilter::DEBUG);
        let rendered = middleware.render_params(&Params::Array(vec![json!(long), json!(1)]));
        assert_eq!(format!("with [\"{}..., 1]", "a".repeat(66)), rendered);
    }

    #[test]
    fn test_render_params_full_at_trace() {
        let long = "b".repeat(100);
        let middleware = LoggingMiddleware::new(LevelFilter::TRACE);
        let rendered = middleware.render_params(&Params::Array(vec![json!(long.clone())]));
        assert_eq!(format!("with [\"{long}\"]"), rendered);
    }
}
