//! Generic definition of a remote method and the callable it binds to.
use std::fmt;

use serde_json::Value;

use crate::error::{RequestError, Result};
use crate::formatters::{InputFormatter, OutputFormatter};
use crate::request_manager::RequestManager;

/// Static description of a remote method, as written in a namespace catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: &'static str,
    pub remote_call: &'static str,
    pub param_count: usize,
}

impl MethodDescriptor {
    pub const fn new(name: &'static str, remote_call: &'static str, param_count: usize) -> Self {
        Self {
            name,
            remote_call,
            param_count,
        }
    }
}

impl From<&MethodDescriptor> for Method {
    fn from(descriptor: &MethodDescriptor) -> Self {
        Method::new(descriptor.name, descriptor.remote_call, descriptor.param_count)
    }
}

/// A remote method: the member name callers see, the remote call it maps to and
/// the exact number of positional arguments it takes.
#[derive(Clone)]
pub struct Method {
    name: &'static str,
    call: &'static str,
    params: usize,
    input_formatters: Vec<Option<InputFormatter>>,
    output_formatter: Option<OutputFormatter>,
}

impl Method {
    pub fn new(name: &'static str, call: &'static str, params: usize) -> Self {
        Self {
            name,
            call,
            params,
            input_formatters: vec![],
            output_formatter: None,
        }
    }

    /// Formatters applied positionally; `None` leaves that argument as is.
    pub fn with_input_formatters(mut self, formatters: Vec<Option<InputFormatter>>) -> Self {
        self.input_formatters = formatters;
        self
    }

    pub fn with_output_formatter(mut self, formatter: OutputFormatter) -> Self {
        self.output_formatter = Some(formatter);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self) -> &'static str {
        self.call
    }

    pub fn params(&self) -> usize {
        self.params
    }

    pub fn validate_args(&self, args: &[Value]) -> Result<()> {
        if args.len() != self.params {
            return Err(RequestError::InvalidNumberOfParams {
                method: self.call.to_string(),
                got: args.len(),
                expected: self.params,
            });
        }
        Ok(())
    }

    pub fn format_input(&self, args: Vec<Value>) -> Result<Vec<Value>> {
        args.into_iter()
            .enumerate()
            .map(|(index, arg)| match self.input_formatters.get(index) {
                Some(Some(formatter)) => formatter(index, arg),
                _ => Ok(arg),
            })
            .collect()
    }

    pub fn format_output(&self, result: Value) -> Result<Value> {
        match self.output_formatter {
            Some(formatter) => formatter(result),
            None => Ok(result),
        }
    }

    /// Validates and formats `args`, yielding the remote call and its params.
    pub fn to_payload(&self, args: Vec<Value>) -> Result<(&'static str, Vec<Value>)> {
        self.validate_args(&args)?;
        Ok((self.call, self.format_input(args)?))
    }

    /// Materializes the callable for this method, routed through `request_manager`.
    pub fn bind(self, request_manager: RequestManager) -> BoundMethod {
        BoundMethod {
            method: self,
            request_manager,
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("call", &self.call)
            .field("params", &self.params)
            .finish()
    }
}

/// A [Method] installed on a namespace, together with the manager it sends through.
#[derive(Clone, Debug)]
pub struct BoundMethod {
    method: Method,
    request_manager: RequestManager,
}

impl BoundMethod {
    pub fn name(&self) -> &'static str {
        self.method.name()
    }

    pub fn remote_call(&self) -> &'static str {
        self.method.call()
    }

    pub fn param_count(&self) -> usize {
        self.method.params()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn request_manager(&self) -> &RequestManager {
        &self.request_manager
    }

    /// Reroutes this callable only; other callables keep their manager.
    pub fn set_request_manager(&mut self, request_manager: RequestManager) {
        self.request_manager = request_manager;
    }

    /// Calls the remote method with positional `args`.
    ///
    /// Nothing is sent when the argument count is wrong.
    pub async fn call(&self, args: Vec<Value>) -> Result<Value> {
        let (call, params) = self.method.to_payload(args)?;
        let result = self.request_manager.send(call, params).await?;
        self.method.format_output(result)
    }
}
