//! Client bindings for the `account` namespace of a drep node's JSON-RPC API.
//!
//! ```no_run
//! # async fn run() -> Result<(), drep_account_rpc::RequestError> {
//! use drep_account_rpc::Drep;
//! use serde_json::json;
//!
//! let drep = Drep::http("http://127.0.0.1:15645")?;
//! let price = drep.account.gas_price.call(vec![]).await?;
//! let tx = drep
//!     .account
//!     .transfer
//!     .call(vec![json!("0xfrom"), json!("0xto"), json!("0x64")])
//!     .await?;
//! # let _ = (price, tx);
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod logging_middleware;
pub mod method;
pub mod namespaces;
pub mod observability;
pub mod provider;
pub mod request_manager;
mod testing;

pub use client::Drep;
pub use error::RequestError;
pub use method::{BoundMethod, Method, MethodDescriptor};
pub use request_manager::{HasRequestManager, RequestManager};
