mod account;

pub use account::{methods, AccountNamespace, AccountNamespaceT, ACCOUNT_METHODS};

pub type Result<T> = jsonrpc_core::Result<T>;
