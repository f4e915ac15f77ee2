use crate::error::Result;
use crate::namespaces::AccountNamespace;
use crate::provider::{HttpProvider, Provider};
use crate::request_manager::{HasRequestManager, RequestManager};

/// Entry point for talking to a node: owns the shared request manager and the
/// namespaces installed on top of it.
#[derive(Debug, Clone)]
pub struct Drep {
    request_manager: RequestManager,
    pub account: AccountNamespace,
}

impl Drep {
    pub fn new<P: Provider + 'static>(provider: P) -> Self {
        Self::from_request_manager(RequestManager::new(provider))
    }

    /// Connects over HTTP to the node at `url`.
    pub fn http(url: impl Into<String>) -> Result<Self> {
        Ok(Self::new(HttpProvider::new(url)?))
    }

    pub fn from_request_manager(request_manager: RequestManager) -> Self {
        let account = AccountNamespace::new(&request_manager);
        Self {
            request_manager,
            account,
        }
    }

    /// Swaps the provider for every namespace built from this client.
    pub fn set_provider<P: Provider + 'static>(&self, provider: P) {
        self.request_manager.set_provider(provider);
    }
}

impl HasRequestManager for Drep {
    fn request_manager(&self) -> &RequestManager {
        &self.request_manager
    }
}
