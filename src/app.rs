//! Application composition root.
//!
//! Builds the shared storage, navigator, HTTP client, and stores in the
//! order a page boot runs them, and exposes the startup sequence the
//! front-end shell calls once per page load.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::net::client::ApiClient;
use crate::router::Navigator;
use crate::state::auth::AuthStore;
use crate::state::organizations::OrganizationsStore;
use crate::state::tabs::TabsStore;
use crate::storage::Storage;

pub struct App {
    pub storage: Arc<dyn Storage>,
    pub navigator: Navigator,
    pub client: ApiClient,
    pub auth: AuthStore,
    pub organizations: OrganizationsStore,
    pub tabs: TabsStore,
}

impl App {
    pub fn new(config: &ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let navigator = Navigator::new(storage.clone());
        let client = ApiClient::new(config, storage.clone(), navigator.clone())?;
        let auth = AuthStore::new(client.clone(), storage.clone(), navigator.clone());
        let organizations = OrganizationsStore::new(client.clone(), storage.clone());
        let tabs = TabsStore::new();
        Ok(Self { storage, navigator, client, auth, organizations, tabs })
    }

    /// Page-boot sequence: hydrate the session, then load organizations for
    /// an authenticated user. A failed organization load is reported but
    /// never blocks startup.
    pub async fn init(&self) {
        self.auth.init();
        if self.auth.is_authenticated() {
            if let Err(err) = self.organizations.load().await {
                tracing::error!(error = %err, "failed to load organizations on init");
            }
        }
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
