//! Organization context store.
//!
//! Tracks the organizations visible to the current session and which one is
//! active for organization-scoped calls. The selection persists across
//! restarts independently of the session; it must always reference an id
//! present in the last-loaded list, else it is reset (and the first entry
//! auto-selected when one exists).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ApiError;
use crate::net::client::ApiClient;
use crate::net::organizations::{self as organizations_api, CreateOrganization, Organization};
use crate::storage::{CURRENT_ORGANIZATION_KEY, Storage};

#[derive(Clone)]
pub struct OrganizationsStore {
    inner: Arc<Mutex<OrganizationsInner>>,
    storage: Arc<dyn Storage>,
    client: ApiClient,
}

struct OrganizationsInner {
    organizations: Vec<Organization>,
    current_id: Option<String>,
}

impl OrganizationsStore {
    /// The persisted selection hydrates immediately; the list arrives with
    /// the first `load`.
    #[must_use]
    pub fn new(client: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let current_id = storage.get(CURRENT_ORGANIZATION_KEY);
        Self {
            inner: Arc::new(Mutex::new(OrganizationsInner { organizations: Vec::new(), current_id })),
            storage,
            client,
        }
    }

    /// Fetch the full list, replacing in-memory contents. A stale persisted
    /// selection is cleared; with no selection left and a non-empty list, the
    /// first entry becomes current.
    pub async fn load(&self) -> Result<(), ApiError> {
        let organizations = match organizations_api::get_all(&self.client).await {
            Ok(organizations) => organizations,
            Err(err) => {
                tracing::error!(error = %err, "failed to load organizations");
                return Err(err);
            }
        };

        let select_first = {
            let mut inner = self.lock();
            inner.organizations = organizations;
            if let Some(current) = inner.current_id.clone() {
                if !inner.organizations.iter().any(|org| org.id == current) {
                    inner.current_id = None;
                    self.storage.remove(CURRENT_ORGANIZATION_KEY);
                }
            }
            if inner.current_id.is_none() {
                inner.organizations.first().map(|org| org.id.clone())
            } else {
                None
            }
        };
        if let Some(id) = select_first {
            self.set_current(&id);
        }
        Ok(())
    }

    /// Create an organization, append it, and make it current.
    pub async fn create(&self, data: &CreateOrganization) -> Result<Organization, ApiError> {
        let organization = match organizations_api::create(&self.client, data).await {
            Ok(organization) => organization,
            Err(err) => {
                tracing::error!(error = %err, "failed to create organization");
                return Err(err);
            }
        };
        self.lock().organizations.push(organization.clone());
        self.set_current(&organization.id);
        Ok(organization)
    }

    /// Pure state + persistence mutation; membership is the caller's
    /// responsibility.
    pub fn set_current(&self, organization_id: &str) {
        self.lock().current_id = Some(organization_id.to_owned());
        self.storage.set(CURRENT_ORGANIZATION_KEY, organization_id);
    }

    pub fn clear_current(&self) {
        self.lock().current_id = None;
        self.storage.remove(CURRENT_ORGANIZATION_KEY);
    }

    #[must_use]
    pub fn current_id(&self) -> Option<String> {
        self.lock().current_id.clone()
    }

    /// The selected organization, `None` when unset or not in the loaded
    /// list.
    #[must_use]
    pub fn current(&self) -> Option<Organization> {
        let inner = self.lock();
        let current_id = inner.current_id.as_deref()?;
        inner.organizations.iter().find(|org| org.id == current_id).cloned()
    }

    #[must_use]
    pub fn organizations(&self) -> Vec<Organization> {
        self.lock().organizations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, OrganizationsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "organizations_test.rs"]
mod tests;
