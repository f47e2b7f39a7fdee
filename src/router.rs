//! Route table, navigation guard, and the reactive navigator.
//!
//! DESIGN
//! ======
//! Every route declares whether it requires an authenticated session; the
//! guard runs on every navigation attempt and reads persisted storage
//! directly, so it is correct even before the session store has hydrated.
//! The navigator holds the current route behind a watch channel so views can
//! observe changes instead of polling.

use std::sync::Arc;

use tokio::sync::watch;

use crate::storage::{ACCESS_TOKEN_KEY, Storage, USER_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Accounts { organization_id: String },
    Transactions { organization_id: String },
    Reports { organization_id: String },
}

impl Route {
    /// Whether this route requires an authenticated session. Defaults to
    /// true; only the credential-submission routes are anonymous.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_owned(),
            Route::Register => "/register".to_owned(),
            Route::Home => "/".to_owned(),
            Route::Accounts { organization_id } => {
                format!("/organizations/{organization_id}/accounts")
            }
            Route::Transactions { organization_id } => {
                format!("/organizations/{organization_id}/transactions")
            }
            Route::Reports { organization_id } => {
                format!("/organizations/{organization_id}/reports")
            }
        }
    }
}

/// A stored session is considered valid for guarding purposes when both the
/// access token and the user record are present.
fn has_stored_session(storage: &dyn Storage) -> bool {
    storage.get(ACCESS_TOKEN_KEY).is_some() && storage.get(USER_KEY).is_some()
}

/// Apply the navigation guard to a target route.
///
/// Unauthenticated access to a protected route lands on login; authenticated
/// access to an anonymous route lands on home; everything else passes.
#[must_use]
pub fn resolve(target: Route, storage: &dyn Storage) -> Route {
    let authenticated = has_stored_session(storage);
    if target.requires_auth() && !authenticated {
        Route::Login
    } else if !target.requires_auth() && authenticated {
        Route::Home
    } else {
        target
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Reactive current-route holder shared across stores and the HTTP wrapper.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

struct NavigatorInner {
    storage: Arc<dyn Storage>,
    current: watch::Sender<Route>,
}

impl Navigator {
    /// Start at home, guard applied (so an unauthenticated start lands on
    /// login).
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let start = resolve(Route::Home, storage.as_ref());
        let (current, _) = watch::channel(start);
        Self { inner: Arc::new(NavigatorInner { storage, current }) }
    }

    /// Navigate to `target`, returning the route actually landed on after the
    /// guard ran.
    pub fn push(&self, target: Route) -> Route {
        let resolved = resolve(target, self.inner.storage.as_ref());
        if *self.inner.current.borrow() != resolved {
            tracing::debug!(route = %resolved.path(), "navigating");
        }
        self.inner.current.send_replace(resolved.clone());
        resolved
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.inner.current.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.inner.current.subscribe()
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
