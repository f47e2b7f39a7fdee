//! Auth session store.
//!
//! ARCHITECTURE
//! ============
//! Single authority for "am I logged in", session data, and refresh
//! scheduling. Login, register, and refresh all commit through one
//! set-session routine that persists the session and re-arms the proactive
//! refresh timer; the timer handle is an owned field, canceled before every
//! re-arm and on logout, so at most one timer is ever pending per store.
//!
//! FAILURE SEMANTICS
//! =================
//! Login/register errors propagate to the caller untouched. Scheduled
//! refresh failures always resolve to a full logout — never a silently
//! degraded session. A token whose expiry cannot be decoded only skips
//! scheduling; it must never take hydration down.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ApiError;
use crate::net::auth::{self as auth_api, AuthResponse, LoginRequest, RegisterRequest, User};
use crate::net::client::{ApiClient, TokenPair};
use crate::router::{Navigator, Route};
use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Storage, USER_KEY};
use crate::token;

/// Proactive refresh fires this long before the access token expires.
pub const DEFAULT_REFRESH_LEAD: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<Mutex<AuthInner>>,
    storage: Arc<dyn Storage>,
    client: ApiClient,
    navigator: Navigator,
    refresh_lead: Duration,
    authenticated: Arc<watch::Sender<bool>>,
}

#[derive(Default)]
struct AuthInner {
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    refresh_timer: Option<JoinHandle<()>>,
}

impl AuthStore {
    #[must_use]
    pub fn new(client: ApiClient, storage: Arc<dyn Storage>, navigator: Navigator) -> Self {
        Self::with_refresh_lead(client, storage, navigator, DEFAULT_REFRESH_LEAD)
    }

    #[must_use]
    pub fn with_refresh_lead(
        client: ApiClient,
        storage: Arc<dyn Storage>,
        navigator: Navigator,
        refresh_lead: Duration,
    ) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(AuthInner::default())),
            storage,
            client,
            navigator,
            refresh_lead,
            authenticated: Arc::new(authenticated),
        }
    }

    /// Hydrate the session from persisted storage.
    ///
    /// Requires both the access token and the user record; with either
    /// missing the store stays unauthenticated. No network traffic.
    pub fn init(&self) {
        let access_token = self.storage.get(ACCESS_TOKEN_KEY);
        let user = self
            .storage
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::warn!(error = %err, "stored user record is unreadable, ignoring");
                    None
                }
            });
        let (Some(access_token), Some(user)) = (access_token, user) else {
            return;
        };

        {
            let mut inner = self.lock();
            inner.refresh_token = self.storage.get(REFRESH_TOKEN_KEY);
            inner.access_token = Some(access_token.clone());
            inner.user = Some(user);
        }
        self.publish_authenticated();
        self.schedule_refresh(&access_token);
    }

    pub async fn login(&self, data: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response = auth_api::login(&self.client, data).await?;
        self.set_session(&response);
        Ok(response)
    }

    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let response = auth_api::register(&self.client, data).await?;
        self.set_session(&response);
        Ok(response)
    }

    /// Drop the session: cancel any pending refresh, clear memory and
    /// storage, land on the login route. Safe to call when already logged
    /// out.
    pub fn logout(&self) {
        {
            let mut inner = self.lock();
            if let Some(timer) = inner.refresh_timer.take() {
                timer.abort();
            }
            inner.user = None;
            inner.access_token = None;
            inner.refresh_token = None;
        }
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.storage.remove(USER_KEY);
        self.publish_authenticated();
        self.navigator.push(Route::Login);
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Observe authentication state changes.
    #[must_use]
    pub fn watch_authenticated(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    /// Whether a proactive refresh timer is currently armed.
    #[must_use]
    pub fn refresh_scheduled(&self) -> bool {
        self.lock().refresh_timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn set_session(&self, response: &AuthResponse) {
        {
            let mut inner = self.lock();
            inner.access_token = Some(response.access_token.clone());
            inner.refresh_token = Some(response.refresh_token.clone());
            inner.user = Some(response.user.clone());
        }
        self.storage.set(ACCESS_TOKEN_KEY, &response.access_token);
        self.storage.set(REFRESH_TOKEN_KEY, &response.refresh_token);
        match serde_json::to_string(&response.user) {
            Ok(raw) => self.storage.set(USER_KEY, &raw),
            Err(err) => tracing::warn!(error = %err, "user record serialization failed"),
        }
        self.publish_authenticated();
        self.schedule_refresh(&response.access_token);
    }

    /// Rotate tokens after a scheduled refresh, preserving the user record.
    fn apply_refresh(&self, pair: &TokenPair) {
        {
            let mut inner = self.lock();
            inner.access_token = Some(pair.access_token.clone());
            inner.refresh_token = Some(pair.refresh_token.clone());
        }
        self.storage.set(ACCESS_TOKEN_KEY, &pair.access_token);
        self.storage.set(REFRESH_TOKEN_KEY, &pair.refresh_token);
        self.publish_authenticated();
        self.schedule_refresh(&pair.access_token);
    }

    /// Cancel the pending timer and arm a new one from the token's expiry.
    ///
    /// An undecodable token or one already inside the refresh lead leaves no
    /// timer armed; the request-level 401 recovery covers those sessions.
    fn schedule_refresh(&self, access_token: &str) {
        if let Some(timer) = self.lock().refresh_timer.take() {
            timer.abort();
        }

        let expires_at = match token::expires_at(access_token) {
            Ok(expires_at) => expires_at,
            Err(err) => {
                tracing::warn!(error = %err, "cannot decode access token expiry, refresh not scheduled");
                return;
            }
        };
        let Some(delay) = token::refresh_delay(expires_at, Utc::now(), self.refresh_lead) else {
            tracing::debug!(%expires_at, "access token expires within the refresh lead, refresh not scheduled");
            return;
        };

        tracing::debug!(%expires_at, delay_secs = delay.as_secs(), "refresh timer armed");
        let store = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.run_scheduled_refresh().await;
        });
        self.lock().refresh_timer = Some(timer);
    }

    async fn run_scheduled_refresh(&self) {
        // Read the live refresh token from storage, not the in-memory copy:
        // the request-level recovery path may have rotated it since this
        // timer was armed.
        let Some(refresh_token) = self.storage.get(REFRESH_TOKEN_KEY) else {
            tracing::warn!("refresh timer fired without a stored refresh token, logging out");
            self.logout();
            return;
        };
        match auth_api::refresh(&self.client, &refresh_token).await {
            Ok(pair) => {
                tracing::info!("access token refreshed ahead of expiry");
                // apply_refresh aborts the stored handle, i.e. this task;
                // abort only lands at an await point and none remain here.
                self.apply_refresh(&pair);
            }
            Err(err) => {
                tracing::warn!(error = %err, "scheduled refresh failed, logging out");
                self.logout();
            }
        }
    }

    fn publish_authenticated(&self) {
        let authenticated = {
            let inner = self.lock();
            inner.access_token.is_some() && inner.user.is_some()
        };
        self.authenticated.send_replace(authenticated);
    }

    fn lock(&self) -> MutexGuard<'_, AuthInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
