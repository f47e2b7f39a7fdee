use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::storage::MemoryStorage;

fn make_token(expires_in_secs: i64) -> String {
    #[derive(serde::Serialize)]
    struct TestClaims {
        sub: &'static str,
        exp: i64,
    }
    jsonwebtoken::encode(
        &Header::default(),
        &TestClaims { sub: "u1", exp: Utc::now().timestamp() + expires_in_secs },
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

fn user_json() -> Value {
    json!({"id": "u1", "email": "ada@example.com", "firstName": "Ada"})
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn store_with(base_url: &str, storage: Arc<MemoryStorage>, lead: Duration) -> (AuthStore, Navigator) {
    let storage: Arc<dyn Storage> = storage;
    let navigator = Navigator::new(storage.clone());
    let client = ApiClient::new(&ClientConfig::with_base_url(base_url), storage.clone(), navigator.clone())
        .unwrap();
    let store = AuthStore::with_refresh_lead(client, storage, navigator.clone(), lead);
    (store, navigator)
}

/// Stub login endpoint handing out the given token pairs call by call
/// (the last pair repeats).
fn login_route(tokens: Vec<(String, String)>) -> Router {
    let calls = Arc::new(AtomicUsize::new(0));
    Router::new().route(
        "/auth/login",
        post(move |Json(_body): Json<Value>| {
            let calls = calls.clone();
            let tokens = tokens.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst).min(tokens.len() - 1);
                let (access, refresh) = tokens[n].clone();
                Json(json!({"accessToken": access, "refreshToken": refresh, "user": user_json()}))
            }
        }),
    )
}

/// Stub refresh endpoint recording every refresh token it receives.
fn refresh_ok_route(
    received: Arc<Mutex<Vec<String>>>,
    access: String,
    refresh: String,
) -> Router {
    Router::new().route(
        "/auth/refresh",
        post(move |Json(body): Json<Value>| {
            let received = received.clone();
            let access = access.clone();
            let refresh = refresh.clone();
            async move {
                let sent = body["refreshToken"].as_str().unwrap_or_default().to_owned();
                received.lock().unwrap().push(sent);
                (StatusCode::OK, Json(json!({"accessToken": access, "refreshToken": refresh})))
            }
        }),
    )
}

fn refresh_fail_route(received: Arc<Mutex<Vec<String>>>) -> Router {
    Router::new().route(
        "/auth/refresh",
        post(move |Json(body): Json<Value>| {
            let received = received.clone();
            async move {
                let sent = body["refreshToken"].as_str().unwrap_or_default().to_owned();
                received.lock().unwrap().push(sent);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})))
            }
        }),
    )
}

// Points at nothing; tests that must not touch the network use it.
const DEAD_BASE: &str = "http://127.0.0.1:9";

// =============================================================================
// init
// =============================================================================

#[tokio::test]
async fn init_without_stored_session_is_unauthenticated() {
    let (store, _) = store_with(DEAD_BASE, Arc::new(MemoryStorage::new()), DEFAULT_REFRESH_LEAD);
    store.init();
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn init_with_stored_session_is_authenticated_without_network() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, "opaque-token");
    storage.set(USER_KEY, &user_json().to_string());
    let (store, _) = store_with(DEAD_BASE, storage, DEFAULT_REFRESH_LEAD);

    store.init();

    assert!(store.is_authenticated());
    assert_eq!(store.user().unwrap().id, "u1");
    // Undecodable token: hydration survives, scheduling is skipped.
    assert!(!store.refresh_scheduled());
}

#[tokio::test]
async fn init_with_token_only_stays_unauthenticated() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, "opaque-token");
    let (store, _) = store_with(DEAD_BASE, storage, DEFAULT_REFRESH_LEAD);
    store.init();
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn init_with_user_only_stays_unauthenticated() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(USER_KEY, &user_json().to_string());
    let (store, _) = store_with(DEAD_BASE, storage, DEFAULT_REFRESH_LEAD);
    store.init();
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn init_with_unreadable_user_stays_unauthenticated() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, "opaque-token");
    storage.set(USER_KEY, "not json");
    let (store, _) = store_with(DEAD_BASE, storage, DEFAULT_REFRESH_LEAD);
    store.init();
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn init_schedules_refresh_for_decodable_token() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, &make_token(3600));
    storage.set(REFRESH_TOKEN_KEY, "refresh-1");
    storage.set(USER_KEY, &user_json().to_string());
    let (store, _) = store_with(DEAD_BASE, storage, DEFAULT_REFRESH_LEAD);

    store.init();

    assert!(store.is_authenticated());
    assert!(store.refresh_scheduled());
}

#[tokio::test]
async fn init_skips_timer_when_token_expires_within_lead() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, &make_token(60));
    storage.set(USER_KEY, &user_json().to_string());
    let (store, _) = store_with(DEAD_BASE, storage, DEFAULT_REFRESH_LEAD);

    store.init();

    assert!(store.is_authenticated());
    assert!(!store.refresh_scheduled());
}

// =============================================================================
// login / register / logout
// =============================================================================

#[tokio::test]
async fn login_commits_session() {
    let access = make_token(3600);
    let base = serve(login_route(vec![(access.clone(), "refresh-1".to_owned())])).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, _) = store_with(&base, storage.clone(), DEFAULT_REFRESH_LEAD);

    let response = store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();

    assert_eq!(response.user.id, "u1");
    assert!(store.is_authenticated());
    assert!(store.refresh_scheduled());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), Some(access));
    assert_eq!(storage.get(REFRESH_TOKEN_KEY), Some("refresh-1".to_owned()));
    let stored_user: User = serde_json::from_str(&storage.get(USER_KEY).unwrap()).unwrap();
    assert_eq!(stored_user.first_name.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn login_failure_propagates_unchanged() {
    let app = Router::new().route(
        "/auth/login",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"}))) }),
    );
    let base = serve(app).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, _) = store_with(&base, storage.clone(), DEFAULT_REFRESH_LEAD);

    let err = store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "bad".to_owned() })
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert_eq!(err.display_message(), "Invalid credentials");
    assert!(!store.is_authenticated());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn register_commits_session() {
    let access = make_token(3600);
    let app = Router::new().route(
        "/auth/register",
        post(move || {
            let access = access.clone();
            async move {
                Json(json!({"accessToken": access, "refreshToken": "refresh-1", "user": user_json()}))
            }
        }),
    );
    let base = serve(app).await;
    let (store, _) = store_with(&base, Arc::new(MemoryStorage::new()), DEFAULT_REFRESH_LEAD);

    store
        .register(&RegisterRequest {
            email: "ada@example.com".to_owned(),
            password: "pw".to_owned(),
            first_name: Some("Ada".to_owned()),
            last_name: None,
        })
        .await
        .unwrap();

    assert!(store.is_authenticated());
    assert!(store.refresh_scheduled());
}

#[tokio::test]
async fn logout_clears_session_and_lands_on_login() {
    let base = serve(login_route(vec![(make_token(3600), "refresh-1".to_owned())])).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, navigator) = store_with(&base, storage.clone(), DEFAULT_REFRESH_LEAD);
    store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();

    store.logout();

    assert!(!store.is_authenticated());
    assert!(!store.refresh_scheduled());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(storage.get(REFRESH_TOKEN_KEY), None);
    assert_eq!(storage.get(USER_KEY), None);
    assert_eq!(navigator.current(), Route::Login);

    // Idempotent.
    store.logout();
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn watch_observes_login_and_logout() {
    let base = serve(login_route(vec![(make_token(3600), "refresh-1".to_owned())])).await;
    let (store, _) = store_with(&base, Arc::new(MemoryStorage::new()), DEFAULT_REFRESH_LEAD);
    let mut rx = store.watch_authenticated();

    store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());

    store.logout();
    rx.changed().await.unwrap();
    assert!(!*rx.borrow_and_update());
}

// =============================================================================
// refresh scheduling
// =============================================================================

#[tokio::test]
async fn scheduled_refresh_rotates_tokens_and_keeps_user() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let next_access = make_token(3600);
    let app = login_route(vec![(make_token(1), "refresh-1".to_owned())]).merge(refresh_ok_route(
        received.clone(),
        next_access.clone(),
        "refresh-2".to_owned(),
    ));
    let base = serve(app).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, _) = store_with(&base, storage.clone(), Duration::ZERO);

    store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();
    assert!(store.refresh_scheduled());

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(*received.lock().unwrap(), vec!["refresh-1".to_owned()]);
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), Some(next_access));
    assert_eq!(storage.get(REFRESH_TOKEN_KEY), Some("refresh-2".to_owned()));
    assert!(store.is_authenticated());
    assert_eq!(store.user().unwrap().id, "u1");
    // The rotated token re-armed the timer.
    assert!(store.refresh_scheduled());
}

#[tokio::test]
async fn relogin_cancels_previous_timer() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = login_route(vec![
        (make_token(1), "refresh-1".to_owned()),
        (make_token(3600), "refresh-2".to_owned()),
    ])
    .merge(refresh_ok_route(received.clone(), make_token(3600), "refresh-3".to_owned()));
    let base = serve(app).await;
    let (store, _) = store_with(&base, Arc::new(MemoryStorage::new()), Duration::ZERO);

    let credentials = LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() };
    store.login(&credentials).await.unwrap();
    store.login(&credentials).await.unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    // The short-lived token's timer was canceled by the second login; the
    // long-lived token's timer has not fired yet.
    assert!(received.lock().unwrap().is_empty());
    assert!(store.refresh_scheduled());
}

#[tokio::test]
async fn logout_cancels_pending_refresh() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = login_route(vec![(make_token(1), "refresh-1".to_owned())]).merge(refresh_ok_route(
        received.clone(),
        make_token(3600),
        "refresh-2".to_owned(),
    ));
    let base = serve(app).await;
    let (store, _) = store_with(&base, Arc::new(MemoryStorage::new()), Duration::ZERO);

    store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();
    store.logout();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scheduled_refresh_failure_logs_out() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = login_route(vec![(make_token(1), "refresh-1".to_owned())])
        .merge(refresh_fail_route(received.clone()));
    let base = serve(app).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, navigator) = store_with(&base, storage.clone(), Duration::ZERO);

    store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(received.lock().unwrap().len(), 1);
    assert!(!store.is_authenticated());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(storage.get(USER_KEY), None);
    assert_eq!(navigator.current(), Route::Login);
}

#[tokio::test]
async fn scheduled_refresh_reads_live_token_from_storage() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = login_route(vec![(make_token(1), "refresh-1".to_owned())]).merge(refresh_ok_route(
        received.clone(),
        make_token(3600),
        "refresh-2".to_owned(),
    ));
    let base = serve(app).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, _) = store_with(&base, storage.clone(), Duration::ZERO);

    store
        .login(&LoginRequest { email: "ada@example.com".to_owned(), password: "pw".to_owned() })
        .await
        .unwrap();
    // Another component rotated the refresh token after the timer was armed.
    storage.set(REFRESH_TOKEN_KEY, "rotated-elsewhere");

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(*received.lock().unwrap(), vec!["rotated-elsewhere".to_owned()]);
}
