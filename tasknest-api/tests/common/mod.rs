/// Common test utilities for integration tests
///
/// Shared infrastructure: test database setup, account factories with
/// unique identities, token minting, and request/response helpers.
use axum::body::Body;
use axum::http::{Request, Response};
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::Config;
use tasknest_shared::auth::jwt::{create_token, Claims, TokenType};
use tasknest_shared::auth::password::hash_password;
use tasknest_shared::db::migrations::ensure_database_exists;
use tasknest_shared::models::user::{CreateUser, User};

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Produces an identity that no other test run has used
pub fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let seq = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", prefix, nanos, seq)
}

/// Test context wrapping the app and its database
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        ensure_database_exists(&config.database.url).await?;
        let db = PgPool::connect(&config.database.url).await?;

        // Path is relative to the crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Creates an account with a unique username/email and the given
    /// password, going through the store the way the signup route does
    pub async fn create_user(&self, password: &str) -> anyhow::Result<User> {
        let username = unique_name("user");
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("{}@example.com", username),
                username,
                password_hash: hash_password(password)?,
            },
        )
        .await?;
        Ok(user)
    }

    /// Mints a valid access token for the given account
    pub fn token_for(&self, user: &User) -> anyhow::Result<String> {
        let claims = Claims::new(user.id, TokenType::Access);
        Ok(create_token(&claims, &self.config.jwt.secret)?)
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::Service as _;
        self.app
            .clone()
            .call(request)
            .await
            .expect("router call is infallible")
    }

    /// Removes a test account and everything it owns
    pub async fn cleanup_user(&self, user_id: i64) -> anyhow::Result<()> {
        User::delete_cascading(&self.db, user_id).await?;
        Ok(())
    }
}

/// Builds a JSON request
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a JSON request carrying a bearer token
pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a bodyless request carrying a bearer token
pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
