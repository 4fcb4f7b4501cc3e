/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router
/// with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = tasknest_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::error::ApiError;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasknest_shared::auth::jwt;
use tasknest_shared::auth::middleware::{bearer_token, AuthContext, AuthError};
use tasknest_shared::models::user::User;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the
/// config rides in an Arc so cloning stays cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /token           # Login (public)
///     │   └── POST /refresh_token   # Exchange refresh token (public)
///     ├── /users/
///     │   ├── POST   /              # Create account (public)
///     │   ├── GET    /              # List accounts (public)
///     │   ├── PUT    /:user_id      # Update own account (bearer)
///     │   └── DELETE /:user_id      # Delete own account (bearer)
///     └── /todos/                   # All bearer-authenticated
///         ├── POST   /
///         ├── GET    /
///         ├── PATCH  /:todo_id
///         └── DELETE /:todo_id
/// ```
///
/// Bearer-protected nests carry the JWT layer; it resolves the
/// principal and injects an `AuthContext` before any handler runs.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public: these are how credentials are obtained)
    let auth_routes = Router::new()
        .route("/token", post(routes::auth::login))
        .route("/refresh_token", post(routes::auth::refresh));

    // User routes: account creation and listing are public, while
    // self-update and self-delete require a resolved principal.
    let user_public_routes = Router::new().route(
        "/",
        post(routes::users::create_user).get(routes::users::list_users),
    );
    let user_protected_routes = Router::new()
        .route(
            "/:user_id",
            axum::routing::put(routes::users::update_user).delete(routes::users::delete_user),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));
    let user_routes = user_public_routes.merge(user_protected_routes);

    // Todo routes (all require a resolved principal)
    let todo_routes = Router::new()
        .route(
            "/",
            post(routes::todos::create_todo).get(routes::todos::list_todos),
        )
        .route(
            "/:todo_id",
            axum::routing::patch(routes::todos::patch_todo).delete(routes::todos::delete_todo),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/todos", todo_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the request's principal: extracts the bearer token,
/// validates it as an access token, and confirms the subject still
/// names an existing user before injecting `AuthContext` into request
/// extensions. Requests failing any step never reach a handler.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // The token may outlive the account; a deleted user's credential
    // must not resolve to a principal.
    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    req.extensions_mut().insert(AuthContext::new(user.id));

    Ok(next.run(req).await)
}
