/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use scrumflow_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = scrumflow_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_auth, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into each handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                  public
/// /v1/auth/{register,login,refresh}        public
/// /v1/projects                             GET, POST
/// /v1/projects/:id                         GET, PUT, DELETE
/// /v1/projects/:id/delete                  POST
/// /v1/projects/:id/members                 GET, POST
/// /v1/projects/:id/members/:member_id      DELETE
/// /v1/projects/:id/sprints                 GET, POST
/// /v1/projects/:id/backlog                 GET, POST
/// /v1/sprints/:id/backlog                  GET, POST
/// /v1/stories/:id                          GET, PUT, DELETE
/// /v1/stories/:id/move                     POST
/// /api/users/:id/projects                  GET
/// /api/projects/:id/users                  GET
/// ```
///
/// Everything but `/health` and `/v1/auth` requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let project_routes = Router::new()
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/projects/:id/delete", post(routes::projects::delete_project))
        .route(
            "/projects/:id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/projects/:id/members/:member_id",
            axum::routing::delete(routes::members::remove_member),
        )
        .route(
            "/projects/:id/sprints",
            get(routes::sprints::list_sprints).post(routes::sprints::create_sprint),
        )
        .route(
            "/projects/:id/backlog",
            get(routes::backlog::product_backlog).post(routes::backlog::create_in_product_backlog),
        )
        .route(
            "/sprints/:id/backlog",
            get(routes::backlog::sprint_backlog).post(routes::backlog::create_in_sprint_backlog),
        )
        .route(
            "/stories/:id",
            get(routes::stories::get_story)
                .put(routes::stories::update_story)
                .delete(routes::stories::delete_story),
        )
        .route("/stories/:id/move", post(routes::stories::move_story))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .route("/users/:id/projects", get(routes::api::user_projects))
        .route("/projects/:id/users", get(routes::api::project_users))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(project_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
