use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use contacts_api::config::AppConfig;
use contacts_api::middleware::require_auth;
use contacts_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    tracing::info!(environment = ?config.environment, "Starting contacts API");

    let state = AppState::from_config(config).await?;
    let bind_addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("🚀 Contacts API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    let avatars_dir = state.avatars.dir().clone();
    let max_upload = state.config.server.max_upload_bytes;

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected, behind the bearer-token guard
        .merge(auth_protected_routes(state.clone()))
        .merge(contact_routes(state.clone()))
        // Stored avatars are plain static files
        .nest_service("/avatars", ServeDir::new(avatars_dir))
        // Global middleware
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use contacts_api::handlers::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route(
            "/api/auth/verify/:verification_token",
            get(auth::verify_get),
        )
        .route("/api/auth/verify", post(auth::verify_post))
        .route("/api/auth/login", post(auth::login_post))
}

fn auth_protected_routes(state: AppState) -> Router<AppState> {
    use contacts_api::handlers::auth;

    Router::new()
        .route("/api/auth/logout", post(auth::logout_post))
        .route("/api/auth/current", get(auth::current_get))
        .route("/api/auth/subscription", patch(auth::subscription_patch))
        .route("/api/auth/avatars", patch(auth::avatars_patch))
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

fn contact_routes(state: AppState) -> Router<AppState> {
    use contacts_api::handlers::contacts;

    Router::new()
        .route(
            "/api/contacts",
            get(contacts::contacts_get).post(contacts::contacts_post),
        )
        .route(
            "/api/contacts/:id",
            get(contacts::contact_get)
                .put(contacts::contact_put)
                .delete(contacts::contact_delete),
        )
        .route(
            "/api/contacts/:id/favorite",
            patch(contacts::favorite_patch),
        )
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Contacts API",
        "version": version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "register": "POST /api/auth/register (public)",
            "verify": "GET /api/auth/verify/:verification_token (public)",
            "resend": "POST /api/auth/verify (public)",
            "login": "POST /api/auth/login (public)",
            "account": "/api/auth/* (protected)",
            "contacts": "/api/contacts[/:id] (protected)",
            "avatars": "/avatars/* (public static files)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.users.ping().await {
        Ok(()) => (
            StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        ),
    }
}
