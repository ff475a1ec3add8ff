use axum::{
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use board_api::handlers::{auth, posts, users};
use board_api::middleware::jwt_auth_middleware;
use board_api::state::AppState;
use board_api::{config, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting board API in {:?} mode", config.environment);

    let pool = database::connect().await?;
    let app = app(AppState::new(pool));

    // Allow tests or deployments to override port via env
    let port = std::env::var("BOARD_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("board API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Authentication
        .route("/auth/login", post(auth::login))
        // Users: reads are public, mutations require a token
        .route("/users", post(users::register))
        .route("/users/search", get(users::search))
        .route(
            "/users/:user_id",
            get(users::get_user).merge(
                patch(users::update_user)
                    .delete(users::withdraw)
                    .route_layer(from_fn(jwt_auth_middleware)),
            ),
        )
        .route("/users/:user_id/posts", get(users::user_posts))
        // Posts: reads are public, mutations require a token
        .route(
            "/posts",
            get(posts::list)
                .merge(post(posts::create).route_layer(from_fn(jwt_auth_middleware))),
        )
        .route("/posts/search", get(posts::search))
        .route(
            "/posts/:post_id",
            get(posts::get).merge(
                patch(posts::update)
                    .delete(posts::delete)
                    .route_layer(from_fn(jwt_auth_middleware)),
            ),
        )
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "results": {
            "name": "Board API",
            "version": version,
            "description": "Message board REST API with JWT auth and paged search",
            "endpoints": {
                "auth": "/auth/login (public)",
                "users": "/users, /users/:id, /users/:id/posts, /users/search",
                "posts": "/posts, /posts/:id, /posts/search",
            },
        },
        "statusCode": 200,
        "message": "service information",
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "results": { "status": "ok", "timestamp": now, "database": "ok" },
                "statusCode": 200,
                "message": "healthy",
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "error": "Service Unavailable",
                "statusCode": 503,
                "message": "database unavailable",
                "cause": e.to_string(),
            })),
        ),
    }
}
