use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    config,
    db::DB,
    errors::{self, on_error},
    state::AppState,
};

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

pub struct AppParams<Router>
where
    Router: FnOnce(AppState) -> axum::Router,
{
    pub db: DB,
    pub router: Router,
}

pub async fn create<R>(AppParams { db, router }: AppParams<R>) -> errors::Result<Router>
where
    R: FnOnce(AppState) -> Router,
{
    STARTED_AT.get_or_init(Instant::now);

    let state = AppState { conn: db.clone() };

    let app = Router::new()
        .route("/health", get(health))
        .merge(router(state))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(db))
                .layer(cors_layer())
                .layer(middleware::from_fn(on_error)),
        );

    Ok(app)
}

async fn health() -> impl IntoResponse {
    let uptime = STARTED_AT.get_or_init(Instant::now).elapsed().as_secs();

    Json(json!({
        "status": "ok",
        "uptime": uptime,
    }))
}

fn cors_layer() -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    match config().cors_origin.as_str() {
        "*" => cors.allow_origin(Any),
        origin => match origin.parse::<HeaderValue>() {
            Ok(origin) => cors.allow_origin(origin).allow_credentials(true),
            Err(_) => {
                tracing::warn!("invalid CORS_ORIGIN, allowing any origin");
                cors.allow_origin(Any)
            }
        },
    }
}
