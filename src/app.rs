// app.rs - Router assembly

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(public::health))
        .merge(user_routes(state.clone()))
        .merge(ticket_routes(state.clone()))
        .merge(log_routes())
        .route("/api/recommendation/:username", get(public::recommendation_get))
        .nest_service("/uploads", ServeDir::new(&state.config.storage.upload_dir))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security.cors_origins));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/user/edit", put(protected::user_edit))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware));

    Router::new()
        .route("/api/user/register", post(public::user_register))
        .route("/api/user/login", post(public::user_login))
        .merge(protected)
}

fn ticket_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/ticket", post(protected::ticket_create))
        .route(
            "/api/ticket/:id",
            put(protected::ticket_update).delete(protected::ticket_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware));

    // Static segments win over `:id`, so these never reach ticket_get
    Router::new()
        .route("/api/ticket/all", get(public::ticket_list))
        .route("/api/ticket/nearby", get(public::ticket_nearby))
        .route("/api/ticket/:id", get(public::ticket_get))
        .merge(protected)
}

fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/api/log/all", get(public::log_list))
        .route("/api/log/:id_log", get(public::log_get))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
