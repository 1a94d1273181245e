pub mod format;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{classes, memos, reviews, system};
use crate::middleware::actor_middleware;
use crate::state::AppState;

/// The full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(class_routes())
        .merge(memo_routes())
        .merge(review_routes())
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(from_fn_with_state(state.clone(), actor_middleware)),
        )
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/api/classes", get(classes::list).post(classes::create))
        .route("/api/classes/visible", get(classes::visible))
        .route("/api/classes/random", get(classes::random))
        .route("/api/classes/instructor/:id", get(classes::by_instructor))
        .route("/api/classes/instructor/:id/all", get(classes::all_by_instructor))
        .route(
            "/api/classes/:id",
            get(classes::detail).put(classes::update).delete(classes::delete),
        )
}

fn memo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/memos/classes/:id",
            get(memos::list_for_course).post(memos::create),
        )
        .route("/api/memos/classes/:id/timeline", get(memos::timeline))
        .route("/api/memos/classes/:id/count", get(memos::count))
        .route("/api/memos/mine", get(memos::mine))
        .route("/api/memos/:id", put(memos::update).delete(memos::delete))
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reviews/classes/:id",
            get(reviews::page_for_course).post(reviews::create),
        )
        .route("/api/reviews/classes/:id/summary", get(reviews::summary))
        .route("/api/reviews/classes/:id/all", get(reviews::all_for_course))
        .route("/api/reviews/mine", get(reviews::mine))
        .route(
            "/api/reviews/:id",
            get(reviews::get).put(reviews::update).delete(reviews::delete),
        )
}
