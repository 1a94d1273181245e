use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::RecordStore;
use crate::state::AppState;

/// GET / - service info
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "LMS API",
            "version": version,
            "description": "Courses, video memos and course reviews",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "classes": "/api/classes[/:id], /api/classes/visible, /api/classes/random, /api/classes/instructor/:id",
                "memos": "/api/memos/classes/:id[/timeline|/count], /api/memos/mine, /api/memos/:id (authenticated)",
                "reviews": "/api/reviews/classes/:id[/summary], /api/reviews/mine, /api/reviews/:id",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": backend,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "storage": backend
                    }
                })),
            )
        }
    }
}
