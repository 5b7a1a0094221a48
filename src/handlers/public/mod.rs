// Public handlers: no session required.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};

use crate::client::offline::OFFLINE_PAGE;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Genba API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Back-office API for construction site management",
        "endpoints": {
            "health": "/health (public)",
            "resources": "/api/resources/:resource[/:id] (protected)",
            "masterData": "/api/master-data (protected)",
            "settings": "/api/settings/schedule, /api/preferences (protected)",
            "remarks": "/api/remarks (protected)",
            "companyInfo": "/api/company-info (protected)",
            "postalCode": "/api/postal-code/:code (protected)",
            "auth": "/api/auth/whoami (protected)",
        }
    }))
}

/// GET /health - 503 when the store cannot be reached
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok",
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "error": "store unavailable",
                })),
            )
        }
    }
}

/// GET /offline.html - fallback page cached by the browser for failed navigations
pub async fn offline() -> impl IntoResponse {
    ([(axum::http::header::CACHE_CONTROL, "no-cache")], Html(OFFLINE_PAGE))
}
