use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use crate::error::panic_response;
use crate::handlers::{protected, public};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/offline.html", get(public::offline))
        // Protected: every handler below takes a `Session`
        .merge(resource_routes())
        .merge(settings_routes())
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/master-data", get(protected::master_data::get))
        .route(
            "/api/remarks",
            get(protected::remarks::list).post(protected::remarks::post),
        )
        .route(
            "/api/company-info",
            get(protected::company::get).put(protected::company::put),
        )
        .route("/api/postal-code/:code", get(protected::postal::get))
        // Global middleware
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn resource_routes() -> Router<AppState> {
    use protected::records;

    Router::new()
        // Collection
        .route("/api/resources/:resource", get(records::list).post(records::create))
        // Item
        .route(
            "/api/resources/:resource/:id",
            get(records::show).put(records::update).delete(records::delete),
        )
        .route("/api/resources/:resource/:id/restore", post(records::restore))
}

fn settings_routes() -> Router<AppState> {
    use protected::{preferences, settings};

    Router::new()
        .route("/api/settings/schedule", get(settings::get).post(settings::post))
        .route("/api/preferences", get(preferences::get).put(preferences::put))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // No configured origins: same-origin only
    if origins.is_empty() {
        return layer;
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer.allow_origin(origins)
}
