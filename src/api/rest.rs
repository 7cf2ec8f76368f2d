//! REST API router and configuration.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::agenda::AgendaManager;
use crate::api::handlers::{
    conflict_handler, create_appointment_handler, day_view_handler, delete_appointment_handler,
    get_appointment_handler, grid_handler, stats_handler, update_appointment_handler, ApiState,
};
use crate::store::DocumentStore;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    /// Enable CORS.
    pub enable_cors: bool,
    /// API prefix (e.g., "/api/v1").
    pub prefix: String,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            prefix: "/api/v1".to_string(),
        }
    }
}

/// Create the REST API router.
///
/// Endpoints:
/// - POST   /api/v1/appointments        - Create an appointment
/// - GET    /api/v1/appointments/:id    - Fetch an appointment
/// - PUT    /api/v1/appointments/:id    - Replace an appointment
/// - DELETE /api/v1/appointments/:id    - Delete an appointment
/// - GET    /api/v1/day/:date           - Day view for a date
/// - GET    /api/v1/grid/:year/:month   - 42-cell month grid
/// - GET    /api/v1/conflicts?date&time - Slot conflict probe
/// - GET    /api/v1/stats               - Collection counts
/// - GET    /health                     - Liveness
pub fn create_rest_router<S: DocumentStore + 'static>(
    manager: Arc<AgendaManager<S>>,
    config: &RestApiConfig,
) -> Router {
    let state = Arc::new(ApiState::new(manager));

    let api_routes = Router::new()
        .route("/appointments", post(create_appointment_handler::<S>))
        .route(
            "/appointments/:id",
            get(get_appointment_handler::<S>)
                .put(update_appointment_handler::<S>)
                .delete(delete_appointment_handler::<S>),
        )
        .route("/day/:date", get(day_view_handler::<S>))
        .route("/grid/:year/:month", get(grid_handler::<S>))
        .route("/conflicts", get(conflict_handler::<S>))
        .route("/stats", get(stats_handler::<S>))
        .with_state(state);

    let router = Router::new()
        .nest(&config.prefix, api_routes)
        .route("/health", get(health_handler));

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(Any);

        router.layer(cors)
    } else {
        router
    }
}

/// Liveness handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
