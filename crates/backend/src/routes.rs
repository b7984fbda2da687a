use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::shared::app_state::AppState;
use crate::system::auth::middleware::require_catalog_importer;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let max_upload_bytes = state.config.import.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // USECASE ROUTES (admin, warehouse)
        // ========================================
        .route(
            "/api/u501/import-catalog",
            post(handlers::usecases::u501_import_catalog)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_catalog_importer,
                )),
        )
        .route(
            "/api/u501/import-catalog/template",
            get(handlers::usecases::u501_import_template).layer(
                middleware::from_fn_with_state(state.clone(), require_catalog_importer),
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
