// File: crates/services/odmark_backend/src/main.rs
use axum::{routing::get, Router};
use odmark_attendance::routes as attendance_routes;
use odmark_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

mod app_state;
mod service_factory;

use app_state::AppState;

#[tokio::main]
async fn main() {
    odmark_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::new(config.clone());

    let store = state
        .service_factory
        .document_store()
        .expect("document store must be available");
    let identity_provider = state
        .service_factory
        .identity_provider()
        .expect("identity provider must be available");

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Odmark API!" }))
        .merge(attendance_routes(config.clone(), store, identity_provider));

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use odmark_attendance::doc::AttendanceApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        // Define the merged OpenAPI documentation struct
        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Odmark API",
                version = "0.1.0",
                description = "OD attendance verification service API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Odmark", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(AttendanceApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    // Serve static files in dev mode
    if cfg!(debug_assertions) {
        info!("Running in development mode, serving static files from ./dist");
        let static_router = Router::new().nest_service("/static", ServeDir::new("dist"));
        app = app.merge(static_router);
    }

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("failed to bind");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
