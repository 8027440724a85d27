// --- File: crates/odmark_attendance/src/routes.rs ---

use crate::auth::{identity_middleware, AuthState};
use crate::events::EventDirectory;
use crate::handlers::{
    create_event_handler, delete_event_handler, event_roster_handler, list_events_handler,
    scan_handler, student_history_handler, AttendanceState,
};
use crate::logic::AttendanceRecorder;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use odmark_common::services::{BoxedError, DocumentStore, IdentityProvider};
use odmark_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all routes for the attendance feature.
///
/// Every route requires an authenticated identity; the middleware rejects
/// requests without a resolvable bearer token before any handler runs.
pub fn routes(
    config: Arc<AppConfig>,
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
    identity_provider: Arc<dyn IdentityProvider<Error = BoxedError>>,
) -> Router {
    let state = Arc::new(AttendanceState {
        recorder: Arc::new(AttendanceRecorder::new(store.clone(), &config.institution)),
        directory: Arc::new(EventDirectory::new(store)),
    });
    let auth_state = Arc::new(AuthState {
        provider: identity_provider,
    });

    Router::new()
        .route("/attendance/scan", post(scan_handler))
        .route("/events", post(create_event_handler).get(list_events_handler))
        .route("/events/{event_id}", delete(delete_event_handler))
        .route("/events/{event_id}/attendance", get(event_roster_handler))
        .route(
            "/students/{reg_no}/attendance",
            get(student_history_handler),
        )
        .layer(middleware::from_fn_with_state(
            auth_state,
            identity_middleware,
        ))
        .with_state(state)
}
