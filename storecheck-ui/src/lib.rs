//! storecheck-ui library - checklist web service
//!
//! Serves the mobile inspection UI, the session/submission API, and the
//! auth-gated admin API over one local HTTP port.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use storecheck_common::db::SqliteProvider;
use storecheck_common::session::InspectionSession;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (settings reads)
    pub db: SqlitePool,
    /// Checklist data provider backing taxonomy and inspections
    pub provider: SqliteProvider,
    /// The single working inspection session
    ///
    /// One logical owner, mutated only through this lock; concurrent
    /// clients of the same service clobber each other, last write wins.
    pub session: Arc<Mutex<InspectionSession>>,
    /// Shared secret for admin API authentication (0 disables checking)
    pub shared_secret: i64,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        provider: SqliteProvider,
        session: InspectionSession,
        shared_secret: i64,
    ) -> Self {
        Self {
            db,
            provider,
            session: Arc::new(Mutex::new(session)),
            shared_secret,
        }
    }
}

/// Build application router
///
/// Admin routes require authentication; the inspection flow, confirmation
/// lookup, UI, and health endpoint do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    // Admin routes (require authentication)
    let admin = Router::new()
        .route("/api/admin/categories", get(api::list_categories).post(api::create_category))
        .route(
            "/api/admin/categories/:id",
            put(api::update_category).delete(api::delete_category),
        )
        .route("/api/admin/categories/:id/items", post(api::create_item))
        .route(
            "/api/admin/items/:id",
            put(api::update_item_description).delete(api::delete_item),
        )
        .route("/api/admin/inspections", get(api::list_inspections))
        .route("/api/admin/issues", get(api::list_issues))
        .route("/api/admin/issues/status", put(api::update_issue_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Inspection flow (no authentication)
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/session", get(api::get_session))
        .route("/api/session/store-info", put(api::set_store_info))
        .route(
            "/api/session/categories/:category_id/items/:item_id",
            put(api::update_session_item),
        )
        .route("/api/session/completion", get(api::get_completion))
        .route("/api/session/issues", get(api::get_session_issues))
        .route("/api/session/reset", post(api::reset_session))
        .route("/api/session/submit", post(api::submit_session))
        .route("/api/inspections/:id", get(api::get_inspection))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
