//! Router assembly.
//!
//! Layers run outermost first on the way in:
//!
//! ```text
//! Sentry hub + transaction
//!   TraceLayer
//!     request id
//!       security headers
//!         CSP nonce
//!           session
//!             expired-token cleanup
//!               routes
//! ```

use axum::{Router, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    create_session_layer, csp_nonce_middleware, expire_session_middleware,
    request_id_middleware, security_headers_middleware,
};
use crate::routes;
use crate::state::AppState;

/// Build the complete application router for `state`.
pub fn build_router(state: AppState) -> Router {
    let config = state.config();
    let session_layer = create_session_layer(config);
    let static_files = ServeDir::new(&config.static_dir);
    let app_routes = routes::routes(config.rate_limit);

    Router::new()
        .merge(app_routes)
        .layer(from_fn(expire_session_middleware))
        .layer(session_layer)
        .nest_service("/static", static_files)
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
