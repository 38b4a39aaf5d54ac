use axum::Router;
use tower_http::trace::TraceLayer;

/// Per-request tracing for the post API; pairs with the EnvFilter set up in
/// `infrastructure::logging`.
pub(crate) fn apply_trace(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}
