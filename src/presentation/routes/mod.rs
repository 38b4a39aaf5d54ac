use axum::Router;

use super::AppState;

pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new().nest("/posts", posts::router(state))
}
