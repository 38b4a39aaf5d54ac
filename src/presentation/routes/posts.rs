use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, patch, post};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    add_comment, create_post, delete_comment, delete_post, delete_post_admin, get_comments,
    get_post, list_my_posts, list_posts, update_post,
};
use crate::presentation::middleware::auth::{jwt_auth_middleware, require_admin};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/getPosts", get(list_posts))
        .route("/getPost/{post_id}", get(get_post))
        .route("/getComments/{post_id}", get(get_comments));

    let protected = Router::new()
        .route("/getMyPosts", get(list_my_posts))
        .route("/addPost", post(create_post))
        .route("/updatePost/{post_id}", patch(update_post))
        .route("/deletePost/{post_id}", delete(delete_post))
        .route("/addComment/{post_id}", patch(add_comment))
        .route("/deleteComment/{post_id}/{comment_id}", delete(delete_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    // Layers run outermost-last: the token check populates the identity, then
    // the role check reads it.
    let admin = Router::new()
        .route("/deletePostAdmin/{post_id}", delete(delete_post_admin))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected).merge(admin)
}
