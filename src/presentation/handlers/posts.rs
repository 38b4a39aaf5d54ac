use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::post_service::EnrichedPost;
use crate::domain::post::{AddCommentRequest, Author, Comment, CreatePostRequest, Post, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateAuthorDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) name: String,
    // A client-supplied `email` here is silently dropped during
    // deserialization; the stored email is resolved from the creating user.
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(nested)]
    pub(crate) author: CreateAuthorDto,
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    pub(crate) img: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateAuthorDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) name: String,
    #[validate(email)]
    pub(crate) email: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) content: Option<String>,
    pub(crate) img: Option<String>,
    #[validate(nested)]
    pub(crate) author: Option<UpdateAuthorDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct AddCommentDto {
    #[validate(length(min = 1))]
    pub(crate) comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) name: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) comment: String,
}

/// Comment as returned by `getPost`: same record plus the commenter's email
/// when it resolved, `null` otherwise.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrichedCommentDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) comment: String,
    pub(crate) email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) author: AuthorDto,
    pub(crate) title: String,
    pub(crate) content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) img: Option<String>,
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrichedPostDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) author: AuthorDto,
    pub(crate) title: String,
    pub(crate) content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) img: Option<String>,
    pub(crate) comments: Vec<EnrichedCommentDto>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageDto {
    pub(crate) message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentActionDto {
    pub(crate) message: String,
    pub(crate) post: PostDto,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            comment: comment.body,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            author: AuthorDto {
                name: post.author.name,
                email: post.author.email,
            },
            title: post.title,
            content: post.content,
            img: post.img,
            comments: post.comments.into_iter().map(CommentDto::from).collect(),
            created_at: post.created_at,
        }
    }
}

impl From<EnrichedPost> for EnrichedPostDto {
    fn from(enriched: EnrichedPost) -> Self {
        let EnrichedPost {
            post,
            commenter_emails,
        } = enriched;

        let comments = post
            .comments
            .into_iter()
            .map(|comment| EnrichedCommentDto {
                id: comment.id,
                email: commenter_emails.get(&comment.user_id).cloned(),
                user_id: comment.user_id,
                comment: comment.body,
            })
            .collect();

        Self {
            id: post.id,
            user_id: post.user_id,
            author: AuthorDto {
                name: post.author.name,
                email: post.author.email,
            },
            title: post.title,
            content: post.content,
            img: post.img,
            comments,
            created_at: post.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/posts/getPosts",
    tag = "posts",
    responses(
        (status = 200, description = "All posts, newest first", body = [PostDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<PostDto>>)> {
    let posts = state.post_service.list_posts().await?;
    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/posts/getMyPosts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller's posts, newest first", body = [PostDto]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_my_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<Vec<PostDto>>)> {
    let posts = state.post_service.list_my_posts(auth.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/posts/getPost/{post_id}",
    tag = "posts",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with commenter emails attached", body = EnrichedPostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<EnrichedPostDto>)> {
    let result = state.post_service.get_post(post_id).await?;
    Ok((StatusCode::OK, Json(EnrichedPostDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/posts/addPost",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Creating user not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        author_name: dto.author.name,
        title: dto.title,
        content: dto.content,
        img: dto.img,
    };

    let result = state.post_service.create_post(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    patch,
    path = "/posts/updatePost/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found or unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        img: dto.img,
        author: dto.author.map(|author| Author {
            name: author.name,
            email: author.email,
        }),
    };

    let result = state
        .post_service
        .update_post(auth.user_id, post_id, req)
        .await?;
    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/posts/deletePost/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted", body = MessageDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found or unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<MessageDto>)> {
    state.post_service.delete_post(auth.user_id, post_id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageDto {
            message: "Post deleted successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/posts/deletePostAdmin/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted regardless of owner", body = MessageDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post_admin(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<MessageDto>)> {
    state.post_service.delete_post_admin(post_id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageDto {
            message: "Post deleted successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/posts/addComment/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = AddCommentDto,
    responses(
        (status = 200, description = "Comment added", body = CommentActionDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<AddCommentDto>,
) -> AppResult<(StatusCode, Json<CommentActionDto>)> {
    dto.validate()?;
    let req = AddCommentRequest { body: dto.comment };

    let post = state
        .post_service
        .add_comment(auth.user_id, post_id, req)
        .await?;
    Ok((
        StatusCode::OK,
        Json(CommentActionDto {
            message: "Comment added successfully".to_string(),
            post: PostDto::from(post),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/posts/getComments/{post_id}",
    tag = "posts",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Raw comment list, no enrichment", body = [CommentDto]),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<Vec<CommentDto>>)> {
    let comments = state.post_service.get_comments(post_id).await?;
    Ok((
        StatusCode::OK,
        Json(comments.into_iter().map(CommentDto::from).collect()),
    ))
}

#[utoipa::path(
    delete,
    path = "/posts/deleteComment/{post_id}/{comment_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = CommentActionDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or owned comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<(StatusCode, Json<CommentActionDto>)> {
    let post = state
        .post_service
        .delete_comment(auth.user_id, post_id, comment_id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(CommentActionDto {
            message: "Comment deleted successfully".to_string(),
            post: PostDto::from(post),
        }),
    ))
}
