use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::posts::{
    AddCommentDto, AuthorDto, CommentActionDto, CommentDto, CreateAuthorDto, CreatePostDto,
    EnrichedCommentDto, EnrichedPostDto, MessageDto, PostDto, UpdateAuthorDto, UpdatePostDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::list_my_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::delete_post_admin,
        crate::presentation::handlers::posts::add_comment,
        crate::presentation::handlers::posts::get_comments,
        crate::presentation::handlers::posts::delete_comment
    ),
    components(
        schemas(
            CreateAuthorDto,
            CreatePostDto,
            UpdateAuthorDto,
            UpdatePostDto,
            AddCommentDto,
            AuthorDto,
            CommentDto,
            EnrichedCommentDto,
            PostDto,
            EnrichedPostDto,
            MessageDto,
            CommentActionDto
        )
    ),
    tags(
        (name = "posts", description = "Post and comment endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
