use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Author, Comment, Post};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) user_id: i64,
    pub(crate) author: Author,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) img: Option<String>,
}

/// Field-level patch; `None` means "retain the stored value".
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    /// Retain-only: there is no way to clear a stored `img` through a patch,
    /// since an absent field and an explicit null both arrive as `None`.
    pub(crate) img: Option<String>,
    pub(crate) author: Option<Author>,
}

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) user_id: i64,
    pub(crate) body: String,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;

    /// Posts owned by `owner_id`, newest first.
    async fn list_posts_by_owner(&self, owner_id: i64) -> Result<Vec<Post>, DomainError>;

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;

    /// Conditional update: applies `patch` only when both id and owner match,
    /// in a single atomic statement. `None` means not found or not owned.
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;

    /// Deletes the post. `owner_id: None` is the administrative path and
    /// matches on id alone. Returns whether a row was removed.
    async fn delete_post(&self, post_id: i64, owner_id: Option<i64>) -> Result<bool, DomainError>;

    /// Appends a comment; `None` when the post does not exist.
    async fn add_comment(
        &self,
        post_id: i64,
        input: NewComment,
    ) -> Result<Option<Comment>, DomainError>;

    /// Deletes a comment only when post, comment and owner all match.
    /// Returns whether a row was removed.
    async fn delete_comment_owned(
        &self,
        post_id: i64,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError>;
}
