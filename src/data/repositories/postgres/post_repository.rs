use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{NewComment, NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Author, Comment, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Comments are loaded in one query for the whole post set; serial id
    // order is insertion order.
    async fn load_comments(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Comment>>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, user_id, body
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(Comment {
                id: row.id,
                user_id: row.user_id,
                body: row.body,
            });
        }
        Ok(by_post)
    }

    async fn rows_to_posts(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
        let post_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut comments = self.load_comments(&post_ids).await?;

        rows.into_iter()
            .map(|row| {
                let post_comments = comments.remove(&row.id).unwrap_or_default();
                map_row_to_post(row, post_comments)
            })
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    author_name: String,
    author_email: String,
    title: String,
    content: String,
    img: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    body: String,
}

const POST_COLUMNS: &str = "id, user_id, author_name, author_email, title, content, img, created_at";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.rows_to_posts(rows).await
    }

    async fn list_posts_by_owner(&self, owner_id: i64) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.rows_to_posts(rows).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut comments = self.load_comments(&[row.id]).await?;
        let post_comments = comments.remove(&row.id).unwrap_or_default();
        map_row_to_post(row, post_comments).map(Some)
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (user_id, author_name, author_email, title, content, img)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(&input.author.name)
        .bind(&input.author.email)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.img)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_row_to_post(row, Vec::new())
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        // Ownership check and update are one conditional statement; there is
        // no read-then-write window.
        let (author_name, author_email) = match &patch.author {
            Some(author) => (Some(author.name.clone()), Some(author.email.clone())),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                img = COALESCE($5, img),
                author_name = COALESCE($6, author_name),
                author_email = COALESCE($7, author_email)
            WHERE id = $1 AND user_id = $2
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post_id)
        .bind(owner_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.img)
        .bind(&author_name)
        .bind(&author_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut comments = self.load_comments(&[row.id]).await?;
        let post_comments = comments.remove(&row.id).unwrap_or_default();
        map_row_to_post(row, post_comments).map(Some)
    }

    async fn delete_post(&self, post_id: i64, owner_id: Option<i64>) -> Result<bool, DomainError> {
        let result = match owner_id {
            Some(owner_id) => {
                sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
                    .bind(post_id)
                    .bind(owner_id)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM posts WHERE id = $1")
                    .bind(post_id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_comment(
        &self,
        post_id: i64,
        input: NewComment,
    ) -> Result<Option<Comment>, DomainError> {
        // Single statement: inserts only when the post exists, so there is no
        // race against a concurrent post delete.
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, user_id, body)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM posts WHERE id = $1)
            RETURNING id, post_id, user_id, body
            "#,
        )
        .bind(post_id)
        .bind(input.user_id)
        .bind(&input.body)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|row| Comment {
            id: row.id,
            user_id: row.user_id,
            body: row.body,
        }))
    }

    async fn delete_comment_owned(
        &self,
        post_id: i64,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND post_id = $2 AND user_id = $3
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_post(row: PostRow, comments: Vec<Comment>) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.user_id,
        Author {
            name: row.author_name,
            email: row.author_email,
        },
        row.title,
        row.content,
        row.img,
        comments,
        row.created_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
