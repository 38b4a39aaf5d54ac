use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) name: String,
    pub(crate) email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) author: Author,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) img: Option<String>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Post {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: i64,
        user_id: i64,
        author: Author,
        title: impl Into<String>,
        content: impl Into<String>,
        img: Option<String>,
        comments: Vec<Comment>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("user_id", user_id)?;
        let author = Author {
            name: normalize_required("author.name", &author.name)?,
            email: normalize_required("author.email", &author.email)?,
        };
        let title = normalize_required("title", &title.into())?;
        let content = normalize_required("content", &content.into())?;

        Ok(Self {
            id,
            user_id,
            author,
            title,
            content,
            img,
            comments,
            created_at,
        })
    }
}

/// Create input. There is no `author.email` here on purpose: the email is
/// resolved server-side from the creating user's record and never trusted
/// from the client at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) author_name: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) img: Option<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            author_name: normalize_required("author.name", &self.author_name)?,
            title: normalize_required("title", &self.title)?,
            content: normalize_required("content", &self.content)?,
            img: self.img.map(|img| img.trim().to_string()),
        })
    }
}

/// Patch-style update: provided fields replace, absent fields are retained.
/// A provided `author` replaces both name and email; update does not
/// re-resolve the email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) img: Option<String>,
    pub(crate) author: Option<Author>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self
            .title
            .map(|title| normalize_required("title", &title))
            .transpose()?;
        let content = self
            .content
            .map(|content| normalize_required("content", &content))
            .transpose()?;
        let author = self
            .author
            .map(|author| {
                Ok::<_, DomainError>(Author {
                    name: normalize_required("author.name", &author.name)?,
                    email: normalize_required("author.email", &author.email)?,
                })
            })
            .transpose()?;

        Ok(Self {
            title,
            content,
            img: self.img.map(|img| img.trim().to_string()),
            author,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AddCommentRequest {
    pub(crate) body: String,
}

impl AddCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            body: normalize_required("comment", &self.body)?,
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_required(field: &'static str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(value.to_string())
}
