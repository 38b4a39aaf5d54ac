use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserEmailRow {
    id: i64,
    email: String,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_email(&self, user_id: i64) -> Result<Option<String>, DomainError> {
        let row = sqlx::query_as::<_, UserEmailRow>(
            r#"
            SELECT id, email
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|row| row.email))
    }

    async fn find_emails(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>, DomainError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, UserEmailRow>(
            r#"
            SELECT id, email
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|row| (row.id, row.email)).collect())
    }
}

fn map_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
