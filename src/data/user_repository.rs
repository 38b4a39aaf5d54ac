use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Read-only lookup into the user collection. This service never creates or
/// mutates users; it only resolves email addresses for enrichment.
#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn find_email(&self, user_id: i64) -> Result<Option<String>, DomainError>;

    /// Batch resolution; unresolved ids are simply absent from the map.
    async fn find_emails(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>, DomainError>;
}
