use async_trait::async_trait;
use uuid::Uuid;

use crate::database::models::{
    ApiKeyRecord, NewApiKey, NewUser, UsageSummary, UserChanges, UserRecord,
};
use crate::db::DatabaseError;

/// Persistence backend for accounts and API keys
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Insert a user. Fails with `AlreadyExists` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, DatabaseError>;

    /// Apply a partial update, returning `None` if the user does not exist
    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, DatabaseError>;

    async fn create_api_key(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, DatabaseError>;

    /// Keys owned by `user_id`, newest first
    async fn list_api_keys(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApiKeyRecord>, DatabaseError>;

    /// Delete a key owned by `user_id`. Returns false if no such key.
    async fn delete_api_key(&self, user_id: Uuid, key_id: Uuid) -> Result<bool, DatabaseError>;

    /// Look up a key by hash and count one use of it
    async fn record_api_key_use(&self, key_hash: &str)
        -> Result<Option<ApiKeyRecord>, DatabaseError>;

    async fn usage_summary(&self, user_id: Uuid) -> Result<UsageSummary, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

pub mod postgres;

pub use postgres::PgStore;
