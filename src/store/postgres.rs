use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::database::models::{
    ApiKeyRecord, NewApiKey, NewUser, UsageSummary, UserChanges, UserRecord,
};
use crate::database::queries;
use crate::db::DatabaseError;

/// `Store` backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, DatabaseError> {
        queries::create_user(&self.pool, &new_user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        queries::get_user_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        queries::get_user_by_id(&self.pool, user_id).await
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        queries::update_user(&self.pool, user_id, &changes).await
    }

    async fn create_api_key(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, DatabaseError> {
        queries::create_api_key(&self.pool, &new_key).await
    }

    async fn list_api_keys(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApiKeyRecord>, DatabaseError> {
        queries::list_api_keys(&self.pool, user_id, limit, offset).await
    }

    async fn delete_api_key(&self, user_id: Uuid, key_id: Uuid) -> Result<bool, DatabaseError> {
        queries::delete_api_key(&self.pool, user_id, key_id).await
    }

    async fn record_api_key_use(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, DatabaseError> {
        queries::record_api_key_use(&self.pool, key_hash).await
    }

    async fn usage_summary(&self, user_id: Uuid) -> Result<UsageSummary, DatabaseError> {
        queries::usage_summary(&self.pool, user_id).await
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        queries::ping(&self.pool).await
    }
}
