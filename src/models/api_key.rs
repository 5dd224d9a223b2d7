use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::ApiKeyRecord;

const DEFAULT_PAGE_SIZE: u32 = 50;

/// An issued API key
///
/// `key` holds the full secret only in the response that creates the key.
/// Everywhere else it is the masked form, e.g. `ak_Xy12Ab34...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    /// Owner of the key
    pub user_id: Uuid,
    /// Number of requests authenticated with this key
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Build the response for a freshly generated key, exposing the secret.
    pub fn revealed(record: ApiKeyRecord, key: String) -> Self {
        Self::with_key(record, key)
    }

    /// Build the response for a stored key, showing only its prefix.
    pub fn masked(record: ApiKeyRecord) -> Self {
        let key = mask_key(&record.key_prefix);
        Self::with_key(record, key)
    }

    fn with_key(record: ApiKeyRecord, key: String) -> Self {
        Self {
            id: record.id,
            name: record.name,
            key,
            user_id: record.user_id,
            usage_count: u64::try_from(record.usage_count).unwrap_or(0),
            created_at: record.created_at,
            last_used: record.last_used,
        }
    }
}

pub fn mask_key(prefix: &str) -> String {
    format!("{prefix}...")
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateApiKeyRequest {
    /// Label for the key (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

impl CreateApiKeyRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}

/// Pagination for key listings
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListKeysQuery {
    /// Page number starting at 1 (default 1)
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    /// Page size, 1-100 (default 50)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl ListKeysQuery {
    pub fn limit(&self) -> i64 {
        i64::from(self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        i64::from(page - 1) * self.limit()
    }
}
