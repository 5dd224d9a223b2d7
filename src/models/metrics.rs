use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::models::UsageSummary;

/// Usage totals across the caller's API keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    pub status: String,
    pub total_keys: u64,
    pub total_usage: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl From<UsageSummary> for MetricsResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            status: "up".to_string(),
            total_keys: u64::try_from(summary.total_keys).unwrap_or(0),
            total_usage: u64::try_from(summary.total_usage).unwrap_or(0),
            last_used: summary.last_used,
        }
    }
}
