pub mod api_key;
pub mod error;
pub mod metrics;
pub mod user;

pub use api_key::{ApiKey, CreateApiKeyRequest, ListKeysQuery};
pub use error::ErrorResponse;
pub use metrics::MetricsResponse;
pub use user::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, User};
