use anyhow::{Context, Result};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use url::Url;
use validator::Validate;

/// Variables that have no sensible default and must be present.
const REQUIRED_VARS: &[&str] = &["DATABASE_URL", "JWT_SECRET"];

#[derive(Debug, Clone, Validate)]
pub struct Settings {
    #[validate]
    pub server: ServerSettings,
    #[validate]
    pub database: DatabaseSettings,
    #[validate]
    pub auth: AuthSettings,
    /// Fallback tracing filter when `RUST_LOG` is not set
    pub log_level: Option<String>,
}

/// Read from `SERVER_*` variables.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct ServerSettings {
    #[serde(default = "default_listen_address")]
    #[validate(custom = "validate_socket_addr")]
    pub listen_address: String,
    #[serde(default = "default_api_prefix")]
    #[validate(custom = "validate_api_prefix")]
    pub api_prefix: String,
}

/// Read from `DATABASE_*` variables.
#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_database_settings"))]
pub struct DatabaseSettings {
    pub url: Secret<String>,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

/// Read from `JWT_*` variables.
#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_auth_settings"))]
pub struct AuthSettings {
    #[serde(rename = "secret")]
    pub jwt_secret: Secret<String>,
    #[serde(rename = "expiration_seconds", default = "default_jwt_expiration_seconds")]
    #[validate(range(min = 300))] // Minimum 5 minutes
    pub jwt_expiration_seconds: u64,
}

fn default_listen_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_seconds() -> u64 {
    30
}

fn default_jwt_expiration_seconds() -> u64 {
    86400 // 1 day
}

impl Settings {
    /// Load configuration from the process environment, after reading `.env` if present.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build settings from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        Self::check_required_vars(&vars)?;

        let server = envy::prefixed("SERVER_")
            .from_iter::<_, ServerSettings>(vars.clone())
            .context("Invalid SERVER_* configuration")?;
        let database = envy::prefixed("DATABASE_")
            .from_iter::<_, DatabaseSettings>(vars.clone())
            .context("Invalid DATABASE_* configuration")?;
        let auth = envy::prefixed("JWT_")
            .from_iter::<_, AuthSettings>(vars.clone())
            .context("Invalid JWT_* configuration")?;

        let settings = Settings {
            server,
            database,
            auth,
            log_level: vars.get("LOG_LEVEL").filter(|v| !v.is_empty()).cloned(),
        };

        settings
            .validate_all()
            .context("Configuration validation failed")?;

        Ok(settings)
    }

    fn check_required_vars(vars: &HashMap<String, String>) -> Result<()> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| vars.get(*name).map_or(true, |v| v.is_empty()))
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}. Please check your .env file or environment configuration.",
                missing.join(", ")
            );
        }

        Ok(())
    }

    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_address
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", self.listen_address))
    }
}

impl DatabaseSettings {
    /// Connection URL with the password replaced, safe to log.
    pub fn redacted_url(&self) -> String {
        match Url::parse(self.url.expose_secret()) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("redacted"));
                }
                url.to_string()
            }
            Err(_) => "[invalid url]".to_string(),
        }
    }
}

fn validate_socket_addr(addr: &str) -> Result<(), validator::ValidationError> {
    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_socket_address"))
}

fn validate_api_prefix(prefix: &str) -> Result<(), validator::ValidationError> {
    if prefix.starts_with('/') && !prefix.ends_with('/') {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_api_prefix"))
    }
}

fn validate_database_settings(db: &DatabaseSettings) -> Result<(), validator::ValidationError> {
    let url = Url::parse(db.url.expose_secret())
        .map_err(|_| validator::ValidationError::new("invalid_database_url"))?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(validator::ValidationError::new("unsupported_database_scheme"));
    }
    if db.min_connections > db.max_connections {
        return Err(validator::ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}

fn validate_auth_settings(auth: &AuthSettings) -> Result<(), validator::ValidationError> {
    if auth.jwt_secret.expose_secret().len() < 16 {
        return Err(validator::ValidationError::new("jwt_secret_too_short"));
    }
    Ok(())
}
