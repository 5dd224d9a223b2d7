use utoipa::openapi::security::{
    ApiKey as ApiKeyScheme, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::handlers::{auth, health, keys, metrics, users};
use crate::models::{
    ApiKey, CreateApiKeyRequest, ErrorResponse, LoginRequest, LoginResponse, MetricsResponse,
    RegisterRequest, UpdateUserRequest, User,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKeyScheme::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// Generate the OpenAPI documentation for the entire API
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        health::check,

        // Auth endpoints
        auth::register,
        auth::login,
        auth::me,
        users::update_me,

        // API key endpoints
        keys::list_keys,
        keys::create_key,
        keys::delete_key,
        metrics::get_metrics,
    ),
    components(
        schemas(
            health::HealthResponse,
            User,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateUserRequest,
            ApiKey,
            CreateApiKeyRequest,
            MetricsResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and the current session"),
        (name = "users", description = "Profile management"),
        (name = "keys", description = "API key management. A key is shown in full only once, when created."),
        (name = "metrics", description = "API key usage totals"),
    )
)]
pub struct ApiDoc;

/// Prefix the handler path attributes are written against
const DOCUMENTED_PREFIX: &str = "/api";

/// OpenAPI document with paths rewritten for the configured API prefix
pub fn api_doc(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if api_prefix == DOCUMENTED_PREFIX {
        return doc;
    }

    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| {
            let rest = path
                .strip_prefix(DOCUMENTED_PREFIX)
                .filter(|rest| rest.starts_with('/'));
            match rest {
                Some(rest) => (format!("{api_prefix}{rest}"), item),
                None => (path, item),
            }
        })
        .collect();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/users/me",
            "/api/keys",
            "/api/keys/{id}",
            "/api/metrics",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_api_doc_follows_configured_prefix() {
        let doc = api_doc("/v2");
        assert!(doc.paths.paths.contains_key("/v2/keys/{id}"));
        assert!(doc.paths.paths.contains_key("/v2/auth/login"));
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(!doc.paths.paths.keys().any(|p| p.starts_with("/api/")));

        let default_doc = api_doc("/api");
        assert!(default_doc
            .paths
            .paths
            .keys()
            .eq(ApiDoc::openapi().paths.paths.keys()));
    }
}
