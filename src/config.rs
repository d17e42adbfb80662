use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::Middleware;

/// Environment variable for the platform base URL.
const ENV_BASE_URL: &str = "ARTBOARD_BASE_URL";
/// Environment variable for the access token.
const ENV_ACCESS_TOKEN: &str = "ARTBOARD_ACCESS_TOKEN";
/// Base URL used when the environment does not name one.
const DEFAULT_BASE_URL: &str = "https://design.artboard.io";

/// Immutable per-client settings, shared by reference across every façade
/// and every request made through them.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    access_token: String,
    middleware: Vec<Arc<dyn Middleware>>,
    debug: bool,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .field("middleware", &self.middleware.len())
            .field("debug", &self.debug)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration. Both the base URL and the access credential
    /// are required and must be non-empty.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let access_token = access_token.into();

        if base_url.trim().is_empty() {
            return Err(ApiError::client("base URL must not be empty"));
        }
        if access_token.is_empty() {
            return Err(ApiError::client("access token must not be empty"));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            middleware: Vec::new(),
            debug: false,
        })
    }

    /// Create a configuration from environment variables.
    ///
    /// Expects:
    /// - `ARTBOARD_BASE_URL`: platform base URL (defaulted when unset)
    /// - `ARTBOARD_ACCESS_TOKEN`: access credential (required)
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let access_token = std::env::var(ENV_ACCESS_TOKEN)
            .map_err(|_| ApiError::client(format!("{ENV_ACCESS_TOKEN} not set")))?;

        Self::new(base_url, access_token)
    }

    /// Append a user-supplied middleware entry. Entries run in registration
    /// order on the request phase and reverse order on the response phase.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Enable the built-in diagnostic-logging middleware.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_base_url() {
        assert!(ClientConfig::new("", "tok").is_err());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(ClientConfig::new("http://localhost", "").is_err());
    }

    #[test]
    fn trims_trailing_slash() {
        let config = ClientConfig::new("http://localhost:9001/", "tok").unwrap();
        assert_eq!(config.base_url(), "http://localhost:9001");
    }

    #[test]
    fn from_env_requires_token() {
        temp_env::with_vars(
            [
                (ENV_BASE_URL, None::<&str>),
                (ENV_ACCESS_TOKEN, None::<&str>),
            ],
            || {
                assert!(ClientConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn from_env_defaults_base_url() {
        temp_env::with_vars(
            [
                (ENV_BASE_URL, None),
                (ENV_ACCESS_TOKEN, Some("env-token")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url(), DEFAULT_BASE_URL);
                assert_eq!(config.access_token(), "env-token");
            },
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = ClientConfig::new("http://localhost", "secret").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
    }
}
