use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::body::Body;
use crate::config::ClientConfig;
use crate::request::{Call, Request};
use crate::services::command_path;
use crate::transport::Transport;

/// Profile of the authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub fullname: Option<String>,
}

/// Authentication operations.
///
/// The credential contract is explicit: callers obtain a token out of band
/// and supply it through [`ClientConfig`] or [`Call::with_token`]; the client
/// never assumes the platform mints session cookies on its behalf.
pub struct AuthService {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl AuthService {
    pub(crate) fn new(config: Arc<ClientConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    fn call<T>(&self, request: Request) -> Call<T> {
        Call::new(Arc::clone(&self.config), Arc::clone(&self.transport), request)
    }

    /// Authenticate with an email/password pair.
    pub fn login_with_password(&self, email: &str, password: &str) -> Call<Profile> {
        self.call(Request::command(
            command_path("login-with-password"),
            Body::Json(json!({ "email": email, "password": password })),
        ))
    }

    /// Invalidate the current session on the platform side.
    pub fn logout(&self) -> Call<serde_json::Value> {
        self.call(Request::command(
            command_path("logout"),
            Body::Json(json!({})),
        ))
    }

    /// Fetch the profile the configured credential belongs to.
    pub fn get_profile(&self) -> Call<Profile> {
        self.call(Request::command(
            command_path("get-profile"),
            Body::Json(json!({})),
        ))
    }
}
