use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::request::{Call, Request};
use crate::services::{AuthService, FilesService, ProjectsService};
use crate::transport::{ReqwestTransport, Transport};

/// Entry point for talking to the platform.
///
/// Owns the immutable configuration and the transport, shared by reference
/// with every façade; concurrent calls are independent tasks with no shared
/// mutable state.
pub struct ArtboardClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl ArtboardClient {
    /// Create a client backed by the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client with a caller-supplied transport. This is how tests
    /// substitute a deterministic network.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Prepare an arbitrary request against the platform.
    ///
    /// Most callers go through the façades; this is the escape hatch for RPC
    /// commands without a wrapper yet.
    pub fn call<T>(&self, request: Request) -> Call<T> {
        Call::new(Arc::clone(&self.config), Arc::clone(&self.transport), request)
    }

    /// Authentication operations.
    pub fn auth(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.config), Arc::clone(&self.transport))
    }

    /// File operations, including binary import/export.
    pub fn files(&self) -> FilesService {
        FilesService::new(Arc::clone(&self.config), Arc::clone(&self.transport))
    }

    /// Project operations.
    pub fn projects(&self) -> ProjectsService {
        ProjectsService::new(Arc::clone(&self.config), Arc::clone(&self.transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let config = ClientConfig::new("http://localhost:9001", "test-token").unwrap();
        let client = ArtboardClient::new(config);
        assert!(client.is_ok());
    }
}
