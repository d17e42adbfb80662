//! Per-domain façades over the RPC API.
//!
//! Each method builds one [`crate::Request`] for one RPC command and returns
//! a [`crate::Call`]; all protocol behavior lives in the executor underneath.

mod auth;
mod files;
mod projects;

pub use auth::{AuthService, Profile};
pub use files::{ExportOptions, FileSummary, FilesService};
pub use projects::{Project, ProjectsService};

/// Path prefix every RPC command is posted to.
const RPC_COMMAND_PREFIX: &str = "/api/rpc/command";

pub(crate) fn command_path(command: &str) -> String {
    format!("{RPC_COMMAND_PREFIX}/{command}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_paths() {
        assert_eq!(
            command_path("login-with-password"),
            "/api/rpc/command/login-with-password"
        );
    }
}
