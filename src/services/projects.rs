use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::body::Body;
use crate::config::ClientConfig;
use crate::request::{Call, Request};
use crate::services::command_path;
use crate::services::files::FileSummary;
use crate::transport::Transport;

/// A project inside a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub team_id: Option<String>,
    pub name: String,
}

/// Project operations.
pub struct ProjectsService {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl ProjectsService {
    pub(crate) fn new(config: Arc<ClientConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    fn call<T>(&self, request: Request) -> Call<T> {
        Call::new(Arc::clone(&self.config), Arc::clone(&self.transport), request)
    }

    /// List the projects of a team.
    pub fn list_projects(&self, team_id: &str) -> Call<Vec<Project>> {
        self.call(Request::command(
            command_path("get-projects"),
            Body::Json(json!({ "teamId": team_id })),
        ))
    }

    pub fn create_project(&self, team_id: &str, name: &str) -> Call<Project> {
        self.call(Request::command(
            command_path("create-project"),
            Body::Json(json!({ "teamId": team_id, "name": name })),
        ))
    }

    pub fn rename_project(&self, id: &str, name: &str) -> Call<Project> {
        self.call(Request::command(
            command_path("rename-project"),
            Body::Json(json!({ "id": id, "name": name })),
        ))
    }

    pub fn delete_project(&self, id: &str) -> Call<serde_json::Value> {
        self.call(Request::command(
            command_path("delete-project"),
            Body::Json(json!({ "id": id })),
        ))
    }

    /// List the files of a project.
    pub fn list_project_files(&self, project_id: &str) -> Call<Vec<FileSummary>> {
        self.call(Request::command(
            command_path("get-project-files"),
            Body::Json(json!({ "projectId": project_id })),
        ))
    }
}
