use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::body::{Body, FileForm};
use crate::config::ClientConfig;
use crate::request::{Call, Request};
use crate::services::command_path;
use crate::sse::ImportedFile;
use crate::transport::Transport;

/// Summary record for a file inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: String,
    pub project_id: Option<String>,
    pub name: String,
}

/// Flags for a binary export. Both are honored as supplied; neither is ever
/// forced by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Include linked libraries in the exported archive.
    pub include_libraries: bool,
    /// Embed referenced assets instead of linking them.
    pub embed_assets: bool,
}

/// File operations, including binary import and export.
pub struct FilesService {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl FilesService {
    pub(crate) fn new(config: Arc<ClientConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    fn call<T>(&self, request: Request) -> Call<T> {
        Call::new(Arc::clone(&self.config), Arc::clone(&self.transport), request)
    }

    /// Fetch a file's full document payload.
    pub fn get_file(&self, id: &str) -> Call<serde_json::Value> {
        self.call(Request::command(
            command_path("get-file"),
            Body::Json(json!({ "id": id })),
        ))
    }

    /// Create an empty file inside a project.
    pub fn create_file(&self, project_id: &str, name: &str) -> Call<FileSummary> {
        self.call(Request::command(
            command_path("create-file"),
            Body::Json(json!({ "projectId": project_id, "name": name })),
        ))
    }

    pub fn rename_file(&self, id: &str, name: &str) -> Call<FileSummary> {
        self.call(Request::command(
            command_path("rename-file"),
            Body::Json(json!({ "id": id, "name": name })),
        ))
    }

    pub fn delete_file(&self, id: &str) -> Call<serde_json::Value> {
        self.call(Request::command(
            command_path("delete-file"),
            Body::Json(json!({ "id": id })),
        ))
    }

    /// Import a binary file archive into a project.
    ///
    /// The upload goes out as a multipart form and the server answers with an
    /// event stream: progress events while it ingests, then a terminal event
    /// resolving to the new file's identifier. Consume with
    /// [`Call::exec`].
    pub fn import_file(
        &self,
        project_id: &str,
        name: &str,
        data: impl Into<Bytes>,
    ) -> Call<ImportedFile> {
        let form = FileForm::new(data)
            .field("projectId", project_id)
            .field("name", name)
            .file_name(name);
        self.call(Request::command(
            command_path("import-binfile"),
            Body::FileForm(form),
        ))
    }

    /// Export a file as a binary archive. The response is
    /// `application/octet-stream`; consume with [`Call::exec_binary`].
    pub fn export_file(&self, file_id: &str, options: ExportOptions) -> Call<Bytes> {
        self.call(Request::command(
            command_path("export-binfile"),
            Body::Json(json!({
                "fileId": file_id,
                "includeLibraries": options.include_libraries,
                "embedAssets": options.embed_assets,
            })),
        ))
    }
}
