//! Typed async client for the Artboard design platform's RPC-style HTTP API.
//!
//! The crate wraps authentication, file import/export, and project
//! operations behind service façades, normalizing request construction,
//! header handling, response-format detection, and error reporting:
//!
//! - Requests flow through an ordered middleware chain (built-in credential
//!   injection and optional debug logging, then user entries); response
//!   hooks traverse the same chain in reverse.
//! - Responses are classified once by declared content type (JSON, binary,
//!   event stream, or text) and decoded exactly one way.
//! - Binary imports stream back as Server-Sent Events; the terminal event is
//!   resolved into the new file's identifier.
//! - Every call lands in a two-branch [`ApiResult`]: data or an inspectable
//!   [`ApiError`], never an escaping panic or raw `Err`.
//!
//! # Examples
//!
//! ## Fetch a profile
//!
//! ```no_run
//! use artboard_client::{ArtboardClient, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://design.artboard.io", "access-token")?;
//! let client = ArtboardClient::new(config)?;
//!
//! let result = client.auth().get_profile().exec().await;
//! match (result.data(), result.error()) {
//!     (Some(profile), _) => println!("logged in as {}", profile.email),
//!     (_, Some(error)) => eprintln!("call failed: {error}"),
//!     _ => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Import a binary file archive
//!
//! ```no_run
//! use artboard_client::{ArtboardClient, ClientConfig};
//!
//! # async fn example(data: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArtboardClient::new(ClientConfig::from_env()?)?;
//!
//! let result = client
//!     .files()
//!     .import_file("project-id", "mockups", data)
//!     .exec()
//!     .await;
//!
//! if let Some(imported) = result.data() {
//!     println!("imported as {}", imported.file_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Export with per-call overrides
//!
//! ```no_run
//! use artboard_client::{ArtboardClient, ClientConfig, ExportOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArtboardClient::new(ClientConfig::from_env()?)?;
//!
//! let result = client
//!     .files()
//!     .export_file(
//!         "file-id",
//!         ExportOptions {
//!             include_libraries: true,
//!             embed_assets: false,
//!         },
//!     )
//!     .with_token("scoped-token")
//!     .exec_binary()
//!     .await;
//!
//! let archive = result.into_result()?;
//! std::fs::write("export.bin", &archive)?;
//! # Ok(())
//! # }
//! ```

mod body;
mod client;
mod config;
mod error;
mod executor;
mod middleware;
mod request;
mod response;
mod result;
mod services;
mod sse;
mod transport;

// Re-export public API
pub use body::{Body, ByteStream, FileForm};
pub use client::ArtboardClient;
pub use config::ClientConfig;
pub use error::{ApiError, BoxError, ErrorDetails, ServerReported};
pub use middleware::Middleware;
pub use request::{Call, Request, RequestBuilder};
pub use response::{ContentKind, HttpResponse};
pub use result::ApiResult;
pub use services::{
    AuthService, ExportOptions, FileSummary, FilesService, Profile, Project, ProjectsService,
};
pub use sse::{ImportedFile, SseEvent, SseEventStream, resolve_import_stream};
pub use transport::{FormPart, HttpRequest, ReqwestTransport, Transport, WireBody};

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};
