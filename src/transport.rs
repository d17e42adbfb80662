use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, Method};

use crate::error::{ApiError, BoxError};
use crate::response::HttpResponse;

/// Fully-constructed outgoing request, as middleware and transports see it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: WireBody,
}

/// Outgoing body after shaping. Multipart parts stay inspectable here and are
/// only turned into the transport's native form at dispatch.
#[derive(Clone)]
pub enum WireBody {
    Empty,
    Bytes(Bytes),
    Form(Vec<FormPart>),
}

impl std::fmt::Debug for WireBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireBody::Empty => write!(f, "WireBody::Empty"),
            WireBody::Bytes(bytes) => f.debug_tuple("WireBody::Bytes").field(&bytes.len()).finish(),
            WireBody::Form(parts) => f.debug_tuple("WireBody::Form").field(&parts.len()).finish(),
        }
    }
}

/// One part of a multipart form body.
#[derive(Debug, Clone)]
pub enum FormPart {
    /// Plain text field.
    Text { name: String, value: String },
    /// File field.
    File {
        name: String,
        file_name: String,
        data: Bytes,
    },
}

/// Network transport dispatching one request to one response.
///
/// Passed to the executor explicitly rather than reached as an ambient
/// global, so tests can substitute a deterministic implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the network call. An `Err` here means no response was
    /// received; the executor wraps it as a client-side failure.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// Default transport backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with no internal timeout; cancellation and deadlines
    /// stay with the caller's task.
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::client_with("failed to build HTTP transport", e))?;
        Ok(Self { client })
    }

    /// Build a transport that aborts requests after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::client_with("failed to build HTTP transport", e))?;
        Ok(Self { client })
    }

    /// Wrap an already-configured `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);

        builder = match body {
            WireBody::Empty => builder,
            WireBody::Bytes(bytes) => builder.body(bytes),
            WireBody::Form(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = match part {
                        FormPart::Text { name, value } => form.text(name, value),
                        FormPart::File {
                            name,
                            file_name,
                            data,
                        } => form.part(
                            name,
                            reqwest::multipart::Part::bytes(data.to_vec())
                                .file_name(file_name)
                                .mime_str("application/octet-stream")?,
                        ),
                    };
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let stream = response
            .bytes_stream()
            .map(|item| item.map_err(|e| ApiError::client_with("error reading response body", e)));

        Ok(HttpResponse::new(status, headers, Box::pin(stream)))
    }
}
