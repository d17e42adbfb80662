use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, StatusCode, header};
use serde::de::DeserializeOwned;

use crate::body::ByteStream;
use crate::error::ApiError;
use crate::sse::SseEventStream;

/// How a response body is decoded, computed once from the declared content
/// type and then matched exhaustively. Exactly one decoding is ever applied
/// to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A data-interchange type (`application/json` or any `+json` suffix).
    Json,
    /// `application/octet-stream`; decoded as a raw byte buffer.
    Binary,
    /// `text/event-stream`; decoded through the event-stream extractor.
    EventStream,
    /// Everything else; decoded as plain text.
    Text,
}

impl ContentKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        Self::from_content_type(content_type)
    }

    pub fn from_content_type(value: &str) -> Self {
        let mime = value
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if mime == "application/json" || mime.ends_with("+json") {
            ContentKind::Json
        } else if mime == "application/octet-stream" {
            ContentKind::Binary
        } else if mime == "text/event-stream" {
            ContentKind::EventStream
        } else {
            ContentKind::Text
        }
    }
}

/// Received HTTP response, before decoding.
///
/// The body is either buffered (as middleware or tests construct it) or an
/// incremental stream (as the transport delivers it); consumers pick one
/// decoding and the body is consumed exactly once.
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

enum ResponseBody {
    Buffered(Bytes),
    Streaming(ByteStream),
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish()
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Buffered(bytes) => f
                .debug_tuple("ResponseBody::Buffered")
                .field(&bytes.len())
                .finish(),
            ResponseBody::Streaming(_) => write!(f, "ResponseBody::Streaming(..)"),
        }
    }
}

impl HttpResponse {
    /// Create a response around a streaming body.
    pub fn new(status: StatusCode, headers: HeaderMap, stream: ByteStream) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Streaming(stream),
        }
    }

    /// Create a response from buffered bytes.
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, bytes: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Buffered(bytes.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Content kind for this response, from the declared content type.
    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_headers(&self.headers)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.body, ResponseBody::Streaming(_))
    }

    /// Body bytes, if already buffered. Never consumes a stream.
    pub fn buffered_body(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Buffered(bytes) => Some(bytes),
            ResponseBody::Streaming(_) => None,
        }
    }

    /// Consume the response and return the entire body as bytes.
    pub async fn bytes(self) -> Result<Bytes, ApiError> {
        match self.body {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Streaming(mut stream) => {
                let mut buf = Vec::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(Bytes::from(buf))
            }
        }
    }

    /// Consume the response and return the body as a string.
    pub async fn text(self) -> Result<String, ApiError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ApiError::client_with("response body is not valid UTF-8", e))
    }

    /// Consume the response and deserialize the body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::client_with("failed to decode JSON response body", e))
    }

    /// Convert the response into a byte stream for streaming consumption.
    pub fn into_stream(self) -> ByteStream {
        match self.body {
            ResponseBody::Buffered(bytes) => {
                Box::pin(futures::stream::once(async move { Ok(bytes) }))
            }
            ResponseBody::Streaming(stream) => stream,
        }
    }

    /// Convert the response into a Server-Sent Events stream.
    pub fn into_sse_stream(self) -> SseEventStream {
        SseEventStream::new(self.into_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_content_types() {
        assert_eq!(
            ContentKind::from_content_type("application/json"),
            ContentKind::Json
        );
        assert_eq!(
            ContentKind::from_content_type("application/json; charset=utf-8"),
            ContentKind::Json
        );
        assert_eq!(
            ContentKind::from_content_type("application/problem+json"),
            ContentKind::Json
        );
        assert_eq!(
            ContentKind::from_content_type("application/octet-stream"),
            ContentKind::Binary
        );
        assert_eq!(
            ContentKind::from_content_type("text/event-stream"),
            ContentKind::EventStream
        );
        assert_eq!(ContentKind::from_content_type("text/plain"), ContentKind::Text);
        assert_eq!(ContentKind::from_content_type(""), ContentKind::Text);
    }

    #[test]
    fn buffered_body_decodes_once() {
        let res = HttpResponse::from_bytes(
            StatusCode::OK,
            HeaderMap::new(),
            serde_json::to_vec(&json!({"ok": true})).unwrap(),
        );
        let value: serde_json::Value = tokio_test::block_on(res.json()).unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn streamed_body_is_collected() {
        let chunks: Vec<Result<Bytes, ApiError>> =
            vec![Ok(Bytes::from_static(b"he")), Ok(Bytes::from_static(b"llo"))];
        let res = HttpResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Box::pin(futures::stream::iter(chunks)),
        );
        assert_eq!(tokio_test::block_on(res.text()).unwrap(), "hello");
    }
}
