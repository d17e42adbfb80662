use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, header};

use crate::error::BoxError;
use crate::response::HttpResponse;
use crate::transport::{FormPart, HttpRequest, WireBody};

/// Pairwise interception point around the network call.
///
/// `on_request` hooks run in registration order before dispatch; `on_response`
/// hooks run in reverse registration order after it. The reversal is part of
/// the contract: the entry closest to the wire sees the request last and the
/// response first. Either hook may be omitted; the defaults pass the value
/// through untouched. A hook error aborts the pipeline and is reported as a
/// client-side failure naming the phase.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, BoxError> {
        Ok(request)
    }

    async fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, BoxError> {
        Ok(response)
    }
}

/// Name of the cookie the platform authenticates RPC calls with.
pub(crate) const AUTH_COOKIE: &str = "auth-token";

/// Built-in entry injecting the resolved credential.
///
/// The platform authenticates via a cookie convention, never a bearer
/// Authorization header.
pub(crate) struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn on_request(&self, mut request: HttpRequest) -> Result<HttpRequest, BoxError> {
        let value = HeaderValue::from_str(&format!("{AUTH_COOKIE}={}", self.token))?;
        request.headers.insert(header::COOKIE, value);
        Ok(request)
    }
}

/// Built-in entry logging both pipeline phases through `tracing`.
///
/// The credential value is redacted; streaming response bodies are reported
/// as a placeholder rather than consumed.
pub(crate) struct DebugMiddleware;

#[async_trait]
impl Middleware for DebugMiddleware {
    async fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, BoxError> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            headers = %format_headers(&request.headers),
            body = %describe_request_body(&request.body),
            "outgoing request"
        );
        Ok(request)
    }

    async fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, BoxError> {
        tracing::debug!(
            status = response.status().as_u16(),
            headers = %format_headers(response.headers()),
            body = %describe_response_body(&response),
            "received response"
        );
        Ok(response)
    }
}

fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            if *name == header::COOKIE {
                format!("{name}: {AUTH_COOKIE}=***")
            } else {
                format!("{name}: {}", value.to_str().unwrap_or("<binary>"))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_request_body(body: &WireBody) -> String {
    match body {
        WireBody::Empty => "<empty>".to_string(),
        WireBody::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        WireBody::Form(parts) => {
            let names: Vec<&str> = parts
                .iter()
                .map(|part| match part {
                    FormPart::Text { name, .. } | FormPart::File { name, .. } => name.as_str(),
                })
                .collect();
            format!("<multipart form: {}>", names.join(", "))
        }
    }
}

fn describe_response_body(response: &HttpResponse) -> String {
    match response.buffered_body() {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => "<streaming body>".to_string(),
    }
}
