use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;

use crate::body::Body;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::executor::{self, Payload};
use crate::result::ApiResult;
use crate::transport::Transport;

/// One call's configuration: method, path relative to the base URL, headers,
/// body, and an optional per-call credential override. Consumed by a single
/// execution; not reusable across calls.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Body,
    token_override: Option<String>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// An RPC command invocation: `POST` to a fixed path with the given body.
    pub(crate) fn command(path: String, body: Body) -> Self {
        Request {
            method: Method::POST,
            path,
            headers: HeaderMap::new(),
            body,
            token_override: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (Method, String, HeaderMap, Body, Option<String>) {
        (
            self.method,
            self.path,
            self.headers,
            self.body,
            self.token_override,
        )
    }
}

/// Builder for constructing requests with a fluent API.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    headers: HeaderMap,
    body: Body,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a header. Keys are case-insensitive; the last write wins.
    pub fn header<K, V>(mut self, key: K, value: V) -> Result<Self, ApiError>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Display,
        V::Error: std::fmt::Display,
    {
        let key = key
            .try_into()
            .map_err(|e| ApiError::client(format!("invalid header name: {e}")))?;
        let value = value
            .try_into()
            .map_err(|e| ApiError::client(format!("invalid header value: {e}")))?;
        self.headers.insert(key, value);
        Ok(self)
    }

    /// Set a JSON body. The content-type header is applied at execution
    /// unless one was set explicitly.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, ApiError> {
        self.body = Body::json(value)?;
        Ok(self)
    }

    pub fn body<B: Into<Body>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, ApiError> {
        let method = self.method.unwrap_or(Method::GET);
        let path = self
            .path
            .ok_or_else(|| ApiError::client("request path is required"))?;

        Ok(Request {
            method,
            path,
            headers: self.headers,
            body: self.body,
            token_override: None,
        })
    }
}

/// A prepared call: one request plus the shared client configuration and
/// transport, with late per-call overrides.
///
/// `exec` never propagates a raised error; every failure lands in the error
/// branch of the returned [`ApiResult`], so consuming call sites need no
/// `?`/`match`-on-error plumbing.
pub struct Call<T> {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    request: Request,
    expects: PhantomData<fn() -> T>,
}

impl<T> Call<T> {
    pub(crate) fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        request: Request,
    ) -> Self {
        Self {
            config,
            transport,
            request,
            expects: PhantomData,
        }
    }

    /// Override the credential for this call only.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.request.token_override = Some(token.into());
        self
    }

    /// Add or overwrite one header for this call only. Keys are
    /// case-insensitive; the last write wins.
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Result<Self, ApiError>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Display,
        V::Error: std::fmt::Display,
    {
        let key = key
            .try_into()
            .map_err(|e| ApiError::client(format!("invalid header name: {e}")))?;
        let value = value
            .try_into()
            .map_err(|e| ApiError::client(format!("invalid header value: {e}")))?;
        self.request.headers.insert(key, value);
        Ok(self)
    }

    /// Execute and consume the response as raw bytes (binary exports).
    pub async fn exec_binary(self) -> ApiResult<Bytes> {
        executor::execute(&self.config, self.transport.as_ref(), self.request)
            .await
            .and_then(Payload::into_bytes)
            .into()
    }
}

impl<T: DeserializeOwned> Call<T> {
    /// Execute and decode the response into the expected type.
    pub async fn exec(self) -> ApiResult<T> {
        executor::execute(&self.config, self.transport.as_ref(), self.request)
            .await
            .and_then(Payload::into_typed)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_defaults_to_get() {
        let request = Request::builder().path("/api/rpc/command/get-profile").build().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert!(request.body().is_empty());
    }

    #[test]
    fn builder_requires_a_path() {
        assert!(Request::builder().method(Method::POST).build().is_err());
    }

    #[test]
    fn headers_are_case_insensitive_last_write_wins() {
        let request = Request::builder()
            .path("/x")
            .header("X-Trace", "one")
            .unwrap()
            .header("x-trace", "two")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers().get("x-trace").unwrap(), "two");
    }

    #[test]
    fn json_body_is_stored_unserialized() {
        let request = Request::builder()
            .path("/x")
            .json(&json!({"name": "mockups"}))
            .unwrap()
            .build()
            .unwrap();
        match request.body() {
            Body::Json(value) => assert_eq!(value, &json!({"name": "mockups"})),
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
