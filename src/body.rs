use bytes::Bytes;
use futures::stream::Stream;
use serde::Serialize;
use std::pin::Pin;

use crate::error::ApiError;

/// Boxed byte stream used for incremental response bodies.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send + 'static>>;

/// Request body as supplied by a caller or façade, before wire shaping.
pub enum Body {
    /// No body.
    Empty,
    /// Structured value serialized as JSON at dispatch.
    Json(serde_json::Value),
    /// Raw binary payload, sent as-is.
    Bytes(Bytes),
    /// File-bearing mapping, sent as a multipart form.
    FileForm(FileForm),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => write!(f, "Body::Empty"),
            Body::Json(value) => f.debug_tuple("Body::Json").field(value).finish(),
            Body::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(&bytes.len()).finish(),
            Body::FileForm(form) => f.debug_tuple("Body::FileForm").field(form).finish(),
        }
    }
}

impl Body {
    pub fn empty() -> Self {
        Body::Empty
    }

    /// Create a JSON body from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ApiError::client_with("failed to serialize request body", e))?;
        Ok(Body::Json(value))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<FileForm> for Body {
    fn from(form: FileForm) -> Self {
        Body::FileForm(form)
    }
}

/// A file upload plus its accompanying string fields.
///
/// Field names are kept in the caller's camelCase here; the executor converts
/// them to the platform's kebab-case form-field convention when shaping the
/// outgoing multipart body.
#[derive(Debug, Clone)]
pub struct FileForm {
    fields: Vec<(String, String)>,
    file_name: Option<String>,
    data: Bytes,
}

impl FileForm {
    pub fn new(data: impl Into<Bytes>) -> Self {
        FileForm {
            fields: Vec::new(),
            file_name: None,
            data: data.into(),
        }
    }

    /// Add a non-file field. Order of insertion is preserved.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Logical name of the uploaded file.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn file_name_ref(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, String)>, Option<String>, Bytes) {
        (self.fields, self.file_name, self.data)
    }
}
