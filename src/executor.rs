use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, header};
use serde::de::DeserializeOwned;

use crate::body::Body;
use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorDetails};
use crate::middleware::{AuthMiddleware, DebugMiddleware, Middleware};
use crate::request::Request;
use crate::response::ContentKind;
use crate::sse::{ImportedFile, resolve_import_stream};
use crate::transport::{FormPart, HttpRequest, Transport, WireBody};

/// Form-field name the file part of an upload is sent under.
const FILE_FIELD: &str = "file";
/// File name used when an upload carries no logical name.
const UNTITLED: &str = "untitled";

/// Decoded success payload, one variant per content kind.
#[derive(Debug)]
pub enum Payload {
    Json(serde_json::Value),
    Binary(Bytes),
    Imported(ImportedFile),
    Text(String),
}

impl Payload {
    /// Convert into a caller-specified deserializable type. Binary payloads
    /// have no JSON representation and must be consumed as bytes.
    pub(crate) fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Payload::Json(value) => value,
            Payload::Imported(imported) => serde_json::to_value(imported)
                .map_err(|e| ApiError::client_with("failed to convert import result", e))?,
            Payload::Text(text) => serde_json::Value::String(text),
            Payload::Binary(_) => {
                return Err(ApiError::client(
                    "binary response; consume it with exec_binary",
                ));
            }
        };
        serde_json::from_value(value)
            .map_err(|e| ApiError::client_with("failed to decode response into expected type", e))
    }

    pub(crate) fn into_bytes(self) -> Result<Bytes, ApiError> {
        match self {
            Payload::Binary(bytes) => Ok(bytes),
            Payload::Json(_) | Payload::Imported(_) | Payload::Text(_) => {
                Err(ApiError::client("expected a binary response"))
            }
        }
    }
}

/// Execute one request through the full pipeline: body shaping, credential
/// resolution, the middleware chain, dispatch, status check, and exactly one
/// content decode. The sole raiser of both error kinds; it never retries and
/// never downgrades a failure.
pub(crate) async fn execute(
    config: &ClientConfig,
    transport: &dyn Transport,
    request: Request,
) -> Result<Payload, ApiError> {
    let (method, path, mut headers, body, token_override) = request.into_parts();

    let wire_body = shape_body(body, &mut headers)?;

    let token = token_override.unwrap_or_else(|| config.access_token().to_string());

    // Built-in entries wrap the user-supplied chain: auth first, diagnostics
    // next when enabled, then user entries in registration order.
    let mut chain: Vec<Arc<dyn Middleware>> = Vec::with_capacity(config.middleware().len() + 2);
    chain.push(Arc::new(AuthMiddleware::new(token)));
    if config.debug() {
        chain.push(Arc::new(DebugMiddleware));
    }
    chain.extend(config.middleware().iter().cloned());

    let mut outgoing = HttpRequest {
        method,
        url: format!("{}{}", config.base_url(), path),
        headers,
        body: wire_body,
    };

    for entry in &chain {
        outgoing = entry
            .on_request(outgoing)
            .await
            .map_err(|e| ApiError::client_with("Middleware onRequest error", e))?;
    }

    let mut response = transport
        .send(outgoing)
        .await
        .map_err(|e| ApiError::client_with("Network request failed", e))?;

    // Response phase traverses the same chain in reverse.
    for entry in chain.iter().rev() {
        response = entry
            .on_response(response)
            .await
            .map_err(|e| ApiError::client_with("Middleware onResponse error", e))?;
    }

    let status = response.status();
    if status.as_u16() >= 400 {
        let body = response.bytes().await?;
        return Err(ApiError::http(status, ErrorDetails::from_body(&body)));
    }

    match response.content_kind() {
        ContentKind::Json => Ok(Payload::Json(response.json().await?)),
        ContentKind::Binary => Ok(Payload::Binary(response.bytes().await?)),
        ContentKind::EventStream => Ok(Payload::Imported(
            resolve_import_stream(response.into_sse_stream()).await?,
        )),
        ContentKind::Text => Ok(Payload::Text(response.text().await?)),
    }
}

/// Shape the caller-level body into its wire form.
///
/// File-bearing bodies become multipart forms: non-file fields renamed
/// camelCase to kebab-case, the file part appended last. JSON bodies get a
/// content type only when the caller has not set one. The multipart content
/// type (with boundary) is the transport's job.
fn shape_body(body: Body, headers: &mut HeaderMap) -> Result<WireBody, ApiError> {
    match body {
        Body::Empty => Ok(WireBody::Empty),
        Body::Bytes(bytes) => Ok(WireBody::Bytes(bytes)),
        Body::Json(value) => {
            let bytes = serde_json::to_vec(&value)
                .map_err(|e| ApiError::client_with("failed to serialize request body", e))?;
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            Ok(WireBody::Bytes(Bytes::from(bytes)))
        }
        Body::FileForm(form) => {
            let (fields, file_name, data) = form.into_parts();
            let mut parts: Vec<FormPart> = fields
                .into_iter()
                .map(|(name, value)| FormPart::Text {
                    name: camel_to_kebab(&name),
                    value,
                })
                .collect();
            parts.push(FormPart::File {
                name: FILE_FIELD.to_string(),
                file_name: file_name.unwrap_or_else(|| UNTITLED.to_string()),
                data,
            });
            Ok(WireBody::Form(parts))
        }
    }
}

fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::FileForm;
    use serde_json::json;

    #[test]
    fn kebab_conversion() {
        assert_eq!(camel_to_kebab("projectId"), "project-id");
        assert_eq!(camel_to_kebab("includeLibraries"), "include-libraries");
        assert_eq!(camel_to_kebab("name"), "name");
        assert_eq!(camel_to_kebab("embedAssets"), "embed-assets");
    }

    #[test]
    fn json_body_sets_content_type() {
        let mut headers = HeaderMap::new();
        let body = shape_body(Body::Json(json!({"a": 1})), &mut headers).unwrap();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        match body {
            WireBody::Bytes(bytes) => assert_eq!(&bytes[..], br#"{"a":1}"#),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn json_body_keeps_caller_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/transit+json"),
        );
        shape_body(Body::Json(json!({})), &mut headers).unwrap();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/transit+json"
        );
    }

    #[test]
    fn file_form_shapes_fields_and_appends_file_last() {
        let mut headers = HeaderMap::new();
        let form = FileForm::new(Bytes::from_static(b"\x01\x02"))
            .field("projectId", "p-1")
            .field("name", "mockups")
            .file_name("mockups");
        let body = shape_body(Body::FileForm(form), &mut headers).unwrap();

        let WireBody::Form(parts) = body else {
            panic!("expected a form body");
        };
        assert_eq!(parts.len(), 3);
        match &parts[0] {
            FormPart::Text { name, value } => {
                assert_eq!(name, "project-id");
                assert_eq!(value, "p-1");
            }
            other => panic!("unexpected part: {other:?}"),
        }
        match &parts[2] {
            FormPart::File {
                name,
                file_name,
                data,
            } => {
                assert_eq!(name, "file");
                assert_eq!(file_name, "mockups");
                assert_eq!(&data[..], b"\x01\x02");
            }
            other => panic!("unexpected part: {other:?}"),
        }
        // Multipart content type (with boundary) is set at dispatch.
        assert!(headers.get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn file_form_without_name_falls_back_to_untitled() {
        let mut headers = HeaderMap::new();
        let form = FileForm::new(Bytes::from_static(b"x"));
        let body = shape_body(Body::FileForm(form), &mut headers).unwrap();
        let WireBody::Form(parts) = body else {
            panic!("expected a form body");
        };
        match &parts[0] {
            FormPart::File { file_name, .. } => assert_eq!(file_name, "untitled"),
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn typed_conversion_rejects_binary() {
        let payload = Payload::Binary(Bytes::from_static(b"\x00"));
        let err = payload.into_typed::<serde_json::Value>().unwrap_err();
        assert!(err.is_client());
    }

    #[test]
    fn imported_payload_converts_through_serde() {
        let payload = Payload::Imported(ImportedFile {
            file_id: "abc-123".to_string(),
        });
        let imported: ImportedFile = payload.into_typed().unwrap();
        assert_eq!(imported.file_id, "abc-123");
    }
}
