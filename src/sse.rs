use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::body::ByteStream;
use crate::error::{ApiError, ServerReported};

/// Tag prefix the platform puts on identifiers in terminal import payloads.
const IMPORT_TAG_PREFIX: &str = "~u";

/// A parsed Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Optional event ID.
    pub id: Option<String>,
    /// Optional event type.
    pub event: Option<String>,
    /// Event data.
    pub data: String,
    /// Optional retry interval in milliseconds.
    pub retry: Option<u64>,
}

/// Stream of Server-Sent Events parsed incrementally from a byte stream.
///
/// Blocks are blank-line delimited; the parser buffers chunks and yields an
/// event as soon as a complete block has arrived, so progress events can be
/// observed while the terminal event is still in flight.
pub struct SseEventStream {
    inner: ByteStream,
    buffer: Vec<u8>,
}

impl SseEventStream {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
        }
    }

    /// Read the next SSE event from the stream.
    pub async fn next_event(&mut self) -> Result<Option<SseEvent>, ApiError> {
        loop {
            if let Some(event) = self.parse_buffered_event()? {
                return Ok(Some(event));
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                }
                Some(Err(e)) => return Err(e),
                None => {
                    // Stream ended; a trailing block without its blank-line
                    // terminator still counts as an event.
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let rest = std::mem::take(&mut self.buffer);
                    return Self::parse_event(&rest);
                }
            }
        }
    }

    /// Pop the next complete block off the buffer, if one has arrived.
    fn parse_buffered_event(&mut self) -> Result<Option<SseEvent>, ApiError> {
        loop {
            let Some((end, sep_len)) = self.find_block_end() else {
                return Ok(None);
            };

            let block: Vec<u8> = self.buffer.drain(..end + sep_len).collect();
            // A block may carry no data lines (comment-only); keep scanning.
            match Self::parse_event(&block[..end])? {
                Some(event) => return Ok(Some(event)),
                None => continue,
            }
        }
    }

    /// Find the blank-line separator ending the first block: `\n\n` or
    /// `\r\n\r\n`. Returns the block length and separator length.
    fn find_block_end(&self) -> Option<(usize, usize)> {
        let buf = &self.buffer;
        for i in 0..buf.len() {
            if buf[i] != b'\n' {
                continue;
            }
            if i + 1 < buf.len() && buf[i + 1] == b'\n' {
                return Some((i, 2));
            }
            if i + 2 < buf.len() && buf[i + 1] == b'\r' && buf[i + 2] == b'\n' {
                return Some((i, 3));
            }
        }
        None
    }

    /// Parse a single SSE block into an event.
    fn parse_event(block: &[u8]) -> Result<Option<SseEvent>, ApiError> {
        let text = std::str::from_utf8(block)
            .map_err(|e| ApiError::client_with("invalid UTF-8 in event stream", e))?;

        let mut id = None;
        let mut event = None;
        let mut data_lines = Vec::new();
        let mut retry = None;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');

            // Comments start with a colon.
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.find(':') {
                Some(pos) => (&line[..pos], line[pos + 1..].trim_start()),
                None => (line, ""),
            };

            match field {
                "id" => id = Some(value.to_string()),
                "event" => event = Some(value.to_string()),
                "data" => data_lines.push(value),
                "retry" => {
                    if let Ok(retry_val) = value.parse::<u64>() {
                        retry = Some(retry_val);
                    }
                }
                _ => {} // Ignore unknown fields
            }
        }

        if data_lines.is_empty() && event.is_none() {
            return Ok(None);
        }

        Ok(Some(SseEvent {
            id,
            event,
            data: data_lines.join("\n"),
            retry,
        }))
    }
}

/// Identifier record resolved from a successful import stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFile {
    pub file_id: String,
}

/// Drive an event stream to its terminal event and resolve the result.
///
/// `end` resolves the imported file identifier, `error` rejects with the
/// server payload as cause, and any other named event (progress updates and
/// the like) is observed and ignored. A stream that runs out of bytes before
/// a terminal event is a failure, never a silent success.
pub async fn resolve_import_stream(mut events: SseEventStream) -> Result<ImportedFile, ApiError> {
    while let Some(event) = events.next_event().await? {
        match event.event.as_deref() {
            Some("end") => return resolve_end_payload(&event.data),
            Some("error") => return Err(error_event(&event.data)),
            other => {
                tracing::trace!(event = other.unwrap_or("message"), "ignoring stream event");
            }
        }
    }
    Err(ApiError::client(
        "event stream ended unexpectedly without a result",
    ))
}

/// The terminal payload is a one-element JSON array holding a `~u`-tagged
/// identifier string. Anything else is reported with the literal payload.
fn resolve_end_payload(data: &str) -> Result<ImportedFile, ApiError> {
    let parsed: serde_json::Value =
        serde_json::from_str(data).map_err(|_| malformed_end_payload(data))?;
    let tagged = parsed
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item.as_str())
        .ok_or_else(|| malformed_end_payload(data))?;
    let file_id = tagged
        .strip_prefix(IMPORT_TAG_PREFIX)
        .ok_or_else(|| malformed_end_payload(data))?;

    Ok(ImportedFile {
        file_id: file_id.to_string(),
    })
}

fn malformed_end_payload(data: &str) -> ApiError {
    ApiError::client(format!("unexpected import result payload: {data}"))
}

fn error_event(data: &str) -> ApiError {
    let payload = serde_json::from_str::<serde_json::Value>(data)
        .unwrap_or_else(|_| serde_json::Value::String(data.to_string()));
    ApiError::client_with("event stream reported an error", ServerReported(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use serde_json::json;

    fn byte_stream(chunks: Vec<&'static str>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect::<Vec<_>>(),
        ))
    }

    #[tokio::test]
    async fn parses_simple_event() {
        let mut sse = SseEventStream::new(byte_stream(vec!["data: hello world\n\n"]));
        let event = sse.next_event().await.unwrap().unwrap();
        assert_eq!(event.data, "hello world");
        assert_eq!(event.id, None);
        assert_eq!(event.event, None);
    }

    #[tokio::test]
    async fn parses_named_event_split_across_chunks() {
        let mut sse = SseEventStream::new(byte_stream(vec![
            "event: prog",
            "ress\ndata: {\"done\":1}\n",
            "\n",
        ]));
        let event = sse.next_event().await.unwrap().unwrap();
        assert_eq!(event.event.as_deref(), Some("progress"));
        assert_eq!(event.data, "{\"done\":1}");
    }

    #[tokio::test]
    async fn joins_multiline_data() {
        let mut sse =
            SseEventStream::new(byte_stream(vec!["data: line 1\ndata: line 2\n\n"]));
        let event = sse.next_event().await.unwrap().unwrap();
        assert_eq!(event.data, "line 1\nline 2");
    }

    #[tokio::test]
    async fn handles_crlf_separators() {
        let mut sse = SseEventStream::new(byte_stream(vec![
            "event: end\r\ndata: [\"~uabc\"]\r\n\r\n",
        ]));
        let event = sse.next_event().await.unwrap().unwrap();
        assert_eq!(event.event.as_deref(), Some("end"));
        assert_eq!(event.data, "[\"~uabc\"]");
    }

    #[tokio::test]
    async fn skips_comment_blocks() {
        let mut sse = SseEventStream::new(byte_stream(vec![": keepalive\n\ndata: x\n\n"]));
        let event = sse.next_event().await.unwrap().unwrap();
        assert_eq!(event.data, "x");
    }

    #[tokio::test]
    async fn resolves_end_after_progress() {
        let sse = SseEventStream::new(byte_stream(vec![
            "event: progress\ndata: {\"section\":\"files\"}\n\n",
            "event: end\ndata: [\"~uabc-123\"]\n\n",
        ]));
        let imported = resolve_import_stream(sse).await.unwrap();
        assert_eq!(imported.file_id, "abc-123");
    }

    #[tokio::test]
    async fn premature_end_is_an_error() {
        let sse = SseEventStream::new(byte_stream(vec![
            "event: progress\ndata: {}\n\n",
            "event: progress\ndata: {}\n\n",
        ]));
        let err = resolve_import_stream(sse).await.unwrap_err();
        assert!(err.is_client());
        assert!(err.to_string().contains("ended unexpectedly"));
    }

    #[tokio::test]
    async fn malformed_end_names_the_payload() {
        let sse = SseEventStream::new(byte_stream(vec!["event: end\ndata: not-json\n\n"]));
        let err = resolve_import_stream(sse).await.unwrap_err();
        assert!(err.is_client());
        assert!(err.to_string().contains("not-json"));
    }

    #[tokio::test]
    async fn end_without_tag_prefix_is_an_error() {
        let sse = SseEventStream::new(byte_stream(vec!["event: end\ndata: [\"abc\"]\n\n"]));
        let err = resolve_import_stream(sse).await.unwrap_err();
        assert!(err.to_string().contains("[\"abc\"]"));
    }

    #[tokio::test]
    async fn end_with_empty_array_is_an_error() {
        let sse = SseEventStream::new(byte_stream(vec!["event: end\ndata: []\n\n"]));
        assert!(resolve_import_stream(sse).await.is_err());
    }

    #[tokio::test]
    async fn error_event_carries_json_cause() {
        let sse = SseEventStream::new(byte_stream(vec![
            "event: error\ndata: {\"code\":\"invalid-file\"}\n\n",
        ]));
        let err = resolve_import_stream(sse).await.unwrap_err();
        let cause = err
            .cause()
            .and_then(|c| c.downcast_ref::<ServerReported>())
            .unwrap();
        assert_eq!(cause.0, json!({"code": "invalid-file"}));
    }

    #[tokio::test]
    async fn error_event_falls_back_to_raw_text() {
        let sse = SseEventStream::new(byte_stream(vec!["event: error\ndata: it broke\n\n"]));
        let err = resolve_import_stream(sse).await.unwrap_err();
        let cause = err
            .cause()
            .and_then(|c| c.downcast_ref::<ServerReported>())
            .unwrap();
        assert_eq!(cause.0, json!("it broke"));
    }
}
