//! Axum route handlers for the Ingestion API.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    extract::{Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt};
use tracing::warn;

use crate::errors::AppError;
use crate::ingestion::progress::{NoProgress, ProgressEvent, ProgressSink};
use crate::ingestion::types::{ExtractionResult, UploadedDocument};
use crate::state::AppState;

/// Name of the multipart part carrying the file.
pub const FILE_FIELD: &str = "file";

/// Splits a multipart body into the uploaded file and the remaining text fields.
pub async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(UploadedDocument, HashMap<String, String>), AppError> {
    let mut document = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let mime_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            document = Some(UploadedDocument {
                bytes,
                mime_type,
                file_name,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid field '{name}': {e}")))?;
            fields.insert(name, value);
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation(format!("Missing '{FILE_FIELD}' part")))?;
    Ok((document, fields))
}

/// POST /api/v1/documents/extract
///
/// Extracts text from an uploaded PDF or DOCX and returns it in one response.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, AppError> {
    let (document, _) = read_multipart(multipart).await?;
    let result = state.extractor.extract_blocking(document, NoProgress).await?;
    Ok(Json(result))
}

/// POST /api/v1/documents/extract/stream
///
/// Same as `handle_extract`, streamed as Server-Sent Events: zero or more
/// `progress` events, then exactly one `result` or `error` event.
pub async fn handle_extract_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let (document, _) = read_multipart(multipart).await?;
    let (tx, rx) = mpsc::unbounded_channel();

    let extractor = state.extractor.clone();
    tokio::spawn(async move {
        let outcome = extractor
            .extract_blocking(document, SseProgress(tx.clone()))
            .await;
        let last = match outcome {
            Ok(result) => sse_event("result", &result),
            Err(e) => {
                warn!("Streaming extraction failed: {e}");
                sse_event("error", &json!({ "code": e.code(), "message": e.to_string() }))
            }
        };
        let _ = tx.send(last);
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Forwards pipeline progress into the SSE channel.
struct SseProgress(UnboundedSender<Event>);

impl ProgressSink for SseProgress {
    fn emit(&mut self, event: ProgressEvent) {
        let _ = self.0.send(sse_event("progress", &event));
    }
}

fn sse_event<T: Serialize>(name: &str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}
