//! JSON response encoding and plain-text error responses

use http::{HeaderValue, StatusCode, header};
use serde::Serialize;

use crate::sink::ResponseSink;

/// Write a JSON response: content-type header, status, serialized body
///
/// `None` produces a bodyless response (the content-type header is still
/// set, matching endpoints that return `204 No Content`). A serialization
/// failure is recovered locally: if the sink reports that nothing has been
/// handed to the transport yet, a generic 500 carrying the serializer's
/// message replaces the staged response; otherwise the failure is only
/// logged, since writing anything further would corrupt output already in
/// flight. Errors never reach the caller.
pub fn encode_json_response<T: Serialize>(
    value: Option<&T>,
    status: StatusCode,
    sink: &mut dyn ResponseSink,
) {
    sink.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );
    sink.set_status(status);

    let Some(value) = value else { return };

    match serde_json::to_vec(value) {
        Ok(body) => {
            if let Err(err) = sink.write_all(&body) {
                tracing::error!(error = %err, "failed to write JSON response body");
            }
        }
        Err(err) => {
            if sink.header_written() {
                tracing::error!(
                    error = %err,
                    "JSON serialization failed after the response started"
                );
            } else {
                plain_text_error(sink, StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
            }
        }
    }
}

/// Write a plain-text error response: `message` plus a trailing newline
///
/// Replaces any staged content-type. A failed body write is logged, not
/// propagated; this is a terminal operation like its JSON counterpart.
pub fn plain_text_error(sink: &mut dyn ResponseSink, status: StatusCode, message: &str) {
    let headers = sink.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    sink.set_status(status);

    if let Err(err) = sink
        .write_all(message.as_bytes())
        .and_then(|()| sink.write_all(b"\n"))
    {
        tracing::error!(error = %err, "failed to write error response body");
    }
}
