//! Error-adapting handler wrapper and the not-implemented placeholder

use bytes::Bytes;
use http::{Request, StatusCode};

use crate::encode::plain_text_error;
use crate::error::Result;
use crate::sink::{ResponseSink, TrackedSink};

/// Adapt a fallible handler into a standard no-fail handler
///
/// The fallible handler runs against a write-state-tracking view of the
/// sink. On success its output stands untouched. On failure the wrapper
/// chooses the observable response exactly once: if the handler already
/// started its response (status line or body bytes emitted, e.g. while
/// streaming), the error is only logged; otherwise it becomes a
/// plain-text response with the error's declared status, or 500 when the
/// error carries none.
pub fn catch_errors<F>(handler: F) -> impl Fn(&mut dyn ResponseSink, &Request<Bytes>)
where
    F: Fn(&mut dyn ResponseSink, &Request<Bytes>) -> Result<()>,
{
    move |sink, request| {
        let mut tracked = TrackedSink::new(sink);

        let Err(err) = handler(&mut tracked, request) else {
            return;
        };

        if tracked.header_written() {
            tracing::error!(
                error = %err,
                method = %request.method(),
                path = request.uri().path(),
                "handler failed after the response started"
            );
            return;
        }

        let status = err
            .status_code()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        plain_text_error(&mut tracked, status, &err.to_string());
    }
}

/// Placeholder handler for endpoints not yet built: 501, empty body
pub fn unimplemented(sink: &mut dyn ResponseSink, _request: &Request<Bytes>) -> Result<()> {
    sink.set_status(StatusCode::NOT_IMPLEMENTED);
    Ok(())
}
