//! Response sink abstraction, write-state tracking, and an in-memory sink

use std::io;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// Minimal shape of a transport's response writer
///
/// Handlers and the encoding helpers only ever talk to this trait, which
/// keeps them decoupled from the concrete transport. The hosting server
/// (or the axum bridge in [`crate::route`]) supplies the implementation.
pub trait ResponseSink {
    /// Response headers, mutable until the transport flushes them
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Emit the response status line
    fn set_status(&mut self, status: StatusCode);

    /// Emit body bytes, returning how many were written
    fn write_body(&mut self, chunk: &[u8]) -> io::Result<usize>;

    /// Write an entire chunk, retrying short writes
    fn write_all(&mut self, mut chunk: &[u8]) -> io::Result<()> {
        while !chunk.is_empty() {
            match self.write_body(chunk) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole response body",
                    ));
                }
                Ok(written) => chunk = &chunk[written..],
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Whether the status line or any body byte has been handed to the
    /// transport
    ///
    /// Sinks that do not track write state report `false`; [`TrackedSink`]
    /// overrides this with its recorded flag.
    fn header_written(&self) -> bool {
        false
    }
}

/// Write-state tracking decorator over a response sink
///
/// Records whether the status line or body has been emitted, so that a
/// handler which failed after it already started its response (e.g. while
/// streaming events) cannot produce a second, superfluous status write.
/// Created per request; once the flag is set it stays set for the sink's
/// lifetime.
pub struct TrackedSink<'a> {
    inner: &'a mut dyn ResponseSink,
    header_written: bool,
}

impl<'a> TrackedSink<'a> {
    /// Wrap a sink with a fresh write-state flag
    pub fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self {
            inner,
            header_written: false,
        }
    }

    /// Shared access to the wrapped sink
    pub fn get_ref(&self) -> &dyn ResponseSink {
        self.inner
    }

    /// Mutable access to the wrapped sink
    ///
    /// Writes made through the returned reference bypass tracking.
    pub fn get_mut(&mut self) -> &mut dyn ResponseSink {
        self.inner
    }

    /// Unwrap into the underlying sink, for transport facilities that need
    /// the concrete writer
    pub fn into_inner(self) -> &'a mut dyn ResponseSink {
        self.inner
    }
}

impl ResponseSink for TrackedSink<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn set_status(&mut self, status: StatusCode) {
        if self.header_written {
            tracing::warn!(
                status = status.as_u16(),
                "skipping duplicate status write, headers already sent"
            );
            return;
        }
        self.header_written = true;
        self.inner.set_status(status);
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<usize> {
        // A body write finalizes headers even when set_status was never
        // called, matching transports that default the status on first write.
        self.header_written = true;
        self.inner.write_body(chunk)
    }

    fn header_written(&self) -> bool {
        self.header_written
    }
}

/// In-memory sink that assembles a complete `http::Response`
///
/// The status defaults to `200 OK` when a handler writes a body without
/// ever calling [`ResponseSink::set_status`].
#[derive(Debug, Default)]
pub struct BufferedSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Status staged so far
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers staged so far
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body bytes staged so far
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Assemble the staged status, headers, and body into a response
    pub fn into_response(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(Bytes::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(chunk);
        Ok(chunk.len())
    }
}
