//! HTTP response plumbing for REST handlers
//!
//! Standardizes JSON body encoding with correct headers and adapts
//! fallible handlers into proper HTTP status responses. Handlers that
//! stream partial output (e.g. server-sent events) before failing are
//! tolerated: once a response has started, no second status line or
//! error payload is ever emitted for that request.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod encode;
mod error;
mod handler;
mod route;
mod sink;

pub use encode::{encode_json_response, plain_text_error};
pub use error::{HandlerError, Result};
pub use handler::{catch_errors, unimplemented};
pub use route::from_fn;
pub use sink::{BufferedSink, ResponseSink, TrackedSink};
