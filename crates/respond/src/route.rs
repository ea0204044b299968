//! Bridge from fallible sink handlers to axum routes

use std::future::Future;
use std::pin::Pin;

use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::StatusCode;

use crate::error::Result;
use crate::handler::catch_errors;
use crate::sink::{BufferedSink, ResponseSink};

/// Body limit for bridged requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

type RouteFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Turn a fallible sink handler into an axum-routable handler
///
/// The returned closure buffers the request body, runs the handler under
/// [`catch_errors`] against an in-memory sink, and converts the staged
/// output into the framework response. Oversized bodies are rejected with
/// 413 and unreadable ones with 400, in both cases before the handler runs.
pub fn from_fn<F>(
    handler: F,
) -> impl Fn(axum::extract::Request) -> RouteFuture + Clone + Send + Sync + 'static
where
    F: Fn(&mut dyn ResponseSink, &http::Request<Bytes>) -> Result<()>
        + Clone
        + Send
        + Sync
        + 'static,
{
    move |request| {
        let handler = handler.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();

            let bytes = match axum::body::to_bytes(body, BODY_LIMIT_BYTES).await {
                Ok(bytes) => bytes,
                Err(err) => return body_read_failure(&err),
            };
            let request = http::Request::from_parts(parts, bytes);

            let mut sink = BufferedSink::new();
            catch_errors(&handler)(&mut sink, &request);
            sink.into_response().map(axum::body::Body::from)
        })
    }
}

fn body_read_failure(err: &axum::Error) -> Response {
    if std::error::Error::source(err)
        .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
    {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read request body: {err}"),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::routing::{get, post};
    use http::header;
    use tower::ServiceExt;

    use super::*;
    use crate::encode::encode_json_response;
    use crate::error::HandlerError;

    #[derive(serde::Serialize)]
    struct Health {
        ready: bool,
    }

    fn health(sink: &mut dyn ResponseSink, _request: &http::Request<Bytes>) -> Result<()> {
        encode_json_response(Some(&Health { ready: true }), StatusCode::OK, sink);
        Ok(())
    }

    #[tokio::test]
    async fn routed_handler_responds_with_json() {
        let app = Router::new().route("/health", get(from_fn(health)));

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=UTF-8"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"ready":true}"#);
    }

    #[tokio::test]
    async fn routed_handler_error_maps_to_its_status() {
        let app = Router::new().route(
            "/missing",
            get(from_fn(
                |_sink: &mut dyn ResponseSink, _request: &http::Request<Bytes>| {
                    Err(HandlerError::status(StatusCode::NOT_FOUND, "no such route"))
                },
            )),
        );

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"no such route\n");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_the_handler() {
        let app = Router::new().route(
            "/ingest",
            post(from_fn(
                |_sink: &mut dyn ResponseSink, _request: &http::Request<Bytes>| -> Result<()> {
                    panic!("handler must not run");
                },
            )),
        );

        let response = app
            .oneshot(
                http::Request::builder()
                    .method(http::Method::POST)
                    .uri("/ingest")
                    .body(Body::from(vec![0_u8; BODY_LIMIT_BYTES + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(&BODY_LIMIT_BYTES.to_string()));
    }
}
