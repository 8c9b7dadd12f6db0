//! HTTP handlers for serving video objects with byte-range support.
//!
//! Streams object bodies straight from the backend to avoid buffering whole
//! objects in memory, and delegates all byte access to the injected
//! [`ObjectStore`](crate::services::object_store::ObjectStore) capability.

use crate::{
    errors::AppError,
    range::{self, RangeDecision},
    services::object_store::{ByteRange, ObjectStat, SharedObjectStore},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use futures::TryStreamExt;
use tracing::{debug, warn};

fn video_content_type() -> HeaderValue {
    HeaderValue::from_static("video/mp4")
}

/// GET `/video/{filename}` — stream a video object, honoring `Range`.
///
/// Sequence per request: HEAD the backend for the object's true size, decide
/// the range, then fetch exactly the bytes the response promises. Once the
/// status line and headers are written the response can only complete or
/// break off early; a mid-stream fault is logged and ends the body without
/// touching the already-sent headers.
pub async fn get_video(
    State(store): State<SharedObjectStore>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let stat = store.head_object(&filename).await?;

    match decide_range(&headers, &stat) {
        RangeDecision::NoRange => {
            let stream = store.get_object(&filename, None).await?;
            let body = Body::from_stream(stream.inspect_err({
                let filename = filename.clone();
                move |err| warn!(%filename, %err, "body stream interrupted")
            }));

            let mut response = Response::new(body);
            let resp_headers = response.headers_mut();
            resp_headers.insert(header::CONTENT_TYPE, video_content_type());
            resp_headers.insert(header::CONTENT_LENGTH, int_header(stat.size));
            Ok(response)
        }
        RangeDecision::Satisfiable { start, end } => {
            let range = ByteRange { start, end };
            debug!(%filename, start, end, "serving partial content");
            let stream = store.get_object(&filename, Some(range)).await?;
            let body = Body::from_stream(stream.inspect_err({
                let filename = filename.clone();
                move |err| warn!(%filename, %err, "body stream interrupted")
            }));

            let mut response = Response::new(body);
            *response.status_mut() = StatusCode::PARTIAL_CONTENT;
            let resp_headers = response.headers_mut();
            resp_headers.insert(header::CONTENT_TYPE, video_content_type());
            resp_headers.insert(header::CONTENT_LENGTH, int_header(range.len()));
            resp_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            resp_headers.insert(
                header::CONTENT_RANGE,
                str_header(format!("bytes {}-{}/{}", start, end, stat.size)),
            );
            Ok(response)
        }
        RangeDecision::Unsatisfiable => Ok(range_not_satisfiable(&stat)),
    }
}

/// HEAD `/video/{filename}` — same size negotiation as GET, no body.
pub async fn head_video(
    State(store): State<SharedObjectStore>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let stat = store.head_object(&filename).await?;

    let mut response = Response::new(Body::empty());
    let resp_headers = response.headers_mut();
    resp_headers.insert(header::CONTENT_TYPE, video_content_type());
    resp_headers.insert(header::CONTENT_LENGTH, int_header(stat.size));
    resp_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    Ok(response)
}

/// Run the range validator against the request headers.
///
/// A `Range` value that is not even valid UTF-8 counts as present but
/// malformed, which the validator maps to a 416, never a 500.
fn decide_range(headers: &HeaderMap, stat: &ObjectStat) -> RangeDecision {
    match headers.get(header::RANGE) {
        None => RangeDecision::NoRange,
        Some(value) => match value.to_str() {
            Ok(raw) => range::decide(Some(raw), stat.size),
            Err(_) => RangeDecision::Unsatisfiable,
        },
    }
}

/// Build the 416 response. No backend fetch happens on this path.
fn range_not_satisfiable(stat: &ObjectStat) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
    response.headers_mut().insert(
        header::CONTENT_RANGE,
        str_header(format!("bytes */{}", stat.size)),
    );
    response
}

fn int_header(value: u64) -> HeaderValue {
    HeaderValue::from_str(&value.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("0"))
}

fn str_header(value: String) -> HeaderValue {
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""))
}
