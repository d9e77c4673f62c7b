//! Anti-XSS interception middleware.
//!
//! Scans three request channels in order (path, decoded query string,
//! buffered body) and rejects the request on the first dangerous pattern.
//! Clean requests are forwarded with their body rebuilt from the buffer so
//! the downstream handler reads the complete original bytes.

use std::borrow::Cow;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use percent_encoding::percent_decode_str;

use crate::detect::scan;
use crate::filter::headers::ResponseHeaderPolicy;
use crate::observability::metrics;

/// Fixed rejection body. Not configurable.
const REJECT_BODY: &str = "Your request cannot be processed. Please contact a support.";

/// The request surfaces inspected by the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestChannel {
    Path,
    QueryString,
    Body,
}

impl RequestChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestChannel::Path => "path",
            RequestChannel::QueryString => "query_string",
            RequestChannel::Body => "body",
        }
    }
}

/// State required by the anti-XSS middleware.
#[derive(Clone)]
pub struct AntiXssState {
    pub header_policy: ResponseHeaderPolicy,
    /// Upper bound on how many body bytes are buffered for scanning.
    pub max_body_bytes: usize,
}

pub async fn anti_xss_middleware(
    State(state): State<AntiXssState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Path and query string, as an ordered list of (channel, text) checks.
    //    The path is scanned as received, never decoded. hyper rejects request
    //    targets containing a raw `<` and strips `#` as a fragment delimiter
    //    before routing, so with this host the path rule only fires behind a
    //    more lenient front end; it stays because the query and body channels
    //    cannot cover a hostile path.
    {
        let uri = request.uri();
        let checks: [(RequestChannel, Option<Cow<'_, str>>); 2] = [
            (
                RequestChannel::Path,
                Some(uri.path())
                    .filter(|p| !p.trim().is_empty())
                    .map(Cow::Borrowed),
            ),
            (
                RequestChannel::QueryString,
                uri.query()
                    .filter(|q| !q.trim().is_empty())
                    .map(|q| percent_decode_str(q).decode_utf8_lossy()),
            ),
        ];

        for (channel, text) in &checks {
            if let Some(text) = text {
                if let Some(index) = scan(text) {
                    return reject(*channel, index, &state.header_policy);
                }
            }
        }
    }

    // 2. Buffer the body. Lossy UTF-8 decoding: invalid sequences become
    //    replacement characters, which can never complete a trigger pattern.
    let (parts, body) = request.into_parts();
    let bytes: Bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) if is_length_limit(&err) => {
            tracing::warn!(error = %err, "Request body exceeds scan cap");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    if let Some(index) = scan(&content) {
        return reject(RequestChannel::Body, index, &state.header_policy);
    }

    // 3. Clean: hand the downstream handler the complete original body.
    let request = Request::from_parts(parts, Body::from(bytes));
    next.run(request).await
}

/// Whether a body-buffering error stems from the scan cap rather than a
/// failed read (e.g. a client disconnect mid-body).
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(inner) = source {
        if inner.is::<LengthLimitError>() {
            return true;
        }
        source = inner.source();
    }
    false
}

/// Build the fixed rejection response. The downstream handler is never run.
fn reject(channel: RequestChannel, index: usize, policy: &ResponseHeaderPolicy) -> Response {
    tracing::warn!(
        channel = channel.as_str(),
        index,
        "Dangerous pattern detected, rejecting request"
    );
    metrics::record_rejection(channel.as_str());

    let mut response = (StatusCode::BAD_REQUEST, REJECT_BODY).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    policy.apply(response.headers_mut());
    response
}
