//! Request and response types used throughout the dispatch pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use meridian_router::RouteMatch;

/// The HTTP request type used in the pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body. Once routed,
/// its extensions carry the [`RouteMatch`].
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building responses without a fallible builder.
pub trait ResponseExt {
    /// Creates an empty response with the given status.
    fn with_status(status: StatusCode) -> Response;

    /// Creates a plain-text response.
    fn text(status: StatusCode, body: impl Into<String>) -> Response;

    /// Creates a JSON response from pre-serialized bytes.
    fn json(status: StatusCode, body: Vec<u8>) -> Response;
}

impl ResponseExt for Response {
    fn with_status(status: StatusCode) -> Response {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn text(status: StatusCode, body: impl Into<String>) -> Response {
        let mut response = Response::new(Full::new(Bytes::from(body.into())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    fn json(status: StatusCode, body: Vec<u8>) -> Response {
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// The parts of a request that outlive its trip through the chain.
///
/// The kernel takes a head before the request is handed to the middleware,
/// so error handling still knows what was asked for.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// The request verb.
    pub method: Method,
    /// The request URI.
    pub uri: Uri,
    /// The request headers.
    pub headers: HeaderMap,
    /// The route the request was bound to, if routing succeeded.
    pub route: Option<RouteMatch>,
}

impl RequestHead {
    /// Captures the head of a request.
    #[must_use]
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            route: request.extensions().get::<RouteMatch>().cloned(),
        }
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }
}
