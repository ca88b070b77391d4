//! HTTP response building module
//!
//! Provides builders for the fixed-shape responses of the server, decoupled
//! from the file pipeline.

use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::body::{self, ResponseBody};

/// Build the minimal HTML error page for `status`
///
/// Layout: `<title>{code} {reason}</title><h1>{reason}</h1>{detail}`
pub fn error_page(status: StatusCode, detail: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        "<title>{} {reason}</title><h1>{reason}</h1>{detail}",
        status.as_u16()
    )
}

/// Build an HTML error response, body omitted for HEAD
fn build_error_response(status: StatusCode, detail: &str, is_head: bool) -> Response<ResponseBody> {
    let page = error_page(status, detail);
    let content_length = page.len();
    let body = if is_head { body::empty() } else { body::full(page) };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            bare_response(status)
        })
}

/// Build 304 Not Modified response from headers already collected by the pipeline
pub fn build_304_response(builder: hyper::http::response::Builder) -> Response<ResponseBody> {
    builder
        .status(StatusCode::NOT_MODIFIED)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            bare_response(StatusCode::NOT_MODIFIED)
        })
}

/// Build 404 Not Found response naming the requested path
pub fn build_404_response(path: &str, is_head: bool) -> Response<ResponseBody> {
    build_error_response(
        StatusCode::NOT_FOUND,
        &format!("<p>The requested URL {path} was not found on this server.</p>"),
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_error_response(StatusCode::METHOD_NOT_ALLOWED, "", false);
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(is_head: bool) -> Response<ResponseBody> {
    build_error_response(StatusCode::RANGE_NOT_SATISFIABLE, "", is_head)
}

/// Build 500 Internal Server Error response
///
/// The detail of the failure is logged by the caller, never rendered.
pub fn build_500_response(is_head: bool) -> Response<ResponseBody> {
    build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "", is_head)
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        body::empty()
    } else {
        body::full(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            bare_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Fallback when a builder rejects a header
fn bare_response(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
