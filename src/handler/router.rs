//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, header
//! extraction, pipeline dispatch and access logging.

use crate::config::AppState;
use crate::handler::pipeline;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{
    HeaderMap, ACCEPT_ENCODING, CONTENT_LENGTH, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, REFERER,
    USER_AGENT,
};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub method: Method,
    /// Raw (percent-encoded) request path
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
    pub accept_encoding: Option<String>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let headers = req.headers();
        Self {
            method: req.method().clone(),
            path: req.uri().path(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header_string(headers, &IF_NONE_MATCH),
            if_modified_since: header_string(headers, &IF_MODIFIED_SINCE),
            range: header_string(headers, &RANGE),
            accept_encoding: header_string(headers, &ACCEPT_ENCODING),
        }
    }
}

fn header_string(headers: &HeaderMap, name: &hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Main entry point for HTTP request handling
///
/// Generic over the request body: the server never reads it.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let response = match check_http_method(&ctx.method) {
        Some(resp) => resp,
        None => pipeline::serve(&ctx, &state).await,
    };

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Only GET and HEAD are served; everything else is 405
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.referer = header_string(req.headers(), &REFERER);
    entry.user_agent = header_string(req.headers(), &USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
