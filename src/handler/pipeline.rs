//! Response pipeline
//!
//! Turns a resolved request into a response in a fixed order, stopping at the
//! first stage that produces a final answer:
//! resolve → list directory → conditional cache → range → content type →
//! encoding → stream.

use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    ETAG, EXPIRES, LAST_MODIFIED,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use std::time::SystemTime;
use tokio::fs::File;

use super::listing;
use super::resolver::{self, Resource};
use super::router::RequestContext;
use crate::config::AppState;
use crate::error::{Result, ServeError};
use crate::http::{self, body, mime, parse_range, Encoding, ResponseBody, ValidationToken};
use crate::logger;

/// Run the full pipeline for one request
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let site = &state.config.site;
    let outcome = match resolver::resolve(&state.root, ctx.path, &site.default_page, site.view_dir)
        .await
    {
        Ok(resource) if resource.is_dir() => serve_listing(ctx, &resource).await,
        Ok(resource) => serve_content(ctx, state, &resource).await,
        Err(e) => Err(e),
    };

    outcome.unwrap_or_else(|e| error_response(ctx, &e))
}

async fn serve_listing(ctx: &RequestContext<'_>, dir: &Resource) -> Result<Response<ResponseBody>> {
    let listing = listing::list(&dir.path, ctx.path).await?;
    let html = listing::render(&listing)?;
    Ok(http::build_html_response(html, ctx.is_head))
}

async fn serve_content(
    ctx: &RequestContext<'_>,
    state: &AppState,
    resource: &Resource,
) -> Result<Response<ResponseBody>> {
    let extension = resource.extension.as_deref().unwrap_or_default();
    let mut builder = Response::builder();

    if state.config.cache.enabled {
        let (with_validators, token) = apply_cache_headers(builder, state, resource, extension);
        builder = with_validators;
        if token.is_fresh(ctx.if_modified_since.as_deref(), ctx.if_none_match.as_deref()) {
            return Ok(http::build_304_response(builder));
        }
    }

    // An empty Range header counts as absent
    let range = match ctx.range.as_deref().filter(|v| !v.is_empty()) {
        Some(value) => Some(
            parse_range(value, resource.size).ok_or(ServeError::RangeNotSatisfiable {
                size: resource.size,
            })?,
        ),
        None => None,
    };

    let encoding = if state.config.compress.enabled && state.is_compressible(extension) {
        Encoding::negotiate(ctx.accept_encoding.as_deref())
    } else {
        None
    };

    builder = builder.header(CONTENT_TYPE, mime::get_content_type(resource.extension.as_deref()));

    builder = match range {
        Some(range) => {
            let builder = builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(ACCEPT_RANGES, "bytes")
                .header(CONTENT_RANGE, range.content_range(resource.size));
            if encoding.is_none() {
                builder.header(CONTENT_LENGTH, range.len())
            } else {
                builder
            }
        }
        None if encoding.is_none() => builder
            .status(StatusCode::OK)
            .header(CONTENT_LENGTH, resource.size),
        None => builder.status(StatusCode::OK),
    };

    if let Some(encoding) = encoding {
        builder = builder.header(CONTENT_ENCODING, encoding.as_str());
    }

    // Opened for HEAD too, so both methods agree on the status
    let file = File::open(&resource.path)
        .await
        .map_err(|e| ServeError::from_lookup(e, ctx.path))?;
    let body = if ctx.is_head {
        body::empty()
    } else {
        body::file_stream(file, range, encoding).await?
    };

    builder.body(body).map_err(|e| {
        ServeError::Fault(std::io::Error::other(format!("invalid response head: {e}")))
    })
}

/// Attach expiry and validator headers, returning the token for the 304 check
fn apply_cache_headers(
    builder: Builder,
    state: &AppState,
    resource: &Resource,
    extension: &str,
) -> (Builder, ValidationToken) {
    let mut builder = builder;
    if state.is_cacheable(extension) {
        let policy = state.cache_policy();
        builder = builder
            .header(EXPIRES, policy.expires(SystemTime::now()))
            .header(CACHE_CONTROL, policy.cache_control());
    }

    let token = ValidationToken::new(resource.modified, resource.size);
    let builder = builder
        .header(LAST_MODIFIED, token.last_modified.as_str())
        .header(ETAG, token.etag.as_str());
    (builder, token)
}

/// Map a pipeline failure to its response, logging the full detail
fn error_response(ctx: &RequestContext<'_>, err: &ServeError) -> Response<ResponseBody> {
    match err {
        ServeError::NotFound { .. } => {
            logger::log_warning(&format!(
                "{} {} -> {}: {err}",
                ctx.method,
                ctx.path,
                err.status()
            ));
            http::build_404_response(ctx.path, ctx.is_head)
        }
        ServeError::RangeNotSatisfiable { .. } => {
            logger::log_warning(&format!(
                "{} {} (Range: {}) -> {}: {err}",
                ctx.method,
                ctx.path,
                ctx.range.as_deref().unwrap_or_default(),
                err.status()
            ));
            http::build_416_response(ctx.is_head)
        }
        ServeError::Fault(_) | ServeError::Render(_) => {
            logger::log_error(&format!(
                "{} {} -> {}: {err:?}",
                ctx.method,
                ctx.path,
                err.status()
            ));
            http::build_500_response(ctx.is_head)
        }
    }
}
