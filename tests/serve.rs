//! End-to-end request handling against a temporary site root

use flate2::read::{GzDecoder, ZlibDecoder};
use http_body_util::BodyExt;
use hyper::header::{
    ACCEPT_ENCODING, ACCEPT_RANGES, ALLOW, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, RANGE,
};
use hyper::{Method, Request, Response, StatusCode};
use std::fs;
use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use static_server::config::{AppState, Config, ConfigOverrides};
use static_server::handler::handle_request;
use static_server::http::ResponseBody;

fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("digits.txt"), b"0123456789").unwrap();
    fs::write(root.join("style.css"), b"body { color: red; }\n".repeat(20)).unwrap();
    fs::write(root.join("page.html"), b"<p>home</p>").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/inner.js"), b"let x = 1;").unwrap();
    fs::create_dir(root.join("sub/deeper")).unwrap();
    dir
}

fn state_for(root: &Path, overrides: ConfigOverrides) -> Arc<AppState> {
    let overrides = ConfigOverrides {
        workspace: Some(root.to_string_lossy().into_owned()),
        ..overrides
    };
    let cfg = Config::load_from("/nonexistent/static-server-config", &overrides).unwrap();
    Arc::new(AppState::new(cfg).unwrap())
}

fn listing_state(root: &Path) -> Arc<AppState> {
    state_for(
        root,
        ConfigOverrides {
            view_dir: Some(true),
            ..ConfigOverrides::default()
        },
    )
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<ResponseBody> {
    handle_request(req, Arc::clone(state), peer()).await.unwrap()
}

async fn get(state: &Arc<AppState>, path: &str) -> Response<ResponseBody> {
    send(state, Request::get(path).body(()).unwrap()).await
}

async fn body_of(response: Response<ResponseBody>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

fn header<'a>(response: &'a Response<ResponseBody>, name: &hyper::header::HeaderName) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

#[tokio::test]
async fn serves_whole_file() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let response = get(&state, "/digits.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, &CONTENT_TYPE), "text/plain");
    assert_eq!(header(&response, &CONTENT_LENGTH), "10");
    assert!(response.headers().contains_key(ETAG));
    assert!(response.headers().contains_key(LAST_MODIFIED));
    assert_eq!(body_of(response).await, b"0123456789");
}

#[tokio::test]
async fn serves_byte_range() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::get("/digits.txt")
        .header(RANGE, "bytes=0-4")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, &ACCEPT_RANGES), "bytes");
    assert_eq!(header(&response, &CONTENT_RANGE), "bytes 0-4/10");
    assert_eq!(header(&response, &CONTENT_LENGTH), "5");
    assert_eq!(body_of(response).await, b"01234");
}

#[tokio::test]
async fn serves_suffix_and_open_ended_ranges() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let suffix = Request::get("/digits.txt").header(RANGE, "-3").body(()).unwrap();
    let response = send(&state, suffix).await;
    assert_eq!(header(&response, &CONTENT_RANGE), "bytes 7-9/10");
    assert_eq!(body_of(response).await, b"789");

    let open = Request::get("/digits.txt").header(RANGE, "6-").body(()).unwrap();
    let response = send(&state, open).await;
    assert_eq!(header(&response, &CONTENT_RANGE), "bytes 6-9/10");
    assert_eq!(body_of(response).await, b"6789");
}

#[tokio::test]
async fn range_list_serves_only_the_first_window() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::get("/digits.txt")
        .header(RANGE, "bytes=0-1,5-6")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, &CONTENT_RANGE), "bytes 0-1/10");
    assert_eq!(header(&response, &CONTENT_LENGTH), "2");
    assert_eq!(body_of(response).await, b"01");
}

#[tokio::test]
async fn unsatisfiable_range_is_416() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::get("/digits.txt")
        .header(RANGE, "bytes=100-200")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    let body = String::from_utf8(body_of(response).await).unwrap();
    assert!(body.contains("<h1>Range Not Satisfiable</h1>"));
}

#[tokio::test]
async fn missing_file_is_404_naming_the_path() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let response = get(&state, "/nope.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = String::from_utf8(body_of(response).await).unwrap();
    assert!(body.starts_with("<title>404 Not Found</title><h1>Not Found</h1>"));
    assert!(body.contains("/nope.txt"));
}

#[tokio::test]
async fn head_404_has_no_body() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::head("/nope.txt").body(()).unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_of(response).await.is_empty());
}

#[tokio::test]
async fn traversal_outside_root_is_404() {
    let outer = tempfile::tempdir().unwrap();
    fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
    fs::create_dir(outer.path().join("site")).unwrap();
    let state = state_for(&outer.path().join("site"), ConfigOverrides::default());

    for path in ["/../secret.txt", "/%2e%2e/secret.txt"] {
        let response = get(&state, path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn other_methods_are_405() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/digits.txt")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(header(&response, &ALLOW), "GET, HEAD");
}

#[tokio::test]
async fn gzip_for_compressible_types() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::get("/style.css")
        .header(ACCEPT_ENCODING, "gzip, deflate")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, &CONTENT_ENCODING), "gzip");
    assert_eq!(header(&response, &CONTENT_TYPE), "text/css");
    assert_eq!(header(&response, &CACHE_CONTROL), "max-age=31536000");
    assert!(!response.headers().contains_key(CONTENT_LENGTH));

    let compressed = body_of(response).await;
    let mut plain = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut plain)
        .unwrap();
    assert_eq!(plain, b"body { color: red; }\n".repeat(20));
}

#[tokio::test]
async fn deflate_when_gzip_not_offered() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::get("/sub/inner.js")
        .header(ACCEPT_ENCODING, "deflate")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(header(&response, &CONTENT_ENCODING), "deflate");

    let compressed = body_of(response).await;
    let mut plain = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut plain)
        .unwrap();
    assert_eq!(plain, b"let x = 1;");
}

#[tokio::test]
async fn compressed_range_covers_the_slice() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let req = Request::get("/style.css")
        .header(ACCEPT_ENCODING, "gzip")
        .header(RANGE, "bytes=0-3")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert!(!response.headers().contains_key(CONTENT_LENGTH));

    let compressed = body_of(response).await;
    let mut plain = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut plain)
        .unwrap();
    assert_eq!(plain, b"body");
}

#[tokio::test]
async fn no_compression_for_other_types_or_when_disabled() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());
    let req = Request::get("/digits.txt")
        .header(ACCEPT_ENCODING, "gzip")
        .body(())
        .unwrap();
    let response = send(&state, req).await;
    assert!(!response.headers().contains_key(CONTENT_ENCODING));
    assert_eq!(header(&response, &CONTENT_LENGTH), "10");

    let disabled = state_for(
        dir.path(),
        ConfigOverrides {
            use_compress: Some(false),
            ..ConfigOverrides::default()
        },
    );
    let req = Request::get("/style.css")
        .header(ACCEPT_ENCODING, "gzip")
        .body(())
        .unwrap();
    let response = send(&disabled, req).await;
    assert!(!response.headers().contains_key(CONTENT_ENCODING));
}

#[tokio::test]
async fn conditional_request_needs_both_validators() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let first = get(&state, "/digits.txt").await;
    let etag = header(&first, &ETAG).to_string();
    let last_modified = header(&first, &LAST_MODIFIED).to_string();

    let both = Request::get("/digits.txt")
        .header(IF_NONE_MATCH, &etag)
        .header(IF_MODIFIED_SINCE, &last_modified)
        .body(())
        .unwrap();
    let response = send(&state, both).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(body_of(response).await.is_empty());

    let etag_only = Request::get("/digits.txt")
        .header(IF_NONE_MATCH, &etag)
        .body(())
        .unwrap();
    let response = send(&state, etag_only).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stale = Request::get("/digits.txt")
        .header(IF_NONE_MATCH, "stale")
        .header(IF_MODIFIED_SINCE, &last_modified)
        .body(())
        .unwrap();
    let response = send(&state, stale).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn directory_serves_default_page() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let response = get(&state, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, &CONTENT_TYPE), "text/html");
    assert_eq!(body_of(response).await, b"<p>home</p>");
}

#[tokio::test]
async fn directory_without_default_page_is_listed() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let response = get(&state, "/sub/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_of(response).await).unwrap();
    assert!(html.contains("<title>Index of /sub</title>"));
}

#[tokio::test]
async fn root_listing_has_entries_and_no_parent() {
    let dir = site();
    let state = listing_state(dir.path());

    let response = get(&state, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, &CONTENT_TYPE), "text/html");
    let html = String::from_utf8(body_of(response).await).unwrap();
    assert!(html.contains("Index of /"));
    assert!(!html.contains("Parent Directory"));
    assert!(html.contains(r#"<a href="/digits.txt">digits.txt</a>"#));
    assert!(html.contains(r#"<a href="/page.html">page.html</a>"#));
    assert!(html.contains(r#"<a href="/sub/">sub/</a>"#));
}

#[tokio::test]
async fn nested_listing_links_back_to_parent() {
    let dir = site();
    let state = listing_state(dir.path());

    let response = get(&state, "/sub/").await;
    let html = String::from_utf8(body_of(response).await).unwrap();
    assert!(html.contains(r#"<a href="/">Parent Directory</a>"#));
    assert!(html.contains(r#"<a href="/sub/inner.js">inner.js</a>"#));
    assert!(html.contains(r#"<a href="/sub/deeper/">deeper/</a>"#));
}

#[cfg(unix)]
#[tokio::test]
async fn listing_with_broken_entry_is_500() {
    let dir = site();
    std::os::unix::fs::symlink(dir.path().join("missing-target"), dir.path().join("dangling"))
        .unwrap();
    let state = listing_state(dir.path());

    let response = get(&state, "/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_of(response).await).unwrap();
    assert_eq!(
        body,
        "<title>500 Internal Server Error</title><h1>Internal Server Error</h1>"
    );
    assert!(!body.contains("digits.txt"));
    assert!(!body.contains("dangling"));
}

#[tokio::test]
async fn path_through_a_file_is_500() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let response = get(&state, "/digits.txt/inner").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_of(response).await).unwrap();
    assert!(body.ends_with("<h1>Internal Server Error</h1>"));
    assert!(!body.contains("digits.txt"));
}

#[tokio::test]
async fn file_with_trailing_slash_is_500() {
    let dir = site();
    let state = state_for(dir.path(), ConfigOverrides::default());

    let response = get(&state, "/digits.txt/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let head = send(&state, Request::head("/digits.txt/").body(()).unwrap()).await;
    assert_eq!(head.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_of(head).await.is_empty());
}
