//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: preflight and body size checks,
//! health probes, the `/api` surface, uploads and the landing page.

use crate::api::{self, BoxError};
use crate::config::{AppState, HttpConfig};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::match_pattern;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context for the static surface
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send + 'static,
{
    let started = Instant::now();
    let logging = &state.config.logging;
    let entry = logging
        .access_log
        .then(|| access_entry(&req, peer_addr));
    logger::log_headers_count(req.headers().len(), logging.show_headers);

    let mut response = route_request(req, &state).await;
    apply_common_headers(response.headers_mut(), &state.config.http);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send + 'static,
{
    let config = &state.config;

    // 1. Preflight
    if req.method() == Method::OPTIONS {
        return http::build_options_response(config.http.enable_cors);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req.headers(), config.http.max_body_size) {
        return resp;
    }

    let path = req.uri().path();

    // 3. Health check endpoints
    if config.health.enabled
        && (path == config.health.liveness_path || path == config.health.readiness_path)
    {
        return http::build_health_response("ok");
    }

    // 4. JSON API
    if path == "/api" || path.starts_with("/api/") {
        return api::handle_api(req, state).await;
    }

    // 5. Static surface is read-only
    let is_head = req.method() == Method::HEAD;
    if req.method() != Method::GET && !is_head {
        logger::log_warning(&format!("Method not allowed: {} {path}", req.method()));
        return http::build_405_response();
    }

    let ctx = RequestContext {
        is_head,
        if_none_match: req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    if let Some(params) = match_pattern("/uploads/:name", path) {
        let name = params.get("name").unwrap_or_default();
        return static_files::serve_upload(&ctx, state.files.uploads_dir(), name).await;
    }

    if path == "/" {
        return static_files::serve_index(&ctx, &config.storage.index_page).await;
    }

    http::build_404_response()
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// `Server` on every response, plus the CORS origin when enabled
fn apply_common_headers(headers: &mut HeaderMap, http_config: &HttpConfig) {
    match HeaderValue::from_str(&http_config.server_name) {
        Ok(value) => {
            headers.insert("Server", value);
        }
        Err(e) => logger::log_warning(&format!("Invalid server_name header value: {e}")),
    }
    if http_config.enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}
