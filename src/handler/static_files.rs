//! Static file serving module
//!
//! Serves uploaded binaries under `/uploads` and the landing page at `/`.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, CachePolicy};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve one uploaded binary by its stored name
pub async fn serve_upload(
    ctx: &RequestContext,
    uploads_dir: &Path,
    name: &str,
) -> Response<Full<Bytes>> {
    match load_upload(uploads_dir, name).await {
        Some((content, content_type)) => {
            build_file_response(ctx, content, content_type, CachePolicy::UPLOADS)
        }
        None => http::build_404_response(),
    }
}

/// Serve the configured landing page, or the built-in one when it is absent
pub async fn serve_index(ctx: &RequestContext, index_page: &Path) -> Response<Full<Bytes>> {
    match fs::read(index_page).await {
        Ok(content) => {
            let content_type = mime::get_content_type(index_page.extension().and_then(|e| e.to_str()));
            build_file_response(ctx, content, content_type, CachePolicy::NoCache)
        }
        Err(_) => build_file_response(
            ctx,
            DEFAULT_INDEX.as_bytes().to_vec(),
            "text/html; charset=utf-8",
            CachePolicy::NoCache,
        ),
    }
}

/// Load an upload, refusing anything that resolves outside `uploads_dir`
pub async fn load_upload(uploads_dir: &Path, name: &str) -> Option<(Vec<u8>, &'static str)> {
    // `name` is one decoded path segment; an encoded separator must not
    // reopen traversal
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return None;
    }

    let uploads_canonical = match uploads_dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Uploads directory not found or inaccessible '{}': {e}",
                uploads_dir.display()
            ));
            return None;
        }
    };

    // Missing files are ordinary 404s
    let file_path = uploads_dir.join(name).canonicalize().ok()?;
    if !file_path.starts_with(&uploads_canonical) || !file_path.is_file() {
        logger::log_warning(&format!(
            "Upload path rejected: {name} -> {}",
            file_path.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build a file response with `ETag` revalidation
fn build_file_response(
    ctx: &RequestContext,
    content: Vec<u8>,
    content_type: &str,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&content);

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::response::build_304_response(&etag, policy);
    }

    http::response::build_content_response(
        Bytes::from(content),
        content_type,
        &etag,
        policy,
        ctx.is_head,
    )
}

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>School Portal</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            background: #f4f6fb;
            color: #1f2937;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
        }
        .container {
            background: white;
            border-radius: 12px;
            box-shadow: 0 4px 24px rgba(15, 23, 42, 0.08);
            padding: 40px;
            max-width: 560px;
        }
        h1 {
            margin-top: 0;
        }
        code {
            background: #eef2ff;
            padding: 2px 6px;
            border-radius: 4px;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>School Portal</h1>
        <p>Student records, notices and shared files.</p>
        <p>Sign in through <code>POST /api/login</code> as a student or as the administrator.</p>
        <p>Place a custom <code>index.html</code> next to the server to replace this page.</p>
    </div>
</body>
</html>"#;
