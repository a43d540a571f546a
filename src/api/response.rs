// API response utility functions module

use crate::error::PortalError;
use crate::http::CachePolicy;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

/// Build JSON response
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return raw_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"success":false,"error":"Internal server error"}"#),
            );
        }
    };

    raw_json(status, Bytes::from(json))
}

fn raw_json(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", CachePolicy::NoStore.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// `{"success": true}`
pub fn success() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &json!({ "success": true }))
}

/// `{"success": true, "message": ...}`
pub fn success_message(message: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &json!({ "success": true, "message": message }))
}

/// `{"success": false, "error": ...}` with the error's status code
pub fn error_response(error: &PortalError) -> Response<Full<Bytes>> {
    let status = error.status_code();
    if status.is_server_error() {
        logger::log_error(&error.to_string());
    }
    json_response(
        status,
        &json!({ "success": false, "error": error.public_message() }),
    )
}

/// 404 Not Found response
pub fn not_found() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({ "success": false, "error": "Not Found" }),
    )
}

/// 405 Method Not Allowed response
pub fn method_not_allowed() -> Response<Full<Bytes>> {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({ "success": false, "error": "Method Not Allowed" }),
    );
    response.headers_mut().insert(
        hyper::header::ALLOW,
        hyper::header::HeaderValue::from_static(crate::http::response::ALLOWED_METHODS),
    );
    response
}
