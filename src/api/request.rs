// Request body helpers shared by the API handlers

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use serde::de::DeserializeOwned;

use super::BoxError;
use crate::error::PortalError;

/// Collect a body and decode it as JSON
///
/// An empty body decodes as `{}`, so handlers see missing fields rather
/// than a parse failure.
pub async fn read_json<T, B>(body: B) -> Result<T, PortalError>
where
    T: DeserializeOwned,
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let bytes = body
        .collect()
        .await
        .map_err(|e| {
            let e: BoxError = e.into();
            PortalError::validation(format!("Failed to read request body: {e}"))
        })?
        .to_bytes();

    let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"{}")
    } else {
        serde_json::from_slice(&bytes)
    };
    parsed.map_err(|e| PortalError::validation(format!("Invalid JSON body: {e}")))
}
