// File listing and deletion endpoints

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};

use super::request::read_json;
use super::response::{json_response, success};
use super::types::DeleteFileRequest;
use super::BoxError;
use crate::config::AppState;
use crate::error::PortalError;

/// GET /api/files/:admissionNo
pub async fn list_visible(
    state: &AppState,
    admission_no: &str,
) -> Result<Response<Full<Bytes>>, PortalError> {
    let files = state.files.list_visible(admission_no).await?;
    Ok(json_response(StatusCode::OK, &files))
}

/// GET /api/files
pub async fn list_all(state: &AppState) -> Result<Response<Full<Bytes>>, PortalError> {
    let files = state.files.list_all().await?;
    Ok(json_response(StatusCode::OK, &files))
}

/// POST /api/file/delete
pub async fn delete<B>(body: B, state: &AppState) -> Result<Response<Full<Bytes>>, PortalError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let request: DeleteFileRequest = read_json(body).await?;
    state.files.delete(&request.filename).await?;
    Ok(success())
}
