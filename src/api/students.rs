// Student record and notice endpoints

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde_json::{Map, Value};

use super::request::read_json;
use super::response::{json_response, success, success_message};
use super::types::{AnnouncementRequest, DeleteNoticeRequest, EditNoticeRequest, StudentResponse};
use super::BoxError;
use crate::config::AppState;
use crate::error::PortalError;
use crate::students::NewStudent;

type ApiResult = Result<Response<Full<Bytes>>, PortalError>;

/// GET /api/students
pub async fn list(state: &AppState) -> ApiResult {
    let students = state.students.list().await?;
    Ok(json_response(StatusCode::OK, &students))
}

/// GET /api/student/:admissionNo
pub async fn get(state: &AppState, admission_no: &str) -> ApiResult {
    let student = state.students.get(admission_no).await?;
    Ok(json_response(StatusCode::OK, &student))
}

/// POST /api/student/add
pub async fn add<B>(body: B, state: &AppState) -> ApiResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let new: NewStudent = read_json(body).await?;
    let student = state.students.create(new).await?;
    Ok(json_response(
        StatusCode::OK,
        &StudentResponse {
            success: true,
            student,
        },
    ))
}

/// POST /api/student/update
///
/// The body carries `admissionNo` to select the record; every other field
/// replaces the stored value.
pub async fn update<B>(body: B, state: &AppState) -> ApiResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let patch: Map<String, Value> = read_json(body).await?;
    let admission_no = patch
        .get("admissionNo")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(PortalError::student_not_found)?;

    let student = state.students.update(&admission_no, patch).await?;
    Ok(json_response(
        StatusCode::OK,
        &StudentResponse {
            success: true,
            student,
        },
    ))
}

/// DELETE /api/student/:admissionNo
pub async fn delete(state: &AppState, admission_no: &str) -> ApiResult {
    state.students.delete(admission_no).await?;
    Ok(success())
}

/// POST /api/announcement/all
pub async fn announce<B>(body: B, state: &AppState) -> ApiResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let request: AnnouncementRequest = read_json(body).await?;
    state.students.broadcast_notice(&request.notice).await?;
    Ok(success_message("Announcement added to all students"))
}

/// POST /api/student/:admissionNo/notice/edit
pub async fn edit_notice<B>(body: B, state: &AppState, admission_no: &str) -> ApiResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let request: EditNoticeRequest = read_json(body).await.map_err(invalid_notice_request)?;
    state
        .students
        .edit_notice(admission_no, request.index, request.new_notice)
        .await
        .map_err(invalid_notice_request)?;
    Ok(success())
}

/// POST /api/student/:admissionNo/notice/delete
pub async fn delete_notice<B>(body: B, state: &AppState, admission_no: &str) -> ApiResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let request: DeleteNoticeRequest = read_json(body).await.map_err(invalid_notice_request)?;
    state
        .students
        .delete_notice(admission_no, request.index)
        .await
        .map_err(invalid_notice_request)?;
    Ok(success())
}

/// Notice edits report an unknown student and a bad index the same way
fn invalid_notice_request(error: PortalError) -> PortalError {
    match error {
        PortalError::NotFound(_) | PortalError::Validation(_) => {
            PortalError::validation("Invalid request")
        }
        other => other,
    }
}
