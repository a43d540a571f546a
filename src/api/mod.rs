// API module entry
// JSON endpoints of the school portal under /api

mod auth;
mod files;
mod request;
mod response;
mod students;
mod types;
mod upload;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::error::PortalError;
use crate::routing::{match_pattern, PathParams};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Login,
    ListStudents,
    GetStudent,
    AddStudent,
    UpdateStudent,
    DeleteStudent,
    Announce,
    EditNotice,
    DeleteNotice,
    Upload,
    ListAllFiles,
    ListVisibleFiles,
    DeleteFile,
}

/// (method, pattern, endpoint); first match wins
const ROUTES: &[(&str, &str, Endpoint)] = &[
    ("POST", "/api/login", Endpoint::Login),
    ("GET", "/api/students", Endpoint::ListStudents),
    ("POST", "/api/student/add", Endpoint::AddStudent),
    ("POST", "/api/student/update", Endpoint::UpdateStudent),
    ("POST", "/api/announcement/all", Endpoint::Announce),
    ("POST", "/api/student/:admissionNo/notice/edit", Endpoint::EditNotice),
    ("POST", "/api/student/:admissionNo/notice/delete", Endpoint::DeleteNotice),
    ("GET", "/api/student/:admissionNo", Endpoint::GetStudent),
    ("DELETE", "/api/student/:admissionNo", Endpoint::DeleteStudent),
    ("POST", "/api/upload", Endpoint::Upload),
    ("GET", "/api/files", Endpoint::ListAllFiles),
    ("GET", "/api/files/:admissionNo", Endpoint::ListVisibleFiles),
    ("POST", "/api/file/delete", Endpoint::DeleteFile),
];

#[derive(Debug, PartialEq)]
enum Resolution {
    Found(Endpoint, PathParams),
    MethodNotAllowed,
    NotFound,
}

fn resolve(method: &Method, path: &str) -> Resolution {
    let mut path_matched = false;
    for &(route_method, pattern, endpoint) in ROUTES {
        let Some(params) = match_pattern(pattern, path) else {
            continue;
        };
        if method.as_str() == route_method {
            return Resolution::Found(endpoint, params);
        }
        path_matched = true;
    }

    if path_matched {
        Resolution::MethodNotAllowed
    } else {
        Resolution::NotFound
    }
}

/// API route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_api<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send + 'static,
{
    let (parts, body) = req.into_parts();

    match resolve(&parts.method, parts.uri.path()) {
        Resolution::Found(endpoint, params) => {
            let content_type = parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            dispatch(endpoint, &params, content_type, body, state)
                .await
                .unwrap_or_else(|e| response::error_response(&e))
        }
        Resolution::MethodNotAllowed => response::method_not_allowed(),
        Resolution::NotFound => response::not_found(),
    }
}

async fn dispatch<B>(
    endpoint: Endpoint,
    params: &PathParams,
    content_type: Option<&str>,
    body: B,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, PortalError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send + 'static,
{
    let admission_no = params.get("admissionNo").unwrap_or_default();

    match endpoint {
        Endpoint::Login => auth::login(body, state).await,
        Endpoint::ListStudents => students::list(state).await,
        Endpoint::GetStudent => students::get(state, admission_no).await,
        Endpoint::AddStudent => students::add(body, state).await,
        Endpoint::UpdateStudent => students::update(body, state).await,
        Endpoint::DeleteStudent => students::delete(state, admission_no).await,
        Endpoint::Announce => students::announce(body, state).await,
        Endpoint::EditNotice => students::edit_notice(body, state, admission_no).await,
        Endpoint::DeleteNotice => students::delete_notice(body, state, admission_no).await,
        Endpoint::Upload => upload::upload(content_type, body, state).await,
        Endpoint::ListAllFiles => files::list_all(state).await,
        Endpoint::ListVisibleFiles => files::list_visible(state, admission_no).await,
        Endpoint::DeleteFile => files::delete(body, state).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn make_state() -> (TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        config.prepare_storage().unwrap();
        let state = AppState::new(&config);
        (dir, state)
    }

    async fn call(state: &AppState, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let body = if body.is_null() {
            Bytes::new()
        } else {
            Bytes::from(body.to_string())
        };
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .unwrap();
        let response = handle_api(req, state).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn add_student(state: &AppState, admission_no: &str) {
        let (status, body) = call(
            state,
            "POST",
            "/api/student/add",
            json!({"admissionNo": admission_no, "name": "Asha", "class": "7B", "phone": "9999"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[test]
    fn test_resolve() {
        let found = resolve(&Method::GET, "/api/files");
        assert!(matches!(found, Resolution::Found(Endpoint::ListAllFiles, _)));
        match resolve(&Method::GET, "/api/files/all") {
            Resolution::Found(Endpoint::ListVisibleFiles, params) => {
                assert_eq!(params.get("admissionNo"), Some("all"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }

        match resolve(&Method::POST, "/api/student/101/notice/edit") {
            Resolution::Found(Endpoint::EditNotice, params) => {
                assert_eq!(params.get("admissionNo"), Some("101"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }

        assert_eq!(resolve(&Method::PUT, "/api/students"), Resolution::MethodNotAllowed);
        assert_eq!(resolve(&Method::GET, "/api/teachers"), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_student_lifecycle() {
        let (_dir, state) = make_state();
        add_student(&state, "101").await;

        let (status, body) = call(&state, "GET", "/api/student/101", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Asha");
        assert_eq!(body["notices"], json!([]));

        let (status, body) = call(
            &state,
            "POST",
            "/api/student/update",
            json!({"admissionNo": "101", "class": "8A", "testResults": [{"subject": "Maths", "score": 91}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student"]["class"], "8A");
        assert_eq!(body["student"]["phone"], "9999");

        let (status, body) = call(&state, "GET", "/api/students", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = call(&state, "DELETE", "/api/student/101", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = call(&state, "GET", "/api/student/101", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Student not found");
    }

    #[tokio::test]
    async fn test_duplicate_add_is_bad_request() {
        let (_dir, state) = make_state();
        add_student(&state, "101").await;

        let (status, body) = call(
            &state,
            "POST",
            "/api/student/add",
            json!({"admissionNo": "101", "name": "Other", "class": "1A", "phone": "1"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Admission number already exists");
    }

    #[tokio::test]
    async fn test_update_unknown_student() {
        let (_dir, state) = make_state();
        let (status, _) = call(
            &state,
            "POST",
            "/api/student/update",
            json!({"admissionNo": "404", "class": "8A"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login() {
        let (_dir, state) = make_state();
        add_student(&state, "101").await;

        let (status, body) = call(
            &state,
            "POST",
            "/api/login",
            json!({"role": "student", "admissionNo": "101", "phone": "9999"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "student");
        assert_eq!(body["student"]["admissionNo"], "101");

        let (status, body) = call(
            &state,
            "POST",
            "/api/login",
            json!({"role": "admin", "username": "admin", "password": "admin123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "role": "admin"}));

        let (status, body) = call(
            &state,
            "POST",
            "/api/login",
            json!({"role": "student", "admissionNo": "101", "phone": "0000"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": "Invalid credentials"}));

        let (status, body) = call(
            &state,
            "POST",
            "/api/login",
            json!({"role": "student", "admissionNo": "101", "phone": 9999}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn test_announcement_and_notice_edits() {
        let (_dir, state) = make_state();

        let (status, body) = call(
            &state,
            "POST",
            "/api/announcement/all",
            json!({"notice": "Holiday on Friday"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "No students"}));

        add_student(&state, "101").await;
        add_student(&state, "102").await;
        let (_, body) = call(
            &state,
            "POST",
            "/api/announcement/all",
            json!({"notice": "Holiday on Friday"}),
        )
        .await;
        assert_eq!(body["message"], "Announcement added to all students");

        let (status, _) = call(
            &state,
            "POST",
            "/api/student/101/notice/edit",
            json!({"index": 0, "newNotice": "Holiday on Monday"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&state, "GET", "/api/student/101", Value::Null).await;
        assert_eq!(body["notices"], json!(["Holiday on Monday"]));
        let (_, body) = call(&state, "GET", "/api/student/102", Value::Null).await;
        assert_eq!(body["notices"], json!(["Holiday on Friday"]));

        let (status, body) = call(
            &state,
            "POST",
            "/api/student/101/notice/delete",
            json!({"index": 5}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");

        let (status, body) = call(
            &state,
            "POST",
            "/api/student/999/notice/delete",
            json!({"index": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");

        let (status, _) = call(
            &state,
            "POST",
            "/api/student/101/notice/delete",
            json!({"index": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&state, "GET", "/api/student/101", Value::Null).await;
        assert_eq!(body["notices"], json!([]));
    }

    #[tokio::test]
    async fn test_file_delete_unknown() {
        let (_dir, state) = make_state();
        let (status, body) = call(
            &state,
            "POST",
            "/api/file/delete",
            json!({"filename": "missing.pdf"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "File not found");

        let (status, body) = call(&state, "GET", "/api/files", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_upload_visibility_and_delete() {
        let (dir, state) = make_state();
        let body = "--b\r\n\
            Content-Disposition: form-data; name=\"audience\"\r\n\r\nprivate\r\n\
            --b\r\n\
            Content-Disposition: form-data; name=\"admissionNo\"\r\n\r\n101\r\n\
            --b\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"report.pdf\"\r\n\r\n\
            marks\r\n\
            --b--\r\n";
        let req = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=b")
            .body(Full::new(Bytes::from(body)))
            .unwrap();
        let response = handle_api(req, &state).await;
        assert_eq!(response.status(), StatusCode::OK);

        let (_, body) = call(&state, "GET", "/api/files/101", Value::Null).await;
        assert_eq!(body[0]["filename"], "report.pdf");
        assert_eq!(body[0]["audience"], "private");
        let (_, body) = call(&state, "GET", "/api/files/102", Value::Null).await;
        assert_eq!(body, json!([]));
        let (_, body) = call(&state, "GET", "/api/files/all", Value::Null).await;
        assert_eq!(body, json!([]));

        let (status, body) = call(&state, "GET", "/api/files", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["admissionNo"], "101");

        let uploads = dir.path().join("uploads");
        assert_eq!(std::fs::read_dir(&uploads).unwrap().count(), 1);

        let (status, _) = call(
            &state,
            "POST",
            "/api/file/delete",
            json!({"filename": "report.pdf"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(std::fs::read_dir(&uploads).unwrap().count(), 0);
        let (_, body) = call(&state, "GET", "/api/files", Value::Null).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let (_dir, state) = make_state();
        let (status, _) = call(&state, "GET", "/api/nothing", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&state, "PUT", "/api/login", Value::Null).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (_dir, state) = make_state();
        let req = Request::builder()
            .method("POST")
            .uri("/api/student/add")
            .body(Full::new(Bytes::from("{oops")))
            .unwrap();
        let response = handle_api(req, &state).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
