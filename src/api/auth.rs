// Login endpoint

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};

use super::request::read_json;
use super::response::json_response;
use super::types::{LoginRequest, LoginResponse};
use super::BoxError;
use crate::auth::{CredentialVerifier, Principal};
use crate::config::AppState;
use crate::error::PortalError;

/// POST /api/login
pub async fn login<B>(body: B, state: &AppState) -> Result<Response<Full<Bytes>>, PortalError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    // Every rejected login looks the same, undecodable bodies included
    let request: LoginRequest = read_json(body)
        .await
        .map_err(|_| PortalError::Unauthorized)?;
    let credentials = request.into_credentials().ok_or(PortalError::Unauthorized)?;

    let response = match state.verifier.verify(&credentials).await? {
        Some(Principal::Student(student)) => LoginResponse {
            success: true,
            role: "student",
            student: Some(student),
        },
        Some(Principal::Admin) => LoginResponse {
            success: true,
            role: "admin",
            student: None,
        },
        None => return Err(PortalError::Unauthorized),
    };
    Ok(json_response(StatusCode::OK, &response))
}
