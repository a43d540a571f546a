// Request and response payloads of the portal API

use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::students::Student;

/// `POST /api/login` body; which fields matter depends on `role`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub role: Option<String>,
    pub admission_no: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// `None` for an unknown role or missing fields
    pub fn into_credentials(self) -> Option<Credentials> {
        match self.role.as_deref()? {
            "student" => Some(Credentials::Student {
                admission_no: self.admission_no?,
                phone: self.phone?,
            }),
            "admin" => Some(Credentials::Admin {
                username: self.username?,
                password: self.password?,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub success: bool,
    pub student: Student,
}

/// `POST /api/announcement/all`
#[derive(Debug, Deserialize)]
pub struct AnnouncementRequest {
    pub notice: String,
}

/// `POST /api/student/:admissionNo/notice/edit`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditNoticeRequest {
    pub index: i64,
    pub new_notice: String,
}

/// `POST /api/student/:admissionNo/notice/delete`
#[derive(Debug, Deserialize)]
pub struct DeleteNoticeRequest {
    pub index: i64,
}

/// `POST /api/file/delete`
#[derive(Debug, Deserialize)]
pub struct DeleteFileRequest {
    pub filename: String,
}
