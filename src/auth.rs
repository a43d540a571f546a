//! Login credential verification
//!
//! Credentials are compared as plain strings and the admin pair comes from
//! configuration. This is a known security gap: a real deployment should put
//! a hashing verifier behind [`CredentialVerifier`] instead.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::error::PortalError;
use crate::store::{DocumentStore, JsonDirStore, StoreError};
use crate::students::{Student, StudentStore};

/// What a client presents at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Student { admission_no: String, phone: String },
    Admin { username: String, password: String },
}

/// Who a successful login identifies
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Student(Student),
    Admin,
}

#[allow(async_fn_in_trait)]
pub trait CredentialVerifier {
    /// `Ok(None)` for any rejected login; callers must not reveal why
    async fn verify(&self, credentials: &Credentials) -> Result<Option<Principal>, PortalError>;
}

/// Exact, case-sensitive string comparison against stored phone numbers and
/// the configured admin pair
pub struct PlaintextVerifier<S = JsonDirStore> {
    students: Arc<StudentStore<S>>,
    admin: AdminConfig,
}

impl<S: DocumentStore> PlaintextVerifier<S> {
    pub const fn new(students: Arc<StudentStore<S>>, admin: AdminConfig) -> Self {
        Self { students, admin }
    }
}

impl<S: DocumentStore> CredentialVerifier for PlaintextVerifier<S> {
    async fn verify(&self, credentials: &Credentials) -> Result<Option<Principal>, PortalError> {
        match credentials {
            Credentials::Student {
                admission_no,
                phone,
            } => {
                let student = match self.students.find(admission_no).await {
                    Ok(found) => found,
                    // Unusable admission numbers are just unknown students
                    Err(PortalError::Store(StoreError::InvalidKey(_))) => None,
                    Err(e) => return Err(e),
                };
                Ok(student
                    .filter(|s| s.phone == *phone)
                    .map(Principal::Student))
            }
            Credentials::Admin { username, password } => {
                let matches = *username == self.admin.username && *password == self.admin.password;
                Ok(matches.then_some(Principal::Admin))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::NewStudent;
    use tempfile::TempDir;

    async fn make_verifier() -> (TempDir, PlaintextVerifier) {
        let dir = tempfile::tempdir().unwrap();
        let students = Arc::new(StudentStore::new(JsonDirStore::new(dir.path())));
        students
            .create(NewStudent {
                admission_no: "101".into(),
                name: "Asha".into(),
                class: "5A".into(),
                phone: "9999".into(),
            })
            .await
            .unwrap();
        (dir, PlaintextVerifier::new(students, AdminConfig::default()))
    }

    fn student(admission_no: &str, phone: &str) -> Credentials {
        Credentials::Student {
            admission_no: admission_no.into(),
            phone: phone.into(),
        }
    }

    fn admin(username: &str, password: &str) -> Credentials {
        Credentials::Admin {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_student_login_returns_full_record() {
        let (_dir, verifier) = make_verifier().await;
        let Some(Principal::Student(record)) = verifier.verify(&student("101", "9999")).await.unwrap()
        else {
            panic!("expected a student principal");
        };
        assert_eq!(record.name, "Asha");
        assert!(record.notices.is_empty());
    }

    #[tokio::test]
    async fn test_student_login_failures_are_indistinguishable() {
        let (_dir, verifier) = make_verifier().await;
        for creds in [
            student("101", "0000"),
            student("101", " 9999"),
            student("999", "9999"),
            student("../101", "9999"),
        ] {
            assert_eq!(verifier.verify(&creds).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_admin_login() {
        let (_dir, verifier) = make_verifier().await;
        assert_eq!(
            verifier.verify(&admin("admin", "admin123")).await.unwrap(),
            Some(Principal::Admin)
        );
        for creds in [admin("admin", "admin124"), admin("Admin", "admin123"), admin("", "")] {
            assert_eq!(verifier.verify(&creds).await.unwrap(), None);
        }
    }
}
