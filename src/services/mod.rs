//! Backend Service Interfaces
//!
//! Identity and domain operations as async traits, with two implementations:
//! an in-process mock and an HTTP backend.

pub mod mock;
pub mod remote;

use crate::error::{AuthError, ServiceError};
use crate::models::{
    Course, Credentials, HostelAssignment, Identity, NewCourse, PayingStudent, Program,
    UploadFile, UploadKind, UploadResult,
};
use async_trait::async_trait;
use std::fmt;

pub use mock::{MockBackend, MockConfig};
pub use remote::HttpBackend;

/// Identity operations
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError>;

    /// Resolve the current session to an identity
    async fn current_user(&self) -> Result<Identity, AuthError>;
}

/// Role-scoped domain operations
#[async_trait]
pub trait DomainApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError>;

    async fn list_programs(&self) -> Result<Vec<Program>, ServiceError>;

    async fn list_paying_students(&self) -> Result<Vec<PayingStudent>, ServiceError>;

    async fn hostel_info(&self) -> Result<HostelAssignment, ServiceError>;

    async fn add_course(&self, course: &NewCourse) -> Result<UploadResult, ServiceError>;

    /// Generic multipart upload
    async fn upload_file(&self, form: UploadForm) -> Result<UploadResult, ServiceError>;
}

/// Map a failed identity call: rejections become `rejected`, anything else
/// means the backend could not answer
pub(crate) fn auth_failure(err: ServiceError, rejected: AuthError) -> AuthError {
    match err {
        ServiceError::Status(401) | ServiceError::Status(403) => rejected,
        other => AuthError::Unavailable(other.to_string()),
    }
}

/// Multipart upload payload: a `kind` text field and a `file` part
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub kind: UploadKind,
    pub file: UploadFile,
}

impl UploadForm {
    pub const KIND_FIELD: &'static str = "kind";
    pub const FILE_FIELD: &'static str = "file";

    pub fn new(kind: UploadKind, file: UploadFile) -> Self {
        Self { kind, file }
    }
}

/// Backend operations, used for call accounting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    CurrentUser,
    ListCourses,
    ListPrograms,
    ListPayingStudents,
    HostelInfo,
    AddCourse,
    UploadFile,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::CurrentUser => "current_user",
            Operation::ListCourses => "list_courses",
            Operation::ListPrograms => "list_programs",
            Operation::ListPayingStudents => "list_paying_students",
            Operation::HostelInfo => "hostel_info",
            Operation::AddCourse => "add_course",
            Operation::UploadFile => "upload_file",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_mapping() {
        assert!(matches!(
            auth_failure(ServiceError::Status(401), AuthError::SessionRejected),
            AuthError::SessionRejected
        ));
        assert!(matches!(
            auth_failure(ServiceError::Status(403), AuthError::InvalidCredentials),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            auth_failure(ServiceError::Status(500), AuthError::SessionRejected),
            AuthError::Unavailable(_)
        ));
        assert!(matches!(
            auth_failure(ServiceError::Transport("refused".into()), AuthError::SessionRejected),
            AuthError::Unavailable(_)
        ));
    }
}
