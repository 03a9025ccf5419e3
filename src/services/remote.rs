//! HTTP backend
//!
//! Talks to a real (or stub) server through [`ApiClient`], so every response
//! passes the session interceptor.

use super::{auth_failure, AuthApi, DomainApi, UploadForm};
use crate::error::{AuthError, ServiceError};
use crate::http::ApiClient;
use crate::models::{
    AuthResponse, Course, Credentials, HostelAssignment, Identity, NewCourse, PayingStudent,
    Program, UploadResult,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::info;

pub const LOGIN_PATH: &str = "/login";
pub const ME_PATH: &str = "/me";
pub const COURSES_PATH: &str = "/courses";
pub const PROGRAMS_PATH: &str = "/education-progress";
pub const PAYING_STUDENTS_PATH: &str = "/paying/students";
pub const HOSTEL_PATH: &str = "/hostel";

/// HTTP implementation of both service traits
#[derive(Clone)]
pub struct HttpBackend {
    api: ApiClient,
}

impl HttpBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

fn multipart(form: UploadForm) -> Result<Form, ServiceError> {
    let part = Part::bytes(form.file.bytes)
        .file_name(form.file.file_name)
        .mime_str(&form.file.content_type)?;

    Ok(Form::new()
        .text(UploadForm::KIND_FIELD, form.kind.as_str())
        .part(UploadForm::FILE_FIELD, part))
}

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let response: AuthResponse = self
            .api
            .post_json(LOGIN_PATH, credentials)
            .await
            .map_err(|e| auth_failure(e, AuthError::InvalidCredentials))?;

        info!("Logged in as {}", credentials.login);
        Ok(response.access_token)
    }

    async fn current_user(&self) -> Result<Identity, AuthError> {
        if !self.api.session().is_present() {
            return Err(AuthError::NoSession);
        }

        self.api
            .get_json(ME_PATH)
            .await
            .map_err(|e| auth_failure(e, AuthError::SessionRejected))
    }
}

#[async_trait]
impl DomainApi for HttpBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        self.api.get_json(COURSES_PATH).await
    }

    async fn list_programs(&self) -> Result<Vec<Program>, ServiceError> {
        self.api.get_json(PROGRAMS_PATH).await
    }

    async fn list_paying_students(&self) -> Result<Vec<PayingStudent>, ServiceError> {
        self.api.get_json(PAYING_STUDENTS_PATH).await
    }

    async fn hostel_info(&self) -> Result<HostelAssignment, ServiceError> {
        self.api.get_json(HOSTEL_PATH).await
    }

    async fn add_course(&self, course: &NewCourse) -> Result<UploadResult, ServiceError> {
        self.api.post_json(COURSES_PATH, course).await
    }

    async fn upload_file(&self, form: UploadForm) -> Result<UploadResult, ServiceError> {
        let kind = form.kind;
        let result: UploadResult = self.api.post_multipart(PROGRAMS_PATH, multipart(form)?).await?;
        info!("Uploaded {} file: {}", kind, result.status);
        Ok(result)
    }
}
