//! In-process mock backend
//!
//! Serves the demo catalog with artificial delays. Failures can be injected
//! per operation as simulated HTTP statuses; when an interceptor is attached,
//! those statuses go through the same session-invalidation path as real
//! responses.

use super::{auth_failure, AuthApi, DomainApi, Operation, UploadForm};
use crate::catalog::Catalog;
use crate::error::{AuthError, ServiceError};
use crate::http::ResponseInterceptor;
use crate::models::{
    Course, Credentials, HostelAssignment, Identity, NewCourse, PayingStudent, Program, Role,
    UploadResult,
};
use crate::session::SessionStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Tokens issued by the mock carry this prefix followed by the username
const MOCK_TOKEN_PREFIX: &str = "mock:";

/// Artificial latency settings
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Delay before read operations complete (default: 300ms)
    pub read_delay: Duration,
    /// Delay before uploads complete (default: 5s)
    pub upload_delay: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            read_delay: Duration::from_millis(300),
            upload_delay: Duration::from_secs(5),
        }
    }
}

impl MockConfig {
    /// No artificial latency
    pub fn instant() -> Self {
        Self {
            read_delay: Duration::ZERO,
            upload_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
struct MockUser {
    password: String,
    role: Role,
}

/// Mock implementation of both service traits
pub struct MockBackend {
    catalog: Arc<Catalog>,
    session: SessionStore,
    interceptor: Option<ResponseInterceptor>,
    config: MockConfig,
    users: HashMap<String, MockUser>,
    calls: Mutex<HashMap<Operation, usize>>,
    failures: Mutex<HashMap<Operation, u16>>,
    upload_status: Mutex<String>,
}

impl MockBackend {
    /// Mock with the demo catalog and the `admin`/`student` demo accounts
    pub fn new(session: SessionStore, config: MockConfig) -> Self {
        Self {
            catalog: Arc::new(Catalog::seeded()),
            session,
            interceptor: None,
            config,
            users: HashMap::new(),

            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            upload_status: Mutex::new(UploadResult::SUCCESS.to_string()),
        }
        .with_user("admin", "admin", Role::Admin)
        .with_user("student", "student", Role::Student)
    }

    /// Route simulated failures through a response interceptor
    pub fn with_interceptor(mut self, interceptor: ResponseInterceptor) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Add or replace an account
    pub fn with_user(mut self, username: &str, password: &str, role: Role) -> Self {
        self.users.insert(
            username.to_string(),
            MockUser {
                password: password.to_string(),
                role,
            },
        );
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Number of times an operation was invoked
    pub fn calls(&self, op: Operation) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    /// Make every following call of `op` fail with `status`
    pub fn fail(&self, op: Operation, status: u16) {
        self.failures.lock().insert(op, status);
    }

    /// Undo [`fail`](Self::fail)
    pub fn recover(&self, op: Operation) {
        self.failures.lock().remove(&op);
    }

    /// Status string returned by following uploads
    pub fn set_upload_status(&self, status: &str) {
        *self.upload_status.lock() = status.to_string();
    }

    fn record(&self, op: Operation) {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        debug!("Mock backend: {}", op);
    }

    /// Report a simulated response status
    fn reject(&self, status: u16) -> ServiceError {
        match &self.interceptor {
            Some(interceptor) => match interceptor.observe(status) {
                Err(e) => e,
                Ok(()) => ServiceError::Status(status),
            },
            None => ServiceError::Status(status),
        }
    }

    /// Count the call and apply any injected failure
    fn enter(&self, op: Operation) -> Result<(), ServiceError> {
        self.record(op);
        let injected = self.failures.lock().get(&op).copied();
        match injected {
            Some(status) => Err(self.reject(status)),
            None => Ok(()),
        }
    }

    async fn delay(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn user_for_token(&self, token: &str) -> Option<Identity> {
        let username = token.strip_prefix(MOCK_TOKEN_PREFIX)?;
        self.users.get(username).map(|user| Identity {
            username: username.to_string(),
            role: user.role,
        })
    }
}

#[async_trait]
impl AuthApi for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.enter(Operation::Login)
            .map_err(|e| auth_failure(e, AuthError::InvalidCredentials))?;
        self.delay(self.config.read_delay).await;

        match self.users.get(&credentials.login) {
            Some(user) if user.password == credentials.password => {
                info!("Mock login for {}", credentials.login);
                Ok(format!("{}{}", MOCK_TOKEN_PREFIX, credentials.login))
            }
            _ => Err(auth_failure(self.reject(401), AuthError::InvalidCredentials)),
        }
    }

    async fn current_user(&self) -> Result<Identity, AuthError> {
        self.enter(Operation::CurrentUser)
            .map_err(|e| auth_failure(e, AuthError::SessionRejected))?;
        self.delay(self.config.read_delay).await;

        let token = self.session.token().ok_or(AuthError::NoSession)?;
        match self.user_for_token(&token) {
            Some(identity) => Ok(identity),
            None => Err(auth_failure(self.reject(401), AuthError::SessionRejected)),
        }
    }
}

#[async_trait]
impl DomainApi for MockBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        self.enter(Operation::ListCourses)?;
        self.delay(self.config.read_delay).await;
        Ok(self.catalog.courses())
    }

    async fn list_programs(&self) -> Result<Vec<Program>, ServiceError> {
        self.enter(Operation::ListPrograms)?;
        self.delay(self.config.read_delay).await;
        Ok(self.catalog.programs())
    }

    async fn list_paying_students(&self) -> Result<Vec<PayingStudent>, ServiceError> {
        self.enter(Operation::ListPayingStudents)?;
        self.delay(self.config.read_delay).await;
        Ok(self.catalog.paying_students())
    }

    async fn hostel_info(&self) -> Result<HostelAssignment, ServiceError> {
        self.enter(Operation::HostelInfo)?;
        self.delay(self.config.read_delay).await;
        Ok(self.catalog.hostel())
    }

    async fn add_course(&self, course: &NewCourse) -> Result<UploadResult, ServiceError> {
        self.enter(Operation::AddCourse)?;
        self.delay(self.config.read_delay).await;
        self.catalog.add_course(&course.name);
        Ok(UploadResult::success())
    }

    async fn upload_file(&self, form: UploadForm) -> Result<UploadResult, ServiceError> {
        self.enter(Operation::UploadFile)?;
        self.delay(self.config.upload_delay).await;

        let result = UploadResult {
            status: self.upload_status.lock().clone(),
        };
        if result.is_success() {
            self.catalog.store_upload(form.kind, &form.file);
        }
        Ok(result)
    }
}
