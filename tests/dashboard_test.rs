//! Dashboard Integration Tests
//!
//! Tab dispatch, uploads and failure handling against the mock backend.

use async_trait::async_trait;
use decanat::error::ServiceError;
use decanat::models::{
    Course, HostelAssignment, NewCourse, PayingStudent, Program, RecordId, Role, UploadFile,
    UploadKind, UploadResult,
};
use decanat::services::{DomainApi, MockBackend, MockConfig, Operation, UploadForm};
use decanat::views::{DashboardView, FetchStatus, Resource, RowAction, Severity, UploadOutcome};
use decanat::{AuthService, Navigator, ResponseInterceptor, Route, SessionStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

struct Harness {
    backend: Arc<MockBackend>,
    session: SessionStore,
    navigator: Navigator,
    view: DashboardView,
}

fn harness_with(user: &str, config: MockConfig) -> Harness {
    let session = SessionStore::in_memory();
    session.set(&format!("mock:{}", user)).unwrap();
    let navigator = Navigator::default();
    let backend = Arc::new(
        MockBackend::new(session.clone(), config)
            .with_interceptor(ResponseInterceptor::new(session.clone(), navigator.clone())),
    );
    let auth = AuthService::new(backend.clone(), session.clone());
    let view = DashboardView::new(auth, backend.clone(), navigator.clone(), Duration::from_secs(6));

    Harness {
        backend,
        session,
        navigator,
        view,
    }
}

async fn mounted(user: &str) -> Harness {
    let h = harness_with(user, MockConfig::instant());
    h.view.mount().await.unwrap();
    h
}

fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

fn png(name: &str) -> UploadFile {
    UploadFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

fn notification(view: &DashboardView) -> Option<(String, Severity)> {
    view.with_state(|s| {
        s.notifier
            .latest()
            .map(|n| (n.message.clone(), n.severity))
    })
}

#[tokio::test]
async fn test_admin_mount_loads_courses_only() {
    let h = mounted("admin").await;

    assert_eq!(h.backend.calls(Operation::CurrentUser), 1);
    assert_eq!(h.backend.calls(Operation::ListCourses), 1);
    assert_eq!(h.backend.calls(Operation::HostelInfo), 0);

    let state = h.view.snapshot();
    assert_eq!(state.role(), Some(Role::Admin));
    assert_eq!(state.active_tab, 0);
    assert_eq!(state.courses.data.len(), 3);
    assert!(!state.courses.loading);
}

#[tokio::test]
async fn test_admin_tab_dispatch() {
    let h = mounted("admin").await;

    assert_eq!(h.view.select_tab(1).await, FetchStatus::Loaded);
    assert_eq!(h.backend.calls(Operation::ListPrograms), 1);
    assert_eq!(h.view.snapshot().programs.data[0].name, "prog-1");

    assert_eq!(h.view.select_tab(2).await, FetchStatus::Loaded);
    assert_eq!(h.backend.calls(Operation::ListPayingStudents), 1);
    assert_eq!(h.backend.calls(Operation::HostelInfo), 0);

    let names: Vec<String> = h
        .view
        .snapshot()
        .paying_students
        .data
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(names, vec!["Petr", "Vanya", "Ivan"]);
}

#[tokio::test]
async fn test_student_mount_fetches_hostel_once() {
    let h = mounted("student").await;

    assert_eq!(h.backend.calls(Operation::ListCourses), 1);
    assert_eq!(h.backend.calls(Operation::HostelInfo), 1);

    let state = h.view.snapshot();
    let hostel = state.hostel.data.unwrap();
    assert_eq!(hostel.room, "412");
    assert_eq!(hostel.floor, "4");
}

#[tokio::test]
async fn test_student_tab_two_fetches_hostel() {
    let h = mounted("student").await;
    h.backend.reset_calls();

    assert_eq!(h.view.select_tab(2).await, FetchStatus::Loaded);
    assert_eq!(h.backend.calls(Operation::HostelInfo), 1);
    assert_eq!(h.backend.calls(Operation::ListPayingStudents), 0);
}

#[tokio::test]
async fn test_student_receipt_tab_is_upload_only() {
    let h = mounted("student").await;
    h.backend.reset_calls();

    assert_eq!(h.view.select_tab(1).await, FetchStatus::Skipped);
    assert!(!h.view.snapshot().can_refresh());
    assert_eq!(h.view.refresh().await, FetchStatus::Skipped);

    for op in [
        Operation::ListCourses,
        Operation::ListPrograms,
        Operation::ListPayingStudents,
        Operation::HostelInfo,
    ] {
        assert_eq!(h.backend.calls(op), 0, "{} should not be called", op);
    }
}

#[tokio::test]
async fn test_unknown_tab_is_ignored() {
    let h = mounted("admin").await;
    assert_eq!(h.view.select_tab(7).await, FetchStatus::Skipped);
    assert_eq!(h.view.snapshot().active_tab, 0);
}

#[tokio::test]
async fn test_refresh_refetches_active_tab() {
    let h = mounted("admin").await;
    assert_eq!(h.view.refresh().await, FetchStatus::Loaded);
    assert_eq!(h.backend.calls(Operation::ListCourses), 2);
}

#[tokio::test]
async fn test_wrong_file_type_never_reaches_service() {
    let h = mounted("admin").await;

    let outcome = h.view.upload(UploadKind::Course, png("scan.png")).await;

    assert_eq!(outcome, UploadOutcome::Rejected);
    assert_eq!(h.backend.calls(Operation::UploadFile), 0);
    assert_eq!(
        notification(&h.view),
        Some(("Please upload a PDF file".to_string(), Severity::Error))
    );
}

#[tokio::test]
async fn test_student_receipt_must_be_png() {
    let h = mounted("student").await;

    let outcome = h.view.upload(UploadKind::Payment, pdf("receipt.pdf")).await;

    assert_eq!(outcome, UploadOutcome::Rejected);
    assert_eq!(h.backend.calls(Operation::UploadFile), 0);
    assert_eq!(
        notification(&h.view),
        Some(("Please upload a PNG file".to_string(), Severity::Error))
    );
}

#[tokio::test]
async fn test_content_type_comparison_ignores_case() {
    let h = mounted("admin").await;
    let file = UploadFile::new("a.pdf", "Application/PDF", vec![1]);
    assert_eq!(h.view.upload(UploadKind::Course, file).await, UploadOutcome::Uploaded);
}

#[tokio::test]
async fn test_course_upload_refetches_courses_once() {
    let h = mounted("admin").await;
    h.backend.reset_calls();

    let outcome = h.view.upload(UploadKind::Course, pdf("Topology.pdf")).await;

    assert_eq!(outcome, UploadOutcome::Uploaded);
    assert_eq!(h.backend.calls(Operation::UploadFile), 1);
    assert_eq!(h.backend.calls(Operation::ListCourses), 1);
    assert_eq!(h.backend.calls(Operation::ListPrograms), 0);

    let state = h.view.snapshot();
    assert!(state.courses.data.iter().any(|c| c.name == "Topology"));
    assert_eq!(
        notification(&h.view),
        Some(("File uploaded successfully".to_string(), Severity::Success))
    );
}

#[tokio::test]
async fn test_program_upload_refetches_programs_once() {
    let h = mounted("admin").await;
    h.view.select_tab(1).await;
    h.backend.reset_calls();

    let outcome = h.view.upload(UploadKind::Program, pdf("prog-4.pdf")).await;

    assert_eq!(outcome, UploadOutcome::Uploaded);
    assert_eq!(h.backend.calls(Operation::ListPrograms), 1);
    assert_eq!(h.backend.calls(Operation::ListCourses), 0);
    assert_eq!(h.view.snapshot().programs.data.len(), 4);
}

#[tokio::test]
async fn test_payment_upload_refetches_nothing() {
    let h = mounted("student").await;
    h.view.select_tab(1).await;
    h.backend.reset_calls();

    let outcome = h.view.upload(UploadKind::Payment, png("receipt.png")).await;

    assert_eq!(outcome, UploadOutcome::Uploaded);
    assert_eq!(h.backend.calls(Operation::UploadFile), 1);
    assert_eq!(h.backend.calls(Operation::ListCourses), 0);
    assert_eq!(h.backend.calls(Operation::HostelInfo), 0);
    assert_eq!(h.backend.catalog().uploads().len(), 1);
}

#[tokio::test]
async fn test_upload_kind_must_match_role() {
    let h = mounted("student").await;
    let outcome = h.view.upload(UploadKind::Course, pdf("a.pdf")).await;
    assert_eq!(outcome, UploadOutcome::NotAllowed);
    assert_eq!(h.backend.calls(Operation::UploadFile), 0);
}

#[tokio::test]
async fn test_non_success_status_reports_failure() {
    let h = mounted("admin").await;
    h.backend.set_upload_status("error");
    h.backend.reset_calls();

    let outcome = h.view.upload(UploadKind::Course, pdf("a.pdf")).await;

    assert_eq!(outcome, UploadOutcome::Failed);
    assert_eq!(h.backend.calls(Operation::ListCourses), 0);
    assert_eq!(
        notification(&h.view),
        Some(("File upload failed".to_string(), Severity::Error))
    );
    assert!(!h.view.snapshot().is_uploading(UploadKind::Course));
}

#[tokio::test]
async fn test_second_upload_of_same_kind_is_busy() {
    let h = harness_with(
        "admin",
        MockConfig {
            read_delay: Duration::ZERO,
            upload_delay: Duration::from_millis(200),
        },
    );
    h.view.mount().await.unwrap();

    let first = {
        let view = h.view.clone();
        tokio::spawn(async move { view.upload(UploadKind::Course, pdf("a.pdf")).await })
    };
    while !h.view.snapshot().is_uploading(UploadKind::Course) {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        h.view.upload(UploadKind::Course, pdf("b.pdf")).await,
        UploadOutcome::Busy
    );
    assert_eq!(first.await.unwrap(), UploadOutcome::Uploaded);
    assert_eq!(h.backend.calls(Operation::UploadFile), 1);
}

#[tokio::test]
async fn test_failed_fetch_invalidates_session() {
    let h = mounted("admin").await;
    h.backend.fail(Operation::ListPrograms, 500);

    assert_eq!(h.view.select_tab(1).await, FetchStatus::Failed);

    assert!(!h.session.is_present());
    let nav = h.navigator.current();
    assert_eq!(nav.route, Route::Login);
    assert!(nav.hard);
    assert_eq!(
        notification(&h.view),
        Some(("Failed to load the program list".to_string(), Severity::Error))
    );
}

#[tokio::test]
async fn test_rejected_session_on_mount_goes_to_login() {
    let h = harness_with("admin", MockConfig::instant());
    h.backend.fail(Operation::CurrentUser, 401);

    assert!(h.view.mount().await.is_err());
    assert!(!h.session.is_present());
    assert_eq!(h.navigator.current().route, Route::Login);
    assert_eq!(h.backend.calls(Operation::ListCourses), 0);
}

#[tokio::test]
async fn test_row_actions_are_local_only() {
    let h = mounted("admin").await;

    let done = h.view.perform_row_action(0).unwrap();
    assert_eq!(done.action, RowAction::DeleteCourse);
    assert_eq!(done.name, "Linear algebra");
    assert_eq!(h.backend.catalog().courses().len(), 3);
    assert_eq!(h.view.snapshot().local_actions.len(), 1);

    assert!(h.view.perform_row_action(10).is_none());
    assert!(h.view.delete_course(RecordId::new()).is_none());
}

#[tokio::test]
async fn test_confirm_payment_by_id() {
    let h = mounted("admin").await;
    h.view.select_tab(2).await;

    let id = h.view.snapshot().paying_students.data[1].id;
    let done = h.view.confirm_payment(id).unwrap();
    assert_eq!(done.name, "Vanya");
}

#[tokio::test]
async fn test_students_have_no_row_actions() {
    let h = mounted("student").await;
    let id = h.view.snapshot().courses.data[0].id;

    assert!(h.view.perform_row_action(0).is_none());
    assert!(h.view.delete_course(id).is_none());
}

#[tokio::test]
async fn test_logout_clears_session_and_navigates() {
    let h = mounted("admin").await;
    h.view.logout();

    assert!(!h.session.is_present());
    let nav = h.navigator.current();
    assert_eq!(nav.route, Route::Login);
    assert!(!nav.hard);
}

/// Domain API whose first course listing waits until released
struct ScriptedApi {
    course_calls: AtomicUsize,
    release: Notify,
}

impl ScriptedApi {
    fn new() -> Self {
        Self {
            course_calls: AtomicUsize::new(0),
            release: Notify::new(),
        }
    }
}

fn course(name: &str) -> Course {
    Course {
        id: RecordId::new(),
        name: name.to_string(),
    }
}

#[async_trait]
impl DomainApi for ScriptedApi {
    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        let call = self.course_calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            self.release.notified().await;
            Ok(vec![course("old")])
        } else {
            Ok(vec![course("new")])
        }
    }

    async fn list_programs(&self) -> Result<Vec<Program>, ServiceError> {
        Ok(Vec::new())
    }

    async fn list_paying_students(&self) -> Result<Vec<PayingStudent>, ServiceError> {
        Ok(Vec::new())
    }

    async fn hostel_info(&self) -> Result<HostelAssignment, ServiceError> {
        Err(ServiceError::Status(404))
    }

    async fn add_course(&self, _course: &NewCourse) -> Result<UploadResult, ServiceError> {
        Ok(UploadResult::success())
    }

    async fn upload_file(&self, _form: UploadForm) -> Result<UploadResult, ServiceError> {
        Ok(UploadResult::success())
    }
}

#[tokio::test]
async fn test_stale_response_is_dropped() {
    let session = SessionStore::in_memory();
    session.set("mock:admin").unwrap();
    let navigator = Navigator::default();
    let auth_backend = Arc::new(MockBackend::new(session.clone(), MockConfig::instant()));
    let api = Arc::new(ScriptedApi::new());
    let view = DashboardView::new(
        AuthService::new(auth_backend, session),
        api.clone(),
        navigator,
        Duration::from_secs(6),
    );

    let slow = {
        let view = view.clone();
        tokio::spawn(async move { view.fetch(Resource::Courses).await })
    };
    while api.course_calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(view.fetch(Resource::Courses).await, FetchStatus::Loaded);
    api.release.notify_one();
    assert_eq!(slow.await.unwrap(), FetchStatus::Stale);

    let state = view.snapshot();
    assert_eq!(state.courses.data.len(), 1);
    assert_eq!(state.courses.data[0].name, "new");
    assert!(!state.courses.loading);
}
