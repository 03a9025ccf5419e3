//! App Shell Integration Tests
//!
//! Session gate, login and logout through the terminal driver, with the
//! session persisted to a temporary storage file.

use decanat::services::{MockBackend, MockConfig, Operation};
use decanat::terminal::Terminal;
use decanat::{App, AppContext, Config, Navigator, ResponseInterceptor, Route, Screen, SessionStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn storage_path(dir: &TempDir) -> PathBuf {
    dir.path().join("storage.json")
}

fn terminal(path: &Path) -> (Terminal, Arc<MockBackend>, SessionStore) {
    let session = SessionStore::open(path).expect("Failed to open session storage");
    let navigator = Navigator::default();
    let backend = Arc::new(
        MockBackend::new(session.clone(), MockConfig::instant())
            .with_interceptor(ResponseInterceptor::new(session.clone(), navigator.clone())),
    );
    let ctx = AppContext::new(
        session.clone(),
        navigator,
        backend.clone(),
        backend.clone(),
        Duration::from_secs(6),
    );
    (Terminal::new(App::new(ctx)), backend, session)
}

#[tokio::test]
async fn test_login_persists_token_and_shows_dashboard() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = storage_path(&dir);
    let (mut term, _, _) = terminal(&path);

    let screen = term.start().await;
    assert!(screen.contains("Sign in"));
    assert_eq!(term.app().route(), Some(Route::Login));

    let out = term.handle("login admin admin").await.unwrap();
    assert_eq!(term.app().route(), Some(Route::Dashboard));
    assert!(out.contains("Welcome, admin!"));
    assert!(out.contains("Linear algebra"));

    let reopened = assert_ok!(SessionStore::open(&path));
    assert_eq!(reopened.token().as_deref(), Some("mock:admin"));

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["access_token"], "mock:admin");
}

#[tokio::test]
async fn test_failed_login_keeps_form_and_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut term, _, session) = terminal(&storage_path(&dir));
    term.start().await;

    let out = term.handle("login admin wrong").await.unwrap();

    assert_eq!(term.app().route(), Some(Route::Login));
    assert!(out.contains("Invalid email or password"));
    assert!(!session.is_present());
}

#[tokio::test]
async fn test_existing_token_opens_dashboard() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = storage_path(&dir);
    {
        let session = SessionStore::open(&path).unwrap();
        assert_ok!(session.set("mock:student"));
    }

    let (mut term, backend, _) = terminal(&path);
    let screen = term.start().await;

    assert_eq!(term.app().route(), Some(Route::Dashboard));
    assert!(screen.contains("[S] Welcome, student!"));
    assert_eq!(backend.calls(Operation::HostelInfo), 1);

    let out = term.handle("tab 2").await.unwrap();
    assert!(out.contains("Dormitory No. 1"));
    assert!(out.contains("Alice"));
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = storage_path(&dir);
    let (mut term, _, session) = terminal(&path);
    term.start().await;
    term.handle("login admin admin").await.unwrap();

    let out = term.handle("logout").await.unwrap();

    assert!(out.contains("Sign in"));
    assert!(!session.is_present());
    let reopened = SessionStore::open(&path).unwrap();
    assert!(reopened.token().is_none());
}

#[tokio::test]
async fn test_server_error_tears_down_dashboard() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut term, backend, session) = terminal(&storage_path(&dir));
    term.start().await;
    term.handle("login admin admin").await.unwrap();

    backend.fail(Operation::ListPrograms, 503);
    let out = term.handle("tab 1").await.unwrap();

    assert!(matches!(term.app().screen(), Screen::Login(_)));
    assert!(out.contains("Sign in"));
    assert!(!session.is_present());
}

#[tokio::test]
async fn test_dashboard_route_is_guarded() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut term, backend, _) = terminal(&storage_path(&dir));
    term.start().await;

    let out = term.handle("open /").await.unwrap();

    assert!(out.contains("Sign in"));
    assert_eq!(backend.calls(Operation::CurrentUser), 0);
}

#[tokio::test]
async fn test_dashboard_commands_need_a_session() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut term, _, _) = terminal(&storage_path(&dir));
    term.start().await;

    let out = term.handle("tab 1").await.unwrap();
    assert!(out.starts_with("Sign in first"));
}

#[tokio::test]
async fn test_upload_from_disk() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut term, backend, _) = terminal(&storage_path(&dir));
    term.start().await;
    term.handle("login admin admin").await.unwrap();

    let pdf = dir.path().join("Topology.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();
    let out = term
        .handle(&format!("upload course {}", pdf.display()))
        .await
        .unwrap();

    assert!(out.contains("Topology"));
    assert!(out.contains("File uploaded successfully"));
    assert_eq!(backend.calls(Operation::UploadFile), 1);

    let png = dir.path().join("scan.png");
    std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();
    let out = term
        .handle(&format!("upload course {}", png.display()))
        .await
        .unwrap();

    assert!(out.contains("Please upload a PDF file"));
    assert_eq!(backend.calls(Operation::UploadFile), 1);
}

#[tokio::test]
async fn test_row_commands_match_the_tab() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut term, _, _) = terminal(&storage_path(&dir));
    term.start().await;
    term.handle("login admin admin").await.unwrap();

    let out = term.handle("confirm 1").await.unwrap();
    assert!(out.starts_with("That action is not available on this tab"));

    let out = term.handle("delete 1").await.unwrap();
    assert!(out.starts_with("Delete: Linear algebra"));
}

#[tokio::test]
async fn test_damaged_storage_starts_signed_out() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = storage_path(&dir);
    std::fs::write(&path, r#"{"access_token": "abc"#).unwrap();

    let config = Config {
        storage_path: path.clone(),
        mock_read_delay: Duration::ZERO,
        mock_upload_delay: Duration::ZERO,
        ..Config::default()
    };
    let ctx = assert_ok!(AppContext::from_config(&config));
    assert!(!ctx.session.is_present());

    let mut term = Terminal::new(App::new(ctx));
    let screen = term.start().await;
    assert!(screen.contains("Sign in"));
    assert_eq!(term.app().route(), Some(Route::Login));

    term.handle("login admin admin").await.unwrap();
    let reopened = assert_ok!(SessionStore::open(&path));
    assert_eq!(reopened.token().as_deref(), Some("mock:admin"));
}

#[test]
fn test_storage_path_that_is_a_directory_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    assert_err!(SessionStore::open(dir.path()));
}
