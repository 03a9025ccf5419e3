//! Decanat
//!
//! Client for a university dean's-office dashboard: administrators manage
//! courses, education programs and payment confirmations; students upload
//! payment receipts and look up their hostel assignment.
//!
//! # Features
//!
//! - **Session**: one persisted bearer token, observable by every view
//! - **HTTP client**: token attached verbatim; any status >= 400 drops the
//!   session and forces the login route
//! - **Backends**: in-process mock or HTTP, behind async traits
//! - **Dashboard**: one role-to-tab table drives fetching, rendering and uploads
//! - **Stub server**: axum backend with Argon2id + JWT for end-to-end runs
//!
//! # Architecture
//!
//! ```text
//! Terminal ──► App ──► SessionGate ──► LoginView / DashboardView
//!                │                              │
//!                └── Navigator ◄── Interceptor ◄┤
//!                                               ├── AuthService ──► AuthApi
//!                                               └── DomainApi (Mock | Http)
//! ```

pub mod app;
pub mod auth;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod terminal;
pub mod views;

pub use app::{App, AppContext, Screen};
pub use auth::AuthService;
pub use catalog::Catalog;
pub use config::{BackendKind, Config};
pub use error::{AuthError, DecanatError, Result, ServiceError, StorageError, ValidationError};
pub use gate::{GateState, SessionGate};
pub use http::{invalidates_session, ApiClient, ResponseInterceptor};
pub use models::{
    Course, Credentials, HostelAssignment, Identity, PayingStudent, Program, RecordId, Role,
    UploadFile, UploadKind, UploadResult,
};
pub use navigation::{Navigation, Navigator, Route};
pub use services::{AuthApi, DomainApi, HttpBackend, MockBackend, MockConfig, Operation, UploadForm};
pub use session::{FileStorage, MemoryStorage, SessionStore, TokenStorage};
pub use views::{DashboardView, LoginView};
