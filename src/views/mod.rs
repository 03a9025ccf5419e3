//! Views
//!
//! Headless view models: state plus the operations a user can trigger.
//! Rendering to text lives in [`render`].

pub mod dashboard;
pub mod login;
pub mod notify;
pub mod render;
pub mod tabs;

pub use dashboard::{DashboardState, DashboardView, FetchStatus, LocalAction, Loadable, UploadOutcome};
pub use login::LoginView;
pub use notify::{Notification, Notifier, Severity};
pub use tabs::{tabs_for, RenderMode, Resource, RowAction, TabSpec};
