//! Dashboard View
//!
//! Resolves the identity, exposes the role's tab set, dispatches the fetch
//! for the selected tab and runs the upload flow.
//!
//! # Concurrency
//!
//! The view is a cheap clonable handle over shared state, so fetches can run
//! concurrently. Each resource keeps a generation counter: a fetch takes a
//! ticket when it starts and its result is applied only if no newer fetch of
//! the same resource started in the meantime. The state lock is never held
//! across an await.

use super::notify::Notifier;
use super::tabs::{self, Resource, RowAction, TabSpec};
use crate::auth::AuthService;
use crate::error::{AuthError, ServiceError, ValidationError};
use crate::models::{
    Course, HostelAssignment, Identity, PayingStudent, Program, RecordId, Role, UploadFile,
    UploadKind,
};
use crate::navigation::{Navigator, Route};
use crate::services::{DomainApi, UploadForm};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const UPLOAD_SUCCEEDED: &str = "File uploaded successfully";
const UPLOAD_FAILED: &str = "File upload failed";

/// Result of one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Loaded,
    Failed,
    /// A newer fetch of the same resource superseded this one
    Stale,
    /// Nothing to fetch for the current tab
    Skipped,
}

/// Result of an upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// Wrong content type; the service was not called
    Rejected,
    Failed,
    /// An upload of the same kind is already running
    Busy,
    /// The current role cannot upload this kind
    NotAllowed,
}

/// Data with a loading flag and a generation counter
#[derive(Debug, Clone, Default)]
pub struct Loadable<T> {
    pub data: T,
    pub loading: bool,
    generation: u64,
}

impl<T> Loadable<T> {
    /// Start a fetch, returning its ticket
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Apply a result if `ticket` is still the latest
    fn settle(&mut self, ticket: u64, result: Result<T, ServiceError>) -> Result<FetchStatus, ServiceError> {
        if ticket != self.generation {
            return Ok(FetchStatus::Stale);
        }
        self.loading = false;
        self.data = result?;
        Ok(FetchStatus::Loaded)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// An administrative action recorded locally only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAction {
    pub action: RowAction,
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub identity: Option<Identity>,
    pub active_tab: usize,
    pub courses: Loadable<Vec<Course>>,
    pub programs: Loadable<Vec<Program>>,
    pub paying_students: Loadable<Vec<PayingStudent>>,
    pub hostel: Loadable<Option<HostelAssignment>>,
    pub notifier: Notifier,
    pub local_actions: Vec<LocalAction>,
    uploads_in_flight: HashSet<UploadKind>,
}

impl DashboardState {
    fn new(auto_hide: Duration) -> Self {
        Self {
            identity: None,
            active_tab: 0,
            courses: Loadable::default(),
            programs: Loadable::default(),
            paying_students: Loadable::default(),
            hostel: Loadable::default(),
            notifier: Notifier::new(auto_hide),
            local_actions: Vec::new(),
            uploads_in_flight: HashSet::new(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    /// Tabs for the resolved role; empty until the identity is known
    pub fn tabs(&self) -> &'static [TabSpec] {
        self.role().map(tabs::tabs_for).unwrap_or(&[])
    }

    pub fn active(&self) -> Option<&'static TabSpec> {
        self.tabs().get(self.active_tab)
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        match resource {
            Resource::Courses => self.courses.loading,
            Resource::Programs => self.programs.loading,
            Resource::PayingStudents => self.paying_students.loading,
            Resource::Hostel => self.hostel.loading,
        }
    }

    pub fn any_loading(&self) -> bool {
        self.courses.loading
            || self.programs.loading
            || self.paying_students.loading
            || self.hostel.loading
    }

    pub fn is_uploading(&self, kind: UploadKind) -> bool {
        self.uploads_in_flight.contains(&kind)
    }

    /// Refresh is offered on fetchable tabs while nothing is loading
    pub fn can_refresh(&self) -> bool {
        self.active().and_then(|t| t.fetch).is_some() && !self.any_loading()
    }

    fn conclude(&mut self, resource: Resource, settled: Result<FetchStatus, ServiceError>) -> FetchStatus {
        match settled {
            Ok(FetchStatus::Stale) => {
                debug!("Dropped stale {:?} response", resource);
                FetchStatus::Stale
            }
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to fetch {:?}: {}", resource, e);
                self.notifier.error(resource.failure_message());
                FetchStatus::Failed
            }
        }
    }

    fn row_target(&self, action: RowAction, row: usize) -> Option<(RecordId, String)> {
        match action {
            RowAction::DeleteCourse => self.courses.data.get(row).map(|c| (c.id, c.name.clone())),
            RowAction::DeleteProgram => self.programs.data.get(row).map(|p| (p.id, p.name.clone())),
            RowAction::ConfirmPayment => self
                .paying_students
                .data
                .get(row)
                .map(|s| (s.id, s.name.clone())),
        }
    }

    fn find_target(&self, action: RowAction, id: RecordId) -> Option<String> {
        match action {
            RowAction::DeleteCourse => self.courses.data.iter().find(|c| c.id == id).map(|c| c.name.clone()),
            RowAction::DeleteProgram => self.programs.data.iter().find(|p| p.id == id).map(|p| p.name.clone()),
            RowAction::ConfirmPayment => self
                .paying_students
                .data
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone()),
        }
    }

    fn record_local(&mut self, action: RowAction, id: RecordId, name: String) -> LocalAction {
        info!("{} requested for {} ({}); recorded locally only", action.label(), name, id);
        let entry = LocalAction { action, id, name };
        self.local_actions.push(entry.clone());
        entry
    }
}

/// Handle to the mounted dashboard
#[derive(Clone)]
pub struct DashboardView {
    state: Arc<Mutex<DashboardState>>,
    auth: AuthService,
    api: Arc<dyn DomainApi>,
    navigator: Navigator,
}

impl DashboardView {
    pub fn new(
        auth: AuthService,
        api: Arc<dyn DomainApi>,
        navigator: Navigator,
        notification_ttl: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(DashboardState::new(notification_ttl))),
            auth,
            api,
            navigator,
        }
    }

    /// Copy of the current state, for rendering
    pub fn snapshot(&self) -> DashboardState {
        self.state.lock().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Resolve the identity and load the first tab
    ///
    /// Students also get their hostel info fetched once, up front. An auth
    /// failure sends the user to the login route.
    pub async fn mount(&self) -> Result<Identity, AuthError> {
        let identity = match self.auth.current_user().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Failed to fetch current user: {}", e);
                if matches!(e, AuthError::SessionRejected) {
                    self.auth.logout();
                }
                self.navigator.navigate(Route::Login);
                return Err(e);
            }
        };

        {
            let mut state = self.state.lock();
            state.identity = Some(identity.clone());
            state.active_tab = 0;
        }
        info!("Dashboard mounted for {} ({})", identity.username, identity.role);

        if identity.role.is_admin() {
            self.dispatch().await;
        } else {
            tokio::join!(self.dispatch(), self.fetch(Resource::Hostel));
        }

        Ok(identity)
    }

    /// Switch tabs and fetch what the new tab shows
    pub async fn select_tab(&self, index: usize) -> FetchStatus {
        let selected = {
            let mut state = self.state.lock();
            if index < state.tabs().len() {
                state.active_tab = index;
                true
            } else {
                false
            }
        };

        if !selected {
            warn!("Ignoring selection of unknown tab {}", index);
            return FetchStatus::Skipped;
        }
        self.dispatch().await
    }

    /// Re-run the active tab's fetch, if the refresh control is enabled
    pub async fn refresh(&self) -> FetchStatus {
        if !self.state.lock().can_refresh() {
            return FetchStatus::Skipped;
        }
        self.dispatch().await
    }

    async fn dispatch(&self) -> FetchStatus {
        let resource = self.state.lock().active().and_then(|tab| tab.fetch);
        match resource {
            Some(resource) => self.fetch(resource).await,
            None => {
                debug!("Active tab has nothing to fetch");
                FetchStatus::Skipped
            }
        }
    }

    /// Fetch one resource into the view
    pub async fn fetch(&self, resource: Resource) -> FetchStatus {
        match resource {
            Resource::Courses => self.fetch_courses().await,
            Resource::Programs => self.fetch_programs().await,
            Resource::PayingStudents => self.fetch_paying_students().await,
            Resource::Hostel => self.fetch_hostel().await,
        }
    }

    async fn fetch_courses(&self) -> FetchStatus {
        let ticket = self.state.lock().courses.begin();
        let result = self.api.list_courses().await;
        let mut state = self.state.lock();
        let settled = state.courses.settle(ticket, result);
        state.conclude(Resource::Courses, settled)
    }

    async fn fetch_programs(&self) -> FetchStatus {
        let ticket = self.state.lock().programs.begin();
        let result = self.api.list_programs().await;
        let mut state = self.state.lock();
        let settled = state.programs.settle(ticket, result);
        state.conclude(Resource::Programs, settled)
    }

    async fn fetch_paying_students(&self) -> FetchStatus {
        let ticket = self.state.lock().paying_students.begin();
        let result = self.api.list_paying_students().await;
        let mut state = self.state.lock();
        let settled = state.paying_students.settle(ticket, result);
        state.conclude(Resource::PayingStudents, settled)
    }

    async fn fetch_hostel(&self) -> FetchStatus {
        let ticket = self.state.lock().hostel.begin();
        let result = self.api.hostel_info().await.map(Some);
        let mut state = self.state.lock();
        let settled = state.hostel.settle(ticket, result);
        state.conclude(Resource::Hostel, settled)
    }

    /// Validate and upload a file, then refresh the list it affects
    pub async fn upload(&self, kind: UploadKind, file: UploadFile) -> UploadOutcome {
        {
            let mut state = self.state.lock();

            let allowed = state
                .role()
                .map(|role| tabs::uploads_for(role).any(|k| k == kind))
                .unwrap_or(false);
            if !allowed {
                warn!("Upload of kind {} is not available for this user", kind);
                return UploadOutcome::NotAllowed;
            }

            let expected = kind.expected_content_type();
            if !file.content_type.eq_ignore_ascii_case(expected) {
                let err = ValidationError::ContentType {
                    expected,
                    actual: file.content_type.clone(),
                };
                warn!("Rejected {} upload {}: {}", kind, file.file_name, err);
                state
                    .notifier
                    .error(format!("Please upload a {} file", kind.format_label()));
                return UploadOutcome::Rejected;
            }

            if !state.uploads_in_flight.insert(kind) {
                debug!("Upload of kind {} already in flight", kind);
                return UploadOutcome::Busy;
            }
        }

        let file_name = file.file_name.clone();
        let result = self.api.upload_file(UploadForm::new(kind, file)).await;

        let uploaded = {
            let mut state = self.state.lock();
            state.uploads_in_flight.remove(&kind);
            match result {
                Ok(response) if response.is_success() => {
                    info!("Uploaded {} file {}", kind, file_name);
                    state.notifier.success(UPLOAD_SUCCEEDED);
                    true
                }
                Ok(response) => {
                    warn!("Upload of {} returned status {}", file_name, response.status);
                    state.notifier.error(UPLOAD_FAILED);
                    false
                }
                Err(e) => {
                    warn!("Failed to upload {}: {}", file_name, e);
                    state.notifier.error(UPLOAD_FAILED);
                    false
                }
            }
        };

        if !uploaded {
            return UploadOutcome::Failed;
        }

        match kind {
            UploadKind::Course => {
                self.fetch(Resource::Courses).await;
            }
            UploadKind::Program => {
                self.fetch(Resource::Programs).await;
            }
            UploadKind::Payment => {}
        }
        UploadOutcome::Uploaded
    }

    /// Run the active tab's row action on row `row` (0-based)
    pub fn perform_row_action(&self, row: usize) -> Option<LocalAction> {
        let mut state = self.state.lock();
        let action = state.active()?.row_action?;
        let (id, name) = state.row_target(action, row)?;
        Some(state.record_local(action, id, name))
    }

    /// Run a row action against a record id
    pub fn apply_row_action(&self, action: RowAction, id: RecordId) -> Option<LocalAction> {
        let mut state = self.state.lock();
        if state.role() != Some(Role::Admin) {
            warn!("{} is only available to administrators", action.label());
            return None;
        }
        let name = state.find_target(action, id)?;
        Some(state.record_local(action, id, name))
    }

    pub fn delete_course(&self, id: RecordId) -> Option<LocalAction> {
        self.apply_row_action(RowAction::DeleteCourse, id)
    }

    pub fn delete_program(&self, id: RecordId) -> Option<LocalAction> {
        self.apply_row_action(RowAction::DeleteProgram, id)
    }

    pub fn confirm_payment(&self, id: RecordId) -> Option<LocalAction> {
        self.apply_row_action(RowAction::ConfirmPayment, id)
    }

    pub fn dismiss_notification(&self) {
        self.state.lock().notifier.dismiss();
    }

    pub fn logout(&self) {
        self.auth.logout();
        self.navigator.navigate(Route::Login);
    }
}
