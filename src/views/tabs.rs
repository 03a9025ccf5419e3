//! Role-to-tab configuration
//!
//! One declarative table drives the dashboard for every role: each tab names
//! what it fetches, how it renders, which upload it offers and what the row
//! action does.

use crate::models::{Role, UploadKind};

/// Fetchable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Courses,
    Programs,
    PayingStudents,
    Hostel,
}

impl Resource {
    /// Notification shown when fetching fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Resource::Courses => "Failed to load the course list",
            Resource::Programs => "Failed to load the program list",
            Resource::PayingStudents => "Failed to load the list of paying students",
            Resource::Hostel => "Failed to load hostel information",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    CourseTable,
    ProgramTable,
    PayingStudentTable,
    UploadPrompt,
    HostelCard,
}

/// Per-row action on list tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    DeleteCourse,
    DeleteProgram,
    ConfirmPayment,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::DeleteCourse | RowAction::DeleteProgram => "Delete",
            RowAction::ConfirmPayment => "Confirm payment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSpec {
    pub label: &'static str,
    pub fetch: Option<Resource>,
    pub render: RenderMode,
    pub upload: Option<UploadKind>,
    pub row_action: Option<RowAction>,
}

const ADMIN_TABS: [TabSpec; 3] = [
    TabSpec {
        label: "Courses",
        fetch: Some(Resource::Courses),
        render: RenderMode::CourseTable,
        upload: Some(UploadKind::Course),
        row_action: Some(RowAction::DeleteCourse),
    },
    TabSpec {
        label: "Education programs",
        fetch: Some(Resource::Programs),
        render: RenderMode::ProgramTable,
        upload: Some(UploadKind::Program),
        row_action: Some(RowAction::DeleteProgram),
    },
    TabSpec {
        label: "Paying students",
        fetch: Some(Resource::PayingStudents),
        render: RenderMode::PayingStudentTable,
        upload: None,
        row_action: Some(RowAction::ConfirmPayment),
    },
];

const STUDENT_TABS: [TabSpec; 3] = [
    TabSpec {
        label: "Courses",
        fetch: Some(Resource::Courses),
        render: RenderMode::CourseTable,
        upload: None,
        row_action: None,
    },
    TabSpec {
        label: "Payment receipt",
        fetch: None,
        render: RenderMode::UploadPrompt,
        upload: Some(UploadKind::Payment),
        row_action: None,
    },
    TabSpec {
        label: "My hostel",
        fetch: Some(Resource::Hostel),
        render: RenderMode::HostelCard,
        upload: None,
        row_action: None,
    },
];

/// Ordered tab set for a role
pub fn tabs_for(role: Role) -> &'static [TabSpec] {
    match role {
        Role::Admin => &ADMIN_TABS,
        Role::Student => &STUDENT_TABS,
    }
}

/// Upload kinds a role may submit
pub fn uploads_for(role: Role) -> impl Iterator<Item = UploadKind> {
    tabs_for(role).iter().filter_map(|tab| tab.upload)
}

/// Label of the button that starts an upload
pub fn upload_button_label(kind: UploadKind) -> &'static str {
    match kind {
        UploadKind::Course => "Add course",
        UploadKind::Program => "Upload program",
        UploadKind::Payment => "Attach receipt",
    }
}
