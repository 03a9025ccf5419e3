//! Plain-text rendering of the views

use super::dashboard::DashboardState;
use super::login::LoginView;
use super::notify::Severity;
use super::tabs::{self, RenderMode, TabSpec};
use crate::models::Role;
use std::fmt::Write;
use std::time::Instant;

const LOADING: &str = "Loading...";

pub fn render_loading() -> String {
    format!("{}\n", LOADING)
}

pub fn render_login(view: &LoginView) -> String {
    let mut out = String::new();
    out.push_str("== Sign in ==\n");
    if let Some(error) = view.error() {
        let _ = writeln!(out, "! {}", error);
    }
    if view.is_submitting() {
        let _ = writeln!(out, "{}", LOADING);
    }
    out.push_str("Use: login <email> <password>\n");
    out
}

pub fn render_dashboard(state: &DashboardState, now: Instant) -> String {
    let identity = match &state.identity {
        Some(identity) => identity,
        None => return render_loading(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "[{}] Welcome, {}!", identity.initial(), identity.username);
    let _ = writeln!(out, "Role: {}", identity.role);
    out.push('\n');

    let tab_bar: Vec<String> = state
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if i == state.active_tab {
                format!("[{}: {}]", i, tab.label)
            } else {
                format!(" {}: {} ", i, tab.label)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tab_bar.join(" "));

    if let Some(tab) = state.active() {
        let _ = writeln!(out, "Actions: {}", actions_line(state, tab));
        out.push('\n');
        render_tab(&mut out, state, tab, identity.role);
    }

    if let Some(notification) = state.notifier.visible_at(now) {
        let tag = match notification.severity {
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        let _ = writeln!(out, "\n({}) {}", tag, notification.message);
    }

    out
}

fn actions_line(state: &DashboardState, tab: &TabSpec) -> String {
    let mut actions = Vec::new();
    if let Some(kind) = tab.upload {
        let label = tabs::upload_button_label(kind);
        if state.is_uploading(kind) {
            actions.push(format!("{} (uploading...)", label));
        } else {
            actions.push(format!("{} (upload {} <path>)", label, kind));
        }
    }
    if tab.fetch.is_some() {
        if state.can_refresh() {
            actions.push("Refresh (refresh)".to_string());
        } else {
            actions.push("Refresh (busy)".to_string());
        }
    }
    actions.push("Log out (logout)".to_string());
    actions.join(" | ")
}

fn render_tab(out: &mut String, state: &DashboardState, tab: &TabSpec, role: Role) {
    let action = tab.row_action.map(|a| a.label().to_string());

    match tab.render {
        RenderMode::CourseTable => {
            let names = state.courses.data.iter().map(|c| c.name.clone()).collect();
            list_table(out, "Course name", names, action, state.courses.loading, "No course data");
        }
        RenderMode::ProgramTable => {
            let names = state.programs.data.iter().map(|p| p.name.clone()).collect();
            list_table(out, "Program name", names, action, state.programs.loading, "No program data");
        }
        RenderMode::PayingStudentTable => {
            let names = state.paying_students.data.iter().map(|s| s.name.clone()).collect();
            list_table(
                out,
                "Student name",
                names,
                action,
                state.paying_students.loading,
                "No paying student data",
            );
        }
        RenderMode::UploadPrompt => {
            out.push_str("Attach a scan of the payment receipt\n");
            out.push_str("Format: PNG\n");
        }
        RenderMode::HostelCard => {
            if state.hostel.loading {
                let _ = writeln!(out, "{}", LOADING);
            } else if let Some(hostel) = &state.hostel.data {
                out.push_str("Hostel information:\n");
                let _ = writeln!(out, "  Name:      {}", hostel.name);
                let _ = writeln!(out, "  Address:   {}", hostel.address);
                let _ = writeln!(out, "  Floor:     {}", hostel.floor);
                let _ = writeln!(out, "  Room:      {}", hostel.room);
                let _ = writeln!(out, "  Commander: {}", hostel.commander_name);
            } else {
                out.push_str("No hostel information\n");
            }
        }
    }

    if role.is_admin() && tab.row_action.is_some() {
        out.push_str("Row actions: delete <n> | confirm <n>\n");
    }
}

fn list_table(
    out: &mut String,
    header: &str,
    names: Vec<String>,
    action: Option<String>,
    loading: bool,
    empty: &str,
) {
    let mut headers = vec!["#".to_string(), header.to_string()];
    if action.is_some() {
        headers.push("Actions".to_string());
    }

    if loading {
        write_table(out, &headers, &[vec![LOADING.to_string()]]);
        return;
    }
    if names.is_empty() {
        write_table(out, &headers, &[vec![empty.to_string()]]);
        return;
    }

    let rows: Vec<Vec<String>> = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut row = vec![(i + 1).to_string(), name];
            if let Some(action) = &action {
                row.push(action.clone());
            }
            row
        })
        .collect();
    write_table(out, &headers, &rows);
}

/// Left-aligned columns; short rows span the remaining width
fn write_table(out: &mut String, headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        if row.len() == headers.len() {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", cell, width = width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "{}", line(headers));
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "{}", "-".repeat(total));
    for row in rows {
        let _ = writeln!(out, "{}", line(row.as_slice()));
    }
}
