//! Plain-text rendering of dashboard state.

use std::fmt::Write;

use crate::dashboard::Dashboard;
use crate::form::{FormState, Mode};
use crate::types::Record;

/// Render the notice, collection, form and artifact. Pure: reads state,
/// never changes it.
pub fn render<T>(dashboard: &Dashboard<T>) -> String
where
    T: crate::http::Transport,
{
    let mut out = String::new();

    if let Some(notice) = dashboard.notice() {
        let _ = writeln!(out, "error: {}", notice.message);
        out.push('\n');
    }

    if dashboard.is_loading() {
        out.push_str("Loading QR codes...\n");
    } else {
        out.push_str(&render_records(dashboard.records()));
    }

    if dashboard.mode() != Mode::Browsing {
        out.push('\n');
        out.push_str(&render_form(dashboard.form()));
    }

    if let Some(uri) = dashboard.artifact() {
        let _ = writeln!(out, "\nGenerated QR Code:\n{uri}");
    }
    out
}

/// The collection as `KIND: content` lines.
pub fn render_records(records: &[Record]) -> String {
    let mut out = String::from("Your QR Codes\n");
    if records.is_empty() {
        out.push_str("No QR codes found.\n");
        return out;
    }
    for record in records {
        let _ = writeln!(
            out,
            "  [{}] {}: {} ({})",
            record.id,
            record.kind.as_str().to_uppercase(),
            record.content,
            record.style.color
        );
    }
    out
}

pub fn render_form(form: &FormState) -> String {
    let heading = match form {
        FormState::Editing { .. } => "Edit QR Code",
        _ => "Generate New QR Code",
    };
    let draft = form.draft_view();
    let locked = if form.editing_id().is_some() { " (locked)" } else { "" };
    format!(
        "{heading}\n  Type: {}{locked}\n  Content: {}\n  Color: {}\n",
        draft.kind, draft.content, draft.color
    )
}
