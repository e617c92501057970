//! Record Form State: the create/edit state machine.
//!
//! # Design
//! The form is a sum type so that "editing without an id" or "browsing with
//! a half-filled draft" cannot be represented. All transitions are
//! synchronous and local; the dashboard performs the network calls and
//! reports back through `complete_submit`.
//!
//! ```text
//!   Browsing --start_create--> Creating(default draft)
//!   any      --start_edit(r)--> Editing { r.id, draft seeded from r }
//!   Creating --complete_submit--> Browsing
//!   Editing  --complete_submit | cancel--> Browsing
//! ```

use thiserror::Error;

use crate::error::ApiError;
use crate::types::{HexColor, Record, RecordId, RecordKind, RecordPayload, Style};

/// Unsaved contents of the form.
///
/// `color` is kept as typed so the user can fix a half-entered value; it is
/// normalised when the payload is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub kind: RecordKind,
    pub content: String,
    pub color: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            kind: RecordKind::Url,
            content: String::new(),
            color: HexColor::DEFAULT.to_string(),
        }
    }
}

impl Draft {
    pub fn from_record(record: &Record) -> Self {
        Self {
            kind: record.kind,
            content: record.content.clone(),
            color: record.style.color.to_string(),
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.content.trim().is_empty() {
            return Err(FormError::EmptyContent);
        }
        Ok(())
    }

    fn to_payload(&self) -> RecordPayload {
        RecordPayload {
            kind: self.kind,
            content: self.content.clone(),
            style: Style::with_color(HexColor::parse_or_default(&self.color)),
        }
    }
}

/// Coarse phase of the form, without the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Creating,
    Editing(RecordId),
}

/// What to do at a stale edit: the record under edit vanished from a
/// freshly fetched collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleEditPolicy {
    /// Drop the draft and go back to browsing.
    #[default]
    ReturnToBrowsing,
    /// Leave the form alone; the next submit reports `NotFound`.
    KeepEditing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("content is required")]
    EmptyContent,

    #[error("the type of an existing QR code cannot be changed")]
    KindLocked,

    #[error("no form is open")]
    NoActiveForm,

    #[error("finish or cancel the current edit first")]
    EditInProgress,
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// A validated request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(RecordPayload),
    Update { id: RecordId, payload: RecordPayload },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Browsing,
    Creating(Draft),
    Editing { id: RecordId, draft: Draft },
}

impl FormState {
    pub fn mode(&self) -> Mode {
        match self {
            FormState::Browsing => Mode::Browsing,
            FormState::Creating(_) => Mode::Creating,
            FormState::Editing { id, .. } => Mode::Editing(id.clone()),
        }
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        match self {
            FormState::Editing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            FormState::Browsing => None,
            FormState::Creating(draft) | FormState::Editing { draft, .. } => Some(draft),
        }
    }

    /// The draft to display: the live one, or a blank create form.
    pub fn draft_view(&self) -> Draft {
        self.draft().cloned().unwrap_or_default()
    }

    /// Open a blank create form. Re-entering while creating resets it.
    pub fn start_create(&mut self) -> Result<(), FormError> {
        if matches!(self, FormState::Editing { .. }) {
            return Err(FormError::EditInProgress);
        }
        *self = FormState::Creating(Draft::default());
        Ok(())
    }

    /// Open the edit form seeded from `record`, replacing any current draft.
    pub fn start_edit(&mut self, record: &Record) {
        *self = FormState::Editing {
            id: record.id.clone(),
            draft: Draft::from_record(record),
        };
    }

    /// Discard the draft without a network call.
    pub fn cancel(&mut self) {
        *self = FormState::Browsing;
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), FormError> {
        self.draft_mut()?.content = content.into();
        Ok(())
    }

    pub fn set_color(&mut self, color: impl Into<String>) -> Result<(), FormError> {
        self.draft_mut()?.color = color.into();
        Ok(())
    }

    /// Change the kind. Only a create form accepts this.
    pub fn set_kind(&mut self, kind: RecordKind) -> Result<(), FormError> {
        match self {
            FormState::Creating(draft) => {
                draft.kind = kind;
                Ok(())
            }
            FormState::Editing { .. } => Err(FormError::KindLocked),
            FormState::Browsing => Err(FormError::NoActiveForm),
        }
    }

    /// Validate the draft and build the request for the current mode.
    pub fn prepare_submit(&self) -> Result<Submission, FormError> {
        match self {
            FormState::Browsing => Err(FormError::NoActiveForm),
            FormState::Creating(draft) => {
                draft.validate()?;
                Ok(Submission::Create(draft.to_payload()))
            }
            FormState::Editing { id, draft } => {
                draft.validate()?;
                Ok(Submission::Update {
                    id: id.clone(),
                    payload: draft.to_payload(),
                })
            }
        }
    }

    /// The server accepted the submission; close the form.
    pub fn complete_submit(&mut self) {
        *self = FormState::Browsing;
    }

    /// React to `id` no longer existing on the server. Returns true when
    /// the form was closed.
    pub fn record_vanished(&mut self, id: &RecordId, policy: StaleEditPolicy) -> bool {
        if self.editing_id() != Some(id) || policy == StaleEditPolicy::KeepEditing {
            return false;
        }
        *self = FormState::Browsing;
        true
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, FormError> {
        match self {
            FormState::Browsing => Err(FormError::NoActiveForm),
            FormState::Creating(draft) | FormState::Editing { draft, .. } => Ok(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, kind: RecordKind, content: &str, color: &str) -> Record {
        Record {
            id: RecordId::new(id),
            kind,
            content: content.to_string(),
            style: Style::with_color(HexColor::parse_or_default(color)),
        }
    }

    #[test]
    fn start_create_uses_defaults() {
        let mut form = FormState::default();
        form.start_create().unwrap();
        assert_eq!(form.mode(), Mode::Creating);
        assert_eq!(
            form.draft().unwrap(),
            &Draft {
                kind: RecordKind::Url,
                content: String::new(),
                color: "#000000".to_string(),
            }
        );
    }

    #[test]
    fn start_edit_seeds_draft_from_record() {
        let mut form = FormState::default();
        form.start_edit(&record("r1", RecordKind::Text, "hi", "#abcdef"));
        assert_eq!(form.mode(), Mode::Editing(RecordId::new("r1")));
        assert_eq!(
            form.draft().unwrap(),
            &Draft {
                kind: RecordKind::Text,
                content: "hi".to_string(),
                color: "#abcdef".to_string(),
            }
        );
    }

    #[test]
    fn kind_is_locked_while_editing() {
        let mut form = FormState::default();
        form.start_edit(&record("r1", RecordKind::Text, "hi", "#abcdef"));
        assert_eq!(form.set_kind(RecordKind::Url), Err(FormError::KindLocked));
        assert_eq!(form.draft().unwrap().kind, RecordKind::Text);
        form.set_content("hello").unwrap();
        assert_eq!(form.draft().unwrap().kind, RecordKind::Text);
    }

    #[test]
    fn create_cannot_interrupt_an_edit() {
        let mut form = FormState::default();
        form.start_edit(&record("r1", RecordKind::Url, "x", "#000000"));
        assert_eq!(form.start_create(), Err(FormError::EditInProgress));
        form.cancel();
        assert_eq!(form.mode(), Mode::Browsing);
        assert!(form.start_create().is_ok());
    }

    #[test]
    fn empty_content_fails_validation() {
        let mut form = FormState::default();
        form.start_edit(&record("r1", RecordKind::Text, "hi", "#abcdef"));
        form.set_content("   ").unwrap();
        assert_eq!(form.prepare_submit(), Err(FormError::EmptyContent));
        assert_eq!(form.mode(), Mode::Editing(RecordId::new("r1")));
    }

    #[test]
    fn malformed_color_falls_back_at_submit() {
        let mut form = FormState::default();
        form.start_create().unwrap();
        form.set_content("hello").unwrap();
        form.set_color("#12").unwrap();
        match form.prepare_submit().unwrap() {
            Submission::Create(payload) => assert_eq!(payload.style.color.as_str(), "#000000"),
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn update_submission_keeps_kind() {
        let mut form = FormState::default();
        form.start_edit(&record("r1", RecordKind::Text, "hi", "#abcdef"));
        form.set_content("bye").unwrap();
        let Submission::Update { id, payload } = form.prepare_submit().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(id.as_str(), "r1");
        assert_eq!(payload.kind, RecordKind::Text);
        assert_eq!(payload.content, "bye");
    }

    #[test]
    fn browsing_has_nothing_to_edit() {
        let mut form = FormState::default();
        assert_eq!(form.set_content("x"), Err(FormError::NoActiveForm));
        assert_eq!(form.prepare_submit(), Err(FormError::NoActiveForm));
        assert_eq!(form.draft_view(), Draft::default());
    }

    #[test]
    fn vanished_record_respects_policy() {
        let r1 = RecordId::new("r1");
        let mut form = FormState::default();
        form.start_edit(&record("r1", RecordKind::Url, "x", "#000000"));

        assert!(!form.record_vanished(&RecordId::new("other"), StaleEditPolicy::ReturnToBrowsing));
        assert!(!form.record_vanished(&r1, StaleEditPolicy::KeepEditing));
        assert_eq!(form.mode(), Mode::Editing(r1.clone()));

        assert!(form.record_vanished(&r1, StaleEditPolicy::ReturnToBrowsing));
        assert_eq!(form.mode(), Mode::Browsing);
    }

    #[test]
    fn form_errors_surface_as_validation() {
        let err: ApiError = FormError::EmptyContent.into();
        assert_eq!(err, ApiError::validation("content is required"));
    }
}
