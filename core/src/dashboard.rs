//! Record List Controller.
//!
//! # Design
//! `Dashboard` owns everything the view shows: the last fetched collection,
//! the form, a single notice slot and the transient artifact of the last
//! create. The collection only ever changes by a full `refresh`; there is
//! no optimistic or incremental update. Every error lands in the notice
//! slot (last one wins) and is also returned to the caller.
//!
//! Once `TeardownHandle::teardown` fires, new operations fail with
//! `Unauthenticated` before any request is sent, and responses still in
//! flight are dropped without touching state.
//!
//! A mutation that the server accepted is reported as a success even when
//! the follow-up refresh fails; that failure lands in the notice slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::RecordApi;
use crate::error::{ApiError, ErrorKind};
use crate::form::{FormState, Mode, StaleEditPolicy, Submission};
use crate::http::Transport;
use crate::types::{Record, RecordId, RecordKind};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this QR code?";

const FETCH_FAILED: &str = "Failed to fetch QR codes";
const CREATE_FAILED: &str = "Error generating QR code";
const UPDATE_FAILED: &str = "Failed to update QR code";
const DELETE_FAILED: &str = "Failed to delete QR code";
const EDIT_VANISHED: &str = "The QR code being edited no longer exists";
const TORN_DOWN: &str = "This dashboard has been closed";

/// Result of `Dashboard::request_delete` that reached no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The server removed the record.
    Deleted,
    /// The confirmation gate said no; nothing was sent.
    Declined,
    /// The dashboard was torn down while the request was in flight; the
    /// response was dropped.
    Discarded,
}

/// Blocking yes/no oracle consulted before a delete.
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// The single user-visible error slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl Notice {
    fn from_error(err: &ApiError, fallback: &str) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().unwrap_or(fallback).to_string(),
        }
    }
}

/// Marks a dashboard as torn down, from wherever the host decides.
#[derive(Debug, Clone, Default)]
pub struct TeardownHandle(Arc<AtomicBool>);

impl TeardownHandle {
    pub fn teardown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct Dashboard<T> {
    api: RecordApi<T>,
    records: Vec<Record>,
    form: FormState,
    notice: Option<Notice>,
    artifact: Option<String>,
    loading: bool,
    session_ended: bool,
    policy: StaleEditPolicy,
    lifecycle: TeardownHandle,
}

impl<T: Transport> Dashboard<T> {
    pub fn new(api: RecordApi<T>, policy: StaleEditPolicy) -> Self {
        Self {
            api,
            records: Vec::new(),
            form: FormState::default(),
            notice: None,
            artifact: None,
            loading: false,
            session_ended: false,
            policy,
            lifecycle: TeardownHandle::default(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn mode(&self) -> Mode {
        self.form.mode()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Artifact returned by the last successful create, if still relevant.
    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True once the credential was found missing or rejected. The host
    /// should send the user to the external login flow.
    pub fn session_ended(&self) -> bool {
        self.session_ended
    }

    pub fn api(&self) -> &RecordApi<T> {
        &self.api
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.lifecycle.clone()
    }

    /// First load. Without a credential the session is over before it
    /// started.
    pub async fn mount(&mut self) -> Result<(), ApiError> {
        if !self.api.session().is_authenticated() {
            let err = ApiError::Unauthenticated(None);
            self.fail(&err, "Please log in");
            return Err(err);
        }
        self.refresh().await
    }

    /// Replace the collection with the server's. On failure the previous
    /// collection is kept.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.ensure_attached("refresh")?;
        self.loading = true;
        let result = self.api.list_records().await;
        self.loading = false;
        if self.discarded("refresh") {
            return Ok(());
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.reconcile_edit();
                Ok(())
            }
            Err(err) => {
                self.fail(&err, FETCH_FAILED);
                Err(err)
            }
        }
    }

    /// Open a blank create form.
    pub fn start_create(&mut self) -> Result<(), ApiError> {
        self.form.start_create().map_err(|e| self.reject(e.into()))
    }

    /// Open the edit form for a record in the current collection.
    pub fn request_edit(&mut self, id: &RecordId) -> Result<(), ApiError> {
        let Some(record) = self.records.iter().find(|r| &r.id == id) else {
            let err = ApiError::NotFound(Some(format!("no QR code with id {id}")));
            return Err(self.reject(err));
        };
        self.form.start_edit(record);
        self.artifact = None;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.form.cancel();
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), ApiError> {
        self.form.set_content(content).map_err(|e| self.reject(e.into()))
    }

    pub fn set_color(&mut self, color: impl Into<String>) -> Result<(), ApiError> {
        self.form.set_color(color).map_err(|e| self.reject(e.into()))
    }

    pub fn set_kind(&mut self, kind: RecordKind) -> Result<(), ApiError> {
        self.form.set_kind(kind).map_err(|e| self.reject(e.into()))
    }

    /// Validate and send the open form, then refresh on success.
    pub async fn submit(&mut self) -> Result<(), ApiError> {
        self.ensure_attached("submit")?;
        self.notice = None;
        let submission = self.form.prepare_submit().map_err(|e| self.reject(e.into()))?;

        match submission {
            Submission::Create(payload) => {
                self.artifact = None;
                let result = self.api.create_record(&payload).await;
                if self.discarded("create") {
                    return Ok(());
                }
                match result {
                    Ok(created) => {
                        info!(id = %created.record.id, "QR code created");
                        self.artifact = Some(created.artifact_uri);
                        self.form.complete_submit();
                        self.resync_after("create").await;
                        Ok(())
                    }
                    Err(err) => {
                        self.fail(&err, CREATE_FAILED);
                        Err(err)
                    }
                }
            }
            Submission::Update { id, payload } => {
                let result = self.api.update_record(&id, &payload).await;
                if self.discarded("update") {
                    return Ok(());
                }
                match result {
                    Ok(()) => {
                        info!(%id, "QR code updated");
                        self.form.complete_submit();
                        self.resync_after("update").await;
                        Ok(())
                    }
                    Err(err) => {
                        self.fail(&err, UPDATE_FAILED);
                        if err.is_not_found() {
                            self.recover_from_vanished(&id).await;
                        }
                        Err(err)
                    }
                }
            }
        }
    }

    /// Ask the gate, then delete and refresh. Nothing is sent when the
    /// user declines.
    pub async fn request_delete<G>(&mut self, id: &RecordId, gate: &G) -> Result<DeleteOutcome, ApiError>
    where
        G: ConfirmGate + ?Sized,
    {
        self.ensure_attached("delete")?;
        if !gate.confirm(DELETE_PROMPT) {
            debug!(%id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }
        self.notice = None;

        let result = self.api.delete_record(id).await;
        if self.discarded("delete") {
            return Ok(DeleteOutcome::Discarded);
        }
        match result {
            Ok(()) => {
                info!(%id, "QR code deleted");
                if self.form.editing_id() == Some(id) {
                    self.form.cancel();
                }
                self.resync_after("delete").await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                self.fail(&err, DELETE_FAILED);
                if err.is_not_found() {
                    self.recover_from_vanished(id).await;
                }
                Err(err)
            }
        }
    }

    /// Clear the credential and stop applying responses.
    pub fn logout(&mut self) {
        self.end_session();
        self.lifecycle.teardown();
    }

    /// Refresh after a mutation the server accepted. A failure is already
    /// in the notice slot; it does not turn the mutation into an error.
    async fn resync_after(&mut self, op: &str) {
        if let Err(err) = self.refresh().await {
            warn!(op, error = %err, "refresh after mutation failed");
        }
    }

    /// The server says `id` is gone: leave the edit form if it is open on
    /// that record, then resync.
    async fn recover_from_vanished(&mut self, id: &RecordId) {
        if self.form.editing_id() == Some(id) {
            self.form.cancel();
        }
        if let Err(err) = self.refresh().await {
            debug!(error = %err, "refresh after not-found failed");
        }
    }

    fn reconcile_edit(&mut self) {
        let Some(id) = self.form.editing_id().cloned() else {
            return;
        };
        if self.records.iter().any(|r| r.id == id) {
            return;
        }
        if self.form.record_vanished(&id, self.policy) {
            warn!(%id, "record under edit disappeared; closing form");
            self.notice = Some(Notice {
                kind: ErrorKind::NotFound,
                message: EDIT_VANISHED.to_string(),
            });
        } else {
            debug!(%id, "record under edit disappeared; keeping form open");
        }
    }

    fn reject(&mut self, err: ApiError) -> ApiError {
        let message = err.to_string();
        self.fail(&err, &message);
        err
    }

    fn fail(&mut self, err: &ApiError, fallback: &str) {
        warn!(error = %err, "{fallback}");
        self.notice = Some(Notice::from_error(err, fallback));
        if err.is_unauthenticated() {
            self.end_session();
        }
    }

    fn end_session(&mut self) {
        self.api.session().end();
        self.records.clear();
        self.form = FormState::Browsing;
        self.artifact = None;
        self.loading = false;
        self.session_ended = true;
    }

    fn ensure_attached(&self, op: &str) -> Result<(), ApiError> {
        if self.lifecycle.is_torn_down() {
            warn!(op, "dashboard torn down; refusing to start");
            return Err(ApiError::Unauthenticated(Some(TORN_DOWN.to_string())));
        }
        Ok(())
    }

    fn discarded(&self, op: &str) -> bool {
        let torn_down = self.lifecycle.is_torn_down();
        if torn_down {
            debug!(op, "dashboard torn down; discarding response");
        }
        torn_down
    }
}
