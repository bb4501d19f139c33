//! Multi-section edit form: validate, diff, then submit.
//!
//! An [`EditSession`] owns one [`Draft`] and walks it through
//!
//! ```text
//! Idle -> Editing -> Validating -> Invalid -> Editing
//!                               -> Submitting -> Success -> Idle
//!                                             -> Failure -> Editing
//! ```
//!
//! Validation stops at the first failing rule and moves focus to it; no
//! request is made. Only fields that differ from the loaded record (plus
//! newly attached files) are sent, always as `multipart/form-data`. When
//! nothing differs the submit is skipped.

use quill_client::error::ApiError;
use quill_client::http::RequestBody;
use quill_client::query::ResourceQuery;
use quill_core::backend_errors::BackendErrorReport;
use quill_core::draft::Draft;
use quill_core::error::CoreError;
use quill_core::models::EditableRecord;
use quill_core::payload::{Attachment, FileField};
use quill_core::types::RecordId;
use quill_core::validation::{FormTab, ValidationFailure};
use serde_json::Value;

use crate::toast::ToastBus;

pub const MSG_NOTHING_TO_SAVE: &str = "No changes to save";
pub const MSG_NO_OPEN_RECORD: &str = "No record is open for editing";

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Editing,
    Validating,
    Invalid,
    Submitting,
    Success,
    Failure,
}

impl FormState {
    /// States reachable from `self`.
    pub fn valid_transitions(self) -> &'static [FormState] {
        use FormState::*;
        match self {
            Idle => &[Editing],
            Editing => &[Editing, Validating, Idle],
            // Editing again when there is nothing to save.
            Validating => &[Invalid, Submitting, Editing],
            Invalid => &[Editing],
            Submitting => &[Success, Failure],
            Success => &[Idle],
            Failure => &[Editing],
        }
    }

    pub fn can_transition(self, to: FormState) -> bool {
        self.valid_transitions().contains(&to)
    }
}

/// Whether a submit creates a record or patches an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Update(RecordId),
}

/// Result of one submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome<R> {
    Saved(R),
    NothingToSave,
    Invalid(ValidationFailure),
    Failed(BackendErrorReport),
}

type SuccessCallback<R> = Box<dyn FnMut(&R) + Send>;

// ---------------------------------------------------------------------------
// EditSession
// ---------------------------------------------------------------------------

pub struct EditSession<R: EditableRecord> {
    query: ResourceQuery<R>,
    toasts: ToastBus,
    mode: EditMode,
    state: FormState,
    history: Vec<FormState>,
    draft: Option<Draft<R>>,
    active_tab: FormTab,
    focused_field: Option<String>,
    on_success: Option<SuccessCallback<R>>,
}

impl<R: EditableRecord> EditSession<R> {
    pub fn new(query: ResourceQuery<R>, toasts: ToastBus) -> Self {
        Self {
            query,
            toasts,
            mode: EditMode::Create,
            state: FormState::Idle,
            history: vec![FormState::Idle],
            draft: None,
            active_tab: FormTab::default(),
            focused_field: None,
            on_success: None,
        }
    }

    /// Called with the saved record after every successful submit.
    pub fn on_success(mut self, callback: impl FnMut(&R) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    // -- accessors -----------------------------------------------------------

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Every state entered since the session was created, in order.
    pub fn history(&self) -> &[FormState] {
        &self.history
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn draft(&self) -> Option<&Draft<R>> {
        self.draft.as_ref()
    }

    pub fn active_tab(&self) -> FormTab {
        self.active_tab
    }

    pub fn focused_field(&self) -> Option<&str> {
        self.focused_field.as_deref()
    }

    // -- opening -------------------------------------------------------------

    /// Load a record by slug and open it for editing.
    pub async fn load(&mut self, slug: &str) -> Result<(), ApiError> {
        let record = self.query.by_slug(slug).await?;
        self.open(R::clone(&record));
        Ok(())
    }

    /// Open an already loaded record.
    pub fn open(&mut self, record: R) {
        tracing::debug!(entity = R::ENTITY, id = %record.id(), "Opening record for editing");
        self.mode = EditMode::Update(record.id().clone());
        self.start(Draft::new(record));
    }

    /// Start a create form from a blank record.
    pub fn new_record(&mut self) {
        self.mode = EditMode::Create;
        self.start(Draft::blank());
    }

    /// Drop the draft without saving.
    pub fn discard(&mut self) {
        self.draft = None;
        self.transition(FormState::Idle);
    }

    // -- editing -------------------------------------------------------------

    /// Apply a typed edit. `field` names the input so its error is cleared.
    pub fn edit(&mut self, field: &str, f: impl FnOnce(&mut R)) -> Result<(), CoreError> {
        self.draft_mut()?.edit(field, f);
        Ok(())
    }

    /// Set a field by dotted path, e.g. `sections_data.hero_section.title`.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), CoreError> {
        self.draft_mut()?.set_field(path, value)
    }

    pub fn attach(&mut self, attachment: Attachment) -> Result<(), CoreError> {
        self.draft_mut()?.attach(attachment);
        Ok(())
    }

    pub fn detach(&mut self, field: &FileField) -> Result<(), CoreError> {
        self.draft_mut()?.detach(field);
        Ok(())
    }

    pub fn select_tab(&mut self, tab: FormTab) {
        self.active_tab = tab;
    }

    // -- submit --------------------------------------------------------------

    /// Validate, diff and, when something changed, save.
    pub async fn submit(&mut self) -> SubmitOutcome<R> {
        let (validation, payload) = match self.draft.as_ref() {
            Some(draft) => (draft.validate(), draft.build_payload()),
            None => {
                self.toasts.error(MSG_NO_OPEN_RECORD);
                return SubmitOutcome::Failed(BackendErrorReport::message(MSG_NO_OPEN_RECORD));
            }
        };

        self.transition(FormState::Validating);
        if let Err(failure) = validation {
            self.reject(&failure);
            return SubmitOutcome::Invalid(failure);
        }

        let Some(payload) = payload else {
            self.toasts.info(MSG_NOTHING_TO_SAVE);
            self.transition(FormState::Editing);
            return SubmitOutcome::NothingToSave;
        };

        self.transition(FormState::Submitting);
        tracing::debug!(
            entity = R::ENTITY,
            fields = ?payload.field_names(),
            files = payload.files().len(),
            "Submitting changes"
        );
        let body = RequestBody::Multipart(payload);
        let result = match &self.mode {
            EditMode::Create => self.query.create(body).await,
            EditMode::Update(id) => self.query.update(id, body).await,
        };

        match result {
            Ok(saved) => {
                self.transition(FormState::Success);
                self.toasts.success(self.success_message());
                self.draft = None;
                self.focused_field = None;
                if let Some(callback) = self.on_success.as_mut() {
                    callback(&saved);
                }
                self.transition(FormState::Idle);
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                tracing::warn!(entity = R::ENTITY, error = %e, "Save failed");
                self.transition(FormState::Failure);
                let report = e.report();
                self.fail(&report);
                self.transition(FormState::Editing);
                SubmitOutcome::Failed(report)
            }
        }
    }

    // ---- private helpers ----

    fn start(&mut self, draft: Draft<R>) {
        self.draft = Some(draft);
        self.active_tab = FormTab::default();
        self.focused_field = None;
        self.transition(FormState::Editing);
    }

    fn draft_mut(&mut self) -> Result<&mut Draft<R>, CoreError> {
        self.draft
            .as_mut()
            .ok_or_else(|| CoreError::Conflict(MSG_NO_OPEN_RECORD.into()))
    }

    fn transition(&mut self, to: FormState) {
        if !self.state.can_transition(to) {
            tracing::warn!(from = ?self.state, to = ?to, "Unexpected form transition");
        }
        self.state = to;
        self.history.push(to);
    }

    /// Client-side rule failure: focus the field, no request.
    fn reject(&mut self, failure: &ValidationFailure) {
        self.transition(FormState::Invalid);
        self.active_tab = failure.tab;
        self.focused_field = Some(failure.field.clone());
        if let Some(draft) = self.draft.as_mut() {
            draft.record_failure(failure);
        }
        self.toasts.error(failure.message.clone());
        self.transition(FormState::Editing);
    }

    /// Backend failure: keep the draft and focus the named field, if any.
    fn fail(&mut self, report: &BackendErrorReport) {
        if let Some(tab) = report.tab {
            self.active_tab = tab;
        }
        if let Some(field) = &report.field {
            self.focused_field = Some(field.clone());
            if let Some(draft) = self.draft.as_mut() {
                draft.set_error(field.clone(), report.message.clone());
            }
        }
        self.toasts.error(report.message.clone());
    }

    fn success_message(&self) -> String {
        let verb = match self.mode {
            EditMode::Create => "created",
            EditMode::Update(_) => "updated",
        };
        format!("{} {verb} successfully", capitalize(R::ENTITY))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
