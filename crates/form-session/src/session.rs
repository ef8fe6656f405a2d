use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use form_spec::{FieldState, FormSchema, ValueMap, resolve_states, validate_all, validate_field};
use serde_json::Value;
use thiserror::Error;

use crate::autosave::AutosaveTimer;
use crate::store::{StoreError, ValueStore};
use crate::view::{FormView, build_view};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Editing,
    Submitting,
    Accepted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Editing => "editing",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Accepted => "accepted",
        }
    }
}

/// Result of a [`FormSession::submit`] call.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed and the value map was handed to the store.
    Accepted,
    /// Validation failed; the session is back in `Editing` with one error
    /// message per failing field. No automatic retry.
    Rejected,
    /// Validation passed but the store refused the value map; the session
    /// is back in `Editing` with its values intact.
    StoreFailed(StoreError),
    /// A submit is already in flight; this call did nothing.
    AlreadySubmitting,
}

/// Out-of-contract misuse of the session API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown field id '{0}'")]
    UnknownField(String),
    #[error("session already accepted; start a new one to edit again")]
    Closed,
}

/// Mutable state of one form-filling instance.
///
/// Owned by exactly one thread; `set_value`, `submit`, `reset`, and
/// `autosave_tick` are the only mutation points and run synchronously.
/// Cross-thread use requires external serialization around all of them.
pub struct FormSession {
    schema: FormSchema,
    values: ValueMap,
    touched: BTreeSet<String>,
    errors: BTreeMap<String, String>,
    status: SessionStatus,
    autosave: AutosaveTimer,
}

impl FormSession {
    pub fn new(schema: FormSchema) -> Self {
        Self::with_values(schema, ValueMap::new())
    }

    /// Seeds a session with initial values; field defaults fill the gaps.
    /// Nothing is touched and no errors are reported until the first edit.
    pub fn with_values(schema: FormSchema, initial: ValueMap) -> Self {
        let mut values = initial;
        for field in schema.fields() {
            if let Some(default) = &field.default_value
                && !values.contains_key(&field.id)
            {
                values.insert(field.id.clone(), default.clone());
            }
        }
        let interval = Duration::from_secs(schema.settings.auto_save_interval_secs.max(1));
        Self {
            autosave: AutosaveTimer::new(interval),
            schema,
            values,
            touched: BTreeSet::new(),
            errors: BTreeMap::new(),
            status: SessionStatus::Editing,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Records a user edit: stores the value, marks the field touched,
    /// re-validates that field against its freshly resolved state, and
    /// restarts the autosave countdown.
    ///
    /// Legal while editing and while a submit is pending acceptance; an
    /// unknown field id is a caller bug.
    pub fn set_value(
        &mut self,
        field_id: &str,
        value: Value,
        now: Instant,
    ) -> Result<(), SessionError> {
        if self.status == SessionStatus::Accepted {
            return Err(SessionError::Closed);
        }
        if !self.schema.has_field(field_id) {
            return Err(SessionError::UnknownField(field_id.to_string()));
        }
        self.values.insert(field_id.to_string(), value);
        self.touched.insert(field_id.to_string());
        self.revalidate(field_id);
        self.autosave.rearm(now);
        Ok(())
    }

    fn revalidate(&mut self, field_id: &str) {
        let states = resolve_states(&self.schema, &self.values);
        // the edit may have changed other fields' visibility; errors never
        // linger on hidden fields
        self.errors
            .retain(|id, _| states.get(id).is_none_or(|state| state.visible));

        let Some(field) = self.schema.field(field_id) else {
            return;
        };
        let state = states
            .get(field_id)
            .copied()
            .unwrap_or_else(|| FieldState::default_for(field));
        if !state.visible {
            return;
        }
        match validate_field(field, self.values.get(field_id), state.required) {
            Some(message) => {
                self.errors.insert(field_id.to_string(), message);
            }
            None => {
                self.errors.remove(field_id);
            }
        }
    }

    /// Validates every visible field and hands the map to the store when
    /// clean.
    ///
    /// Marks all schema fields touched first, so rejection reports blank
    /// required fields the user never visited. Calling again after
    /// acceptance is an idempotent `Accepted`; calling while a submit is
    /// in flight is a no-op.
    pub fn submit<S: ValueStore>(&mut self, store: &mut S) -> SubmitOutcome {
        match self.status {
            SessionStatus::Submitting => return SubmitOutcome::AlreadySubmitting,
            SessionStatus::Accepted => return SubmitOutcome::Accepted,
            SessionStatus::Editing => {}
        }
        self.status = SessionStatus::Submitting;
        for field in self.schema.fields() {
            self.touched.insert(field.id.clone());
        }
        // hidden fields get stale errors cleared, not re-checked
        self.errors = validate_all(&self.schema, &self.values);

        if !self.errors.is_empty() {
            self.status = SessionStatus::Editing;
            return SubmitOutcome::Rejected;
        }
        match store.save(&self.values) {
            Ok(()) => {
                self.autosave.cancel();
                self.status = SessionStatus::Accepted;
                SubmitOutcome::Accepted
            }
            Err(error) => {
                tracing::debug!(%error, "store rejected submitted values");
                self.status = SessionStatus::Editing;
                SubmitOutcome::StoreFailed(error)
            }
        }
    }

    /// Drops all edits and returns to a pristine editing state.
    pub fn reset(&mut self) {
        self.values.clear();
        self.touched.clear();
        self.errors.clear();
        self.autosave.cancel();
        self.status = SessionStatus::Editing;
    }

    /// Polls the autosave deadline and saves a draft when it elapsed.
    ///
    /// Drafts are gated on the schema's `auto_save` and `allow_draft`
    /// settings and only fire while editing. Validation never runs here, so
    /// the drafted map may be invalid. Returns `None` when nothing was due.
    pub fn autosave_tick<S: ValueStore>(
        &mut self,
        now: Instant,
        store: &mut S,
    ) -> Option<Result<(), StoreError>> {
        if self.status != SessionStatus::Editing {
            return None;
        }
        let settings = &self.schema.settings;
        if !settings.auto_save || !settings.allow_draft {
            return None;
        }
        if !self.autosave.take_due(now) {
            return None;
        }
        Some(store.save(&self.values))
    }

    /// Snapshot for the render collaborator.
    pub fn view(&self) -> FormView {
        build_view(self)
    }
}
