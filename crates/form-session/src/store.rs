use form_spec::ValueMap;
use thiserror::Error;

/// Failure reported by a persistence collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persistence collaborator receiving draft and final value maps.
///
/// The engine calls `save` identically for autosave drafts and accepted
/// submissions; retry policy belongs to the implementor. An asynchronous
/// collaborator should enqueue the map and return `Ok`; acceptance is a
/// local decision.
pub trait ValueStore {
    fn save(&mut self, values: &ValueMap) -> Result<(), StoreError>;
}

/// In-memory store retaining the last saved value map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    last: Option<ValueMap>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ValueMap> {
        self.last.as_ref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ValueStore for MemoryStore {
    fn save(&mut self, values: &ValueMap) -> Result<(), StoreError> {
        self.last = Some(values.clone());
        self.saves += 1;
        Ok(())
    }
}
