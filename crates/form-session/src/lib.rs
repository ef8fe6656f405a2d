#![allow(missing_docs)]

pub mod autosave;
pub mod session;
pub mod store;
pub mod view;

pub use autosave::AutosaveTimer;
pub use session::{FormSession, SessionError, SessionStatus, SubmitOutcome};
pub use store::{MemoryStore, StoreError, ValueStore};
pub use view::{FieldView, FormView, Progress, SectionView, build_view};
