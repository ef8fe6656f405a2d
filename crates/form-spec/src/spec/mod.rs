pub mod field;
pub mod form;

pub use field::{ChoiceOption, FieldSchema, FieldType, ValidationRules};
pub use form::{FormSchema, Section, Settings};
