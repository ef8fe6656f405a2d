#![allow(missing_docs)]

pub mod builder;
pub mod conditional;
pub mod resolve;
pub mod spec;
pub mod validate;
pub mod values_schema;

pub use builder::{BuilderError, FieldBuilder, FormBuilder, SectionBuilder, check_schema};
pub use conditional::{
    ConditionAction, ConditionOperator, Conditional, ValueMap, coerce_to_string,
};
pub use resolve::{
    FieldState, SectionMap, SectionState, StateMap, resolve_sections, resolve_states,
};
pub use spec::{ChoiceOption, FieldSchema, FieldType, FormSchema, Section, Settings, ValidationRules};
pub use validate::{validate_all, validate_field};
pub use values_schema::generate as values_schema;
