use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::conditional::Conditional;
use crate::spec::field::{ChoiceOption, FieldSchema, FieldType, ValidationRules};
use crate::spec::form::{FormSchema, Section, Settings};

/// Invariant violations surfaced when building a schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("duplicate field id '{0}'")]
    DuplicateField(String),
    #[error("duplicate section id '{0}'")]
    DuplicateSection(String),
    #[error("conditional on '{0}' references unknown field '{1}'")]
    DanglingConditional(String, String),
    #[error("choice field '{0}' must declare at least one option")]
    MissingOptions(String),
    #[error("field '{0}' has min_len greater than max_len")]
    InvertedLength(String),
    #[error("field '{0}' has min greater than max")]
    InvertedBounds(String),
    #[error("auto_save_interval_secs must be greater than zero")]
    ZeroAutosaveInterval,
}

/// Fluent construction of a [`FieldSchema`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: FieldSchema,
}

impl FieldBuilder {
    pub fn new(id: impl Into<String>, kind: FieldType, label: impl Into<String>) -> Self {
        Self {
            field: FieldSchema {
                id: id.into(),
                kind,
                label: label.into(),
                description: None,
                required: false,
                read_only: false,
                options: Vec::new(),
                rules: None,
                conditional: None,
                default_value: None,
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.field.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.field.read_only = true;
        self
    }

    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.field.rules = Some(rules);
        self
    }

    pub fn conditional(mut self, conditional: Conditional) -> Self {
        self.field.conditional = Some(conditional);
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.field.options.push(ChoiceOption {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.field.default_value = Some(value);
        self
    }

    pub fn build(self) -> FieldSchema {
        self.field
    }
}

/// Fluent construction of a [`Section`].
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    section: Section,
}

impl SectionBuilder {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            section: Section {
                id: id.into(),
                title: title.into(),
                description: None,
                conditional: None,
                fields: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.section.description = Some(description.into());
        self
    }

    pub fn conditional(mut self, conditional: Conditional) -> Self {
        self.section.conditional = Some(conditional);
        self
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.section.fields.push(field.build());
        self
    }

    pub fn build(self) -> Section {
        self.section
    }
}

/// Fluent construction of a [`FormSchema`], enforcing its invariants.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    schema: FormSchema,
}

impl FormBuilder {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            schema: FormSchema {
                id: id.into(),
                title: title.into(),
                version: "1.0.0".into(),
                description: None,
                settings: Settings::default(),
                sections: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.schema.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.schema.description = Some(description.into());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.schema.settings = settings;
        self
    }

    pub fn section(mut self, section: SectionBuilder) -> Self {
        self.schema.sections.push(section.build());
        self
    }

    pub fn build(self) -> Result<FormSchema, BuilderError> {
        check_schema(&self.schema)?;
        Ok(self.schema)
    }
}

/// Checks the structural invariants a well-formed schema upholds.
///
/// The session itself never requires this to have run; deserialized schemas
/// that skip it degrade per the fail-open rules instead of erroring.
pub fn check_schema(schema: &FormSchema) -> Result<(), BuilderError> {
    if schema.settings.auto_save_interval_secs == 0 {
        return Err(BuilderError::ZeroAutosaveInterval);
    }

    let mut section_ids = HashSet::new();
    let mut field_ids = HashSet::new();
    for section in &schema.sections {
        if !section_ids.insert(section.id.clone()) {
            return Err(BuilderError::DuplicateSection(section.id.clone()));
        }
        for field in &section.fields {
            if !field_ids.insert(field.id.clone()) {
                return Err(BuilderError::DuplicateField(field.id.clone()));
            }
        }
    }

    for section in &schema.sections {
        if let Some(conditional) = &section.conditional
            && !field_ids.contains(&conditional.source_field)
        {
            return Err(BuilderError::DanglingConditional(
                section.id.clone(),
                conditional.source_field.clone(),
            ));
        }
        for field in &section.fields {
            if let Some(conditional) = &field.conditional
                && !field_ids.contains(&conditional.source_field)
            {
                return Err(BuilderError::DanglingConditional(
                    field.id.clone(),
                    conditional.source_field.clone(),
                ));
            }
            if field.kind == FieldType::Choice && field.options.is_empty() {
                return Err(BuilderError::MissingOptions(field.id.clone()));
            }
            if let Some(rules) = &field.rules {
                if let (Some(min_len), Some(max_len)) = (rules.min_len, rules.max_len)
                    && min_len > max_len
                {
                    return Err(BuilderError::InvertedLength(field.id.clone()));
                }
                if let (Some(min), Some(max)) = (rules.min, rules.max)
                    && min > max
                {
                    return Err(BuilderError::InvertedBounds(field.id.clone()));
                }
            }
        }
    }

    Ok(())
}
