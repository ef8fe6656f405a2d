use std::collections::BTreeMap;

use crate::conditional::{ConditionAction, Conditional, ValueMap};
use crate::spec::field::FieldSchema;
use crate::spec::form::{FormSchema, Section};

pub type StateMap = BTreeMap<String, FieldState>;
pub type SectionMap = BTreeMap<String, SectionState>;

/// Resolved presentation state of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    pub visible: bool,
    pub enabled: bool,
    pub required: bool,
}

impl FieldState {
    /// State a field takes with no conditional in play.
    pub fn default_for(field: &FieldSchema) -> Self {
        Self {
            visible: true,
            enabled: !field.read_only,
            required: field.required,
        }
    }
}

/// Resolved state of a section before field-level rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionState {
    pub visible: bool,
    pub enabled: bool,
    /// Required override a section-level require/optional rule pushes onto
    /// fields that carry no conditional of their own.
    pub required_override: Option<bool>,
}

impl Default for SectionState {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            required_override: None,
        }
    }
}

/// Resolves visibility, enablement, and requiredness for every field.
///
/// Re-derived from scratch on each call: every field and section carries at
/// most one conditional, so there is no dependency graph to maintain.
pub fn resolve_states(schema: &FormSchema, values: &ValueMap) -> StateMap {
    let mut map = StateMap::new();
    for section in &schema.sections {
        let section_state = resolve_section(schema, section, values);
        for field in &section.fields {
            let mut state = FieldState::default_for(field);
            if let Some(required) = section_state.required_override
                && field.conditional.is_none()
            {
                state.required = required;
            }
            if let Some(conditional) = &field.conditional {
                let met = condition_met(schema, conditional, values);
                apply_action(&mut state, conditional.action, met);
            }
            state.visible &= section_state.visible;
            state.enabled &= section_state.enabled;
            map.insert(field.id.clone(), state);
        }
    }
    map
}

/// Resolves section-level state for every section in the schema.
pub fn resolve_sections(schema: &FormSchema, values: &ValueMap) -> SectionMap {
    schema
        .sections
        .iter()
        .map(|section| {
            (
                section.id.clone(),
                resolve_section(schema, section, values),
            )
        })
        .collect()
}

fn resolve_section(schema: &FormSchema, section: &Section, values: &ValueMap) -> SectionState {
    let mut state = SectionState::default();
    if let Some(conditional) = &section.conditional {
        let met = condition_met(schema, conditional, values);
        match conditional.action {
            ConditionAction::Show => state.visible = met,
            ConditionAction::Hide => state.visible = !met,
            ConditionAction::Enable => state.enabled = met,
            ConditionAction::Disable => state.enabled = !met,
            ConditionAction::Require => state.required_override = Some(met),
            ConditionAction::Optional => state.required_override = Some(!met),
        }
    }
    state
}

fn apply_action(state: &mut FieldState, action: ConditionAction, met: bool) {
    match action {
        ConditionAction::Show => state.visible = met,
        ConditionAction::Hide => state.visible = !met,
        ConditionAction::Enable => state.enabled = met,
        ConditionAction::Disable => state.enabled = !met,
        ConditionAction::Require => state.required = met,
        ConditionAction::Optional => state.required = !met,
    }
}

/// A conditional pointing at a field id absent from the schema is a schema
/// malformation; it degrades to "never met" instead of failing the session.
fn condition_met(schema: &FormSchema, conditional: &Conditional, values: &ValueMap) -> bool {
    if !schema.has_field(&conditional.source_field) {
        tracing::debug!(
            source = %conditional.source_field,
            "conditional references unknown field; treating condition as not met"
        );
        return false;
    }
    conditional.is_met(values)
}
