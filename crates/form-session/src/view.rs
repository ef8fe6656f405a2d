use form_spec::{ChoiceOption, FieldType, coerce_to_string, resolve_sections, resolve_states};
use serde::Serialize;
use serde_json::Value;

use crate::session::FormSession;

/// Completion counters over visible required fields.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Snapshot of one field for the render collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

/// Snapshot of a section with its resolved state.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    pub visible: bool,
    pub enabled: bool,
    pub fields: Vec<FieldView>,
}

/// Everything a renderer needs to paint the form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub form_id: String,
    pub form_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: &'static str,
    pub submit_label: String,
    pub progress: Progress,
    pub sections: Vec<SectionView>,
}

/// Assembles the render payload from the session's current state.
pub fn build_view(session: &FormSession) -> FormView {
    let schema = session.schema();
    let states = resolve_states(schema, session.values());
    let section_states = resolve_sections(schema, session.values());

    let mut completed = 0;
    let mut total = 0;
    let mut sections = Vec::with_capacity(schema.sections.len());

    for section in &schema.sections {
        let section_state = section_states
            .get(&section.id)
            .copied()
            .unwrap_or_default();
        let mut fields = Vec::with_capacity(section.fields.len());
        for field in &section.fields {
            let Some(state) = states.get(&field.id) else {
                continue;
            };
            if state.visible && state.required {
                total += 1;
                if is_answered(session.values().get(&field.id)) {
                    completed += 1;
                }
            }
            fields.push(FieldView {
                id: field.id.clone(),
                label: field.label.clone(),
                kind: field.kind,
                description: field.description.clone(),
                visible: state.visible,
                enabled: state.enabled,
                required: state.required,
                value: session.values().get(&field.id).cloned(),
                error: session.errors().get(&field.id).cloned(),
                options: field.options.clone(),
            });
        }
        sections.push(SectionView {
            id: section.id.clone(),
            title: section.title.clone(),
            visible: section_state.visible,
            enabled: section_state.enabled,
            fields,
        });
    }

    FormView {
        form_id: schema.id.clone(),
        form_title: schema.title.clone(),
        description: schema.description.clone(),
        status: session.status().as_str(),
        submit_label: schema.settings.submit_label.clone(),
        progress: Progress { completed, total },
        sections,
    }
}

fn is_answered(value: Option<&Value>) -> bool {
    value
        .map(coerce_to_string)
        .is_some_and(|text| !text.trim().is_empty())
}
