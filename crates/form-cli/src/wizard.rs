use std::collections::BTreeMap;

use form_session::{FieldView, FormView};
use form_spec::{FieldType, ValueMap, coerce_to_string};
use serde_json::{Number, Value, json};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: field prompts only.
    Clean,
    /// Verbose output: progress, resolved states, error details.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Presenter responsible for printing prompts once the session yields a field.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, view: &FormView) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", view.form_title);
        if self.verbosity.is_verbose()
            && let Some(description) = &view.description
        {
            println!("About: {}", description);
        }
        self.header_printed = true;
    }

    pub fn show_progress(&self, view: &FormView) {
        if self.verbosity.is_verbose() {
            println!(
                "Progress: {}/{} required fields",
                view.progress.completed, view.progress.total
            );
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = prompt.label.clone();
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(description) = &prompt.description {
            println!("{}", description);
        }
        if self.verbosity.is_verbose() && !prompt.choices.is_empty() {
            println!("Choices: {}", prompt.choices.join(", "));
        }
    }

    pub fn show_field_error(&self, message: &str) {
        eprintln!("Invalid answer: {}", message);
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.message);
    }

    pub fn show_errors(&self, errors: &BTreeMap<String, String>) {
        eprintln!("The form has {} remaining error(s):", errors.len());
        for (field_id, message) in errors {
            eprintln!("  {}: {}", field_id, message);
        }
    }

    pub fn show_completion(&self, values: Option<&ValueMap>) {
        println!("Submitted ✅");
        if let Some(values) = values {
            match serde_json::to_string_pretty(values) {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize values: {}", err),
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub id: String,
    pub label: String,
    pub kind: FieldType,
    pub description: Option<String>,
    pub required: bool,
    pub hint: Option<String>,
    pub choices: Vec<String>,
}

impl PromptContext {
    pub fn new(field: &FieldView) -> Self {
        let choices = field
            .options
            .iter()
            .map(|option| option.value.clone())
            .collect::<Vec<_>>();
        Self {
            id: field.id.clone(),
            label: field.label.clone(),
            kind: field.kind,
            description: field.description.clone(),
            required: field.required,
            hint: kind_hint(field.kind, &choices),
            choices,
        }
    }
}

fn kind_hint(kind: FieldType, choices: &[String]) -> Option<String> {
    match kind {
        FieldType::Boolean => Some("(yes/no)".to_string()),
        FieldType::Number => Some("(number)".to_string()),
        FieldType::Date => Some("(YYYY-MM-DD)".to_string()),
        FieldType::File => Some("(file name and size in bytes)".to_string()),
        FieldType::Choice if !choices.is_empty() => Some(format!("({})", choices.join("/"))),
        _ => None,
    }
}

/// Error produced when an answer cannot be turned into a value at all.
#[derive(Debug)]
pub struct AnswerParseError {
    pub message: String,
}

impl AnswerParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns raw wizard input into a field value.
///
/// Only booleans and files need real parsing here; everything else passes
/// through as a string so the engine's validator produces the message.
pub fn parse_answer(kind: FieldType, input: &str) -> Result<Value, AnswerParseError> {
    if input.is_empty() {
        return Ok(Value::Null);
    }
    match kind {
        FieldType::Boolean => match input.to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Value::Bool(true)),
            "no" | "n" | "false" => Ok(Value::Bool(false)),
            _ => Err(AnswerParseError::new("enter yes or no")),
        },
        FieldType::Number => Ok(input
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(input.to_string()))),
        FieldType::File => {
            let mut parts = input.split_whitespace();
            let name = parts.next().unwrap_or_default();
            let size = parts
                .next()
                .map(|raw| {
                    raw.parse::<u64>()
                        .map_err(|_| AnswerParseError::new("size must be a whole number of bytes"))
                })
                .transpose()?
                .unwrap_or(0);
            Ok(json!({ "name": name, "size": size }))
        }
        _ => Ok(Value::String(input.to_string())),
    }
}

/// Human-friendly text rendering of the resolved view, used by `inspect`.
pub fn render_view_text(view: &FormView) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", view.form_title, view.form_id));
    lines.push(format!(
        "Status: {} ({}/{} required fields)",
        view.status, view.progress.completed, view.progress.total
    ));
    for section in &view.sections {
        if !section.visible {
            lines.push(format!("Section: {} [hidden]", section.title));
            continue;
        }
        lines.push(format!("Section: {}", section.title));
        for field in section.fields.iter().filter(|field| field.visible) {
            let mut entry = format!(" - {} ({})", field.id, field.label);
            if field.required {
                entry.push_str(" [required]");
            }
            if !field.enabled {
                entry.push_str(" [disabled]");
            }
            if let Some(value) = &field.value {
                entry.push_str(&format!(" = {}", coerce_to_string(value)));
            }
            if let Some(error) = &field.error {
                entry.push_str(&format!(" ! {}", error));
            }
            lines.push(entry);
        }
    }
    lines.join("\n")
}
