use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::conditional::{ValueMap, coerce_to_string};
use crate::resolve::resolve_states;
use crate::spec::field::{FieldSchema, FieldType};
use crate::spec::form::FormSchema;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("hard-coded pattern"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("hard-coded pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().-]{7,}$").expect("hard-coded pattern"));
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("hard-coded pattern")
});

/// Validates a single field against a candidate value.
///
/// `required` is the field's resolved requiredness, not its static flag.
/// Checks run in a fixed order and the first failure wins; `None` means the
/// value passed every applicable check.
pub fn validate_field(field: &FieldSchema, value: Option<&Value>, required: bool) -> Option<String> {
    if field.kind == FieldType::File {
        return validate_file(field, value, required);
    }

    let text = value.map(coerce_to_string).unwrap_or_default();
    if text.trim().is_empty() {
        return required.then(|| format!("{} is required", field.label));
    }

    if field.kind.is_text_like()
        && let Some(rules) = &field.rules
    {
        let length = text.chars().count();
        if let Some(min_len) = rules.min_len
            && length < min_len
        {
            return Some(format!(
                "{} must be at least {} characters",
                field.label, min_len
            ));
        }
        if let Some(max_len) = rules.max_len
            && length > max_len
        {
            return Some(format!(
                "{} must be at most {} characters",
                field.label, max_len
            ));
        }
    }

    if field.kind == FieldType::Number {
        let Ok(number) = text.parse::<f64>() else {
            return Some(format!("{} must be a valid number", field.label));
        };
        if let Some(rules) = &field.rules {
            if let Some(min) = rules.min
                && number < min
            {
                return Some(format!("{} must be at least {}", field.label, min));
            }
            if let Some(max) = rules.max
                && number > max
            {
                return Some(format!("{} must be at most {}", field.label, max));
            }
        }
    }

    if let Some(rules) = &field.rules
        && let Some(pattern) = &rules.pattern
    {
        // the value must match the whole pattern, not a substring of it
        match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(regex) => {
                if !regex.is_match(&text) {
                    return Some(rules.message.clone().unwrap_or_else(|| {
                        format!("{} has an invalid format", field.label)
                    }));
                }
            }
            Err(error) => {
                tracing::debug!(field = %field.id, %error, "skipping unparseable pattern");
            }
        }
    }

    if let Some(message) = check_fixed_format(field, &text) {
        return Some(message);
    }

    if field.kind == FieldType::Choice
        && !field.options.is_empty()
        && !field.options.iter().any(|option| option.value == text)
    {
        return Some(format!("{} must be one of the listed options", field.label));
    }

    None
}

/// Validates every visible field of the schema, resolving states once.
///
/// Hidden fields are skipped entirely, so stale values behind an unmet
/// show-condition never produce errors.
pub fn validate_all(schema: &FormSchema, values: &ValueMap) -> BTreeMap<String, String> {
    let states = resolve_states(schema, values);
    let mut errors = BTreeMap::new();
    for field in schema.fields() {
        let Some(state) = states.get(&field.id) else {
            continue;
        };
        if !state.visible {
            continue;
        }
        if let Some(message) = validate_field(field, values.get(&field.id), state.required) {
            errors.insert(field.id.clone(), message);
        }
    }
    errors
}

/// Format checks applied by field kind regardless of any custom pattern.
fn check_fixed_format(field: &FieldSchema, text: &str) -> Option<String> {
    let failure = match field.kind {
        FieldType::Email if !EMAIL.is_match(text) => Some("must be a valid email address"),
        FieldType::Url if !URL.is_match(text) => Some("must be a valid URL"),
        FieldType::Phone if !PHONE.is_match(text) => Some("must be a valid phone number"),
        FieldType::Date if !DATE.is_match(text) => Some("must be a date in YYYY-MM-DD format"),
        _ => None,
    };
    failure.map(|suffix| format!("{} {}", field.label, suffix))
}

/// File values are objects of the shape `{"name": string, "size": u64}`.
fn validate_file(field: &FieldSchema, value: Option<&Value>, required: bool) -> Option<String> {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return required.then(|| format!("{} is required", field.label));
    };
    let Some(object) = value.as_object() else {
        return Some(format!("{} has an invalid format", field.label));
    };
    let name = object.get("name").and_then(Value::as_str).unwrap_or_default();
    let size = object.get("size").and_then(Value::as_u64).unwrap_or(0);

    if let Some(rules) = &field.rules {
        if !rules.allowed_file_types.is_empty() {
            let extension = name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();
            let allowed = rules
                .allowed_file_types
                .iter()
                .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(&extension));
            if !allowed {
                return Some(format!(
                    "{} must be one of: {}",
                    field.label,
                    rules.allowed_file_types.join(", ")
                ));
            }
        }
        if let Some(max_size) = rules.max_file_size
            && size > max_size
        {
            return Some(format!("{} exceeds the maximum file size", field.label));
        }
    }

    None
}
