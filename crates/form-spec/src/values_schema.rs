use serde_json::{Map, Value, json};

use crate::resolve::StateMap;
use crate::spec::field::{FieldSchema, FieldType};
use crate::spec::form::FormSchema;

/// Builds a JSON Schema describing the value map a form accepts.
///
/// Only visible fields become properties; the `required` array lists the
/// visible fields whose resolved state is required.
pub fn generate(schema: &FormSchema, states: &StateMap) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in schema.fields() {
        let visible = states.get(&field.id).map(|state| state.visible).unwrap_or(true);
        if !visible {
            continue;
        }
        properties.insert(field.id.clone(), property_for(field));
        if states.get(&field.id).map(|state| state.required).unwrap_or(false) {
            required.push(Value::String(field.id.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": schema.title,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn property_for(field: &FieldSchema) -> Value {
    let mut map = Map::new();
    map.insert("title".into(), Value::String(field.label.clone()));

    match field.kind {
        FieldType::Number => {
            map.insert("type".into(), Value::String("number".into()));
            if let Some(rules) = &field.rules {
                if let Some(min) = rules.min {
                    map.insert("minimum".into(), json!(min));
                }
                if let Some(max) = rules.max {
                    map.insert("maximum".into(), json!(max));
                }
            }
        }
        FieldType::Boolean => {
            map.insert("type".into(), Value::String("boolean".into()));
        }
        FieldType::Choice => {
            map.insert("type".into(), Value::String("string".into()));
            let values = field
                .options
                .iter()
                .map(|option| Value::String(option.value.clone()))
                .collect::<Vec<_>>();
            if !values.is_empty() {
                map.insert("enum".into(), Value::Array(values));
            }
        }
        FieldType::File => {
            map.insert("type".into(), Value::String("object".into()));
            map.insert(
                "properties".into(),
                json!({
                    "name": { "type": "string" },
                    "size": { "type": "integer", "minimum": 0 },
                }),
            );
            map.insert("required".into(), json!(["name"]));
        }
        FieldType::Date => {
            map.insert("type".into(), Value::String("string".into()));
            map.insert("format".into(), Value::String("date".into()));
        }
        FieldType::Email => {
            map.insert("type".into(), Value::String("string".into()));
            map.insert("format".into(), Value::String("email".into()));
        }
        FieldType::Url => {
            map.insert("type".into(), Value::String("string".into()));
            map.insert("format".into(), Value::String("uri".into()));
        }
        FieldType::Text | FieldType::LongText | FieldType::Phone => {
            map.insert("type".into(), Value::String("string".into()));
            if let Some(rules) = &field.rules {
                if let Some(min_len) = rules.min_len {
                    map.insert("minLength".into(), json!(min_len));
                }
                if let Some(max_len) = rules.max_len {
                    map.insert("maxLength".into(), json!(max_len));
                }
                if let Some(pattern) = &rules.pattern {
                    map.insert("pattern".into(), Value::String(pattern.clone()));
                }
            }
        }
    }

    if let Some(description) = &field.description {
        map.insert("description".into(), Value::String(description.clone()));
    }

    Value::Object(map)
}
