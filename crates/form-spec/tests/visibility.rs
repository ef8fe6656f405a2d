use serde_json::json;

use form_spec::{
    ConditionAction, ConditionOperator, Conditional, FieldBuilder, FieldType, FormBuilder,
    SectionBuilder, ValueMap, resolve_sections, resolve_states,
};

fn conditional(source: &str, operator: ConditionOperator, value: &str, action: ConditionAction) -> Conditional {
    Conditional {
        source_field: source.into(),
        operator,
        value: value.into(),
        action,
    }
}

fn values(pairs: &[(&str, serde_json::Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), value.clone()))
        .collect()
}

#[test]
fn operators_compare_coerced_strings() {
    let cases = [
        (ConditionOperator::Equals, json!("yes"), "yes", true),
        (ConditionOperator::Equals, json!("no"), "yes", false),
        (ConditionOperator::Equals, json!(true), "true", true),
        (ConditionOperator::NotEquals, json!("no"), "yes", true),
        (ConditionOperator::Contains, json!("Hello World"), "world", true),
        (ConditionOperator::Contains, json!("Hello"), "world", false),
        (ConditionOperator::NotContains, json!("Hello"), "world", true),
        (ConditionOperator::GreaterThan, json!("10"), "5", true),
        (ConditionOperator::GreaterThan, json!(3), "5", false),
        (ConditionOperator::GreaterThan, json!("abc"), "5", false),
        (ConditionOperator::LessThan, json!("3"), "5", true),
        (ConditionOperator::LessThan, json!("3"), "abc", false),
        (ConditionOperator::IsEmpty, json!(""), "", true),
        (ConditionOperator::IsEmpty, json!("x"), "", false),
        (ConditionOperator::IsNotEmpty, json!("x"), "", true),
    ];
    for (operator, current, literal, expected) in cases {
        let rule = conditional("source", operator, literal, ConditionAction::Show);
        let met = rule.is_met(&values(&[("source", current.clone())]));
        assert_eq!(met, expected, "{:?} on {:?}", operator, current);
    }
}

#[test]
fn absent_source_value_coerces_to_empty_string() {
    let rule = conditional("source", ConditionOperator::IsEmpty, "", ConditionAction::Show);
    assert!(rule.is_met(&ValueMap::new()));
}

fn show_hide_schema() -> form_spec::FormSchema {
    FormBuilder::new("f", "F")
        .section(
            SectionBuilder::new("s", "S")
                .field(FieldBuilder::new("a", FieldType::Text, "A"))
                .field(FieldBuilder::new("b", FieldType::Text, "B").conditional(conditional(
                    "a",
                    ConditionOperator::Equals,
                    "X",
                    ConditionAction::Show,
                ))),
        )
        .build()
        .expect("valid schema")
}

#[test]
fn show_condition_follows_the_source_value() {
    let schema = show_hide_schema();

    let states = resolve_states(&schema, &values(&[("a", json!("X"))]));
    assert!(states["b"].visible);

    let states = resolve_states(&schema, &values(&[("a", json!("Y"))]));
    assert!(!states["b"].visible);

    let states = resolve_states(&schema, &ValueMap::new());
    assert!(!states["b"].visible);
}

#[test]
fn resolution_is_idempotent_for_unchanged_values() {
    let schema = show_hide_schema();
    let current = values(&[("a", json!("X"))]);
    let first = resolve_states(&schema, &current);
    let second = resolve_states(&schema, &current);
    assert_eq!(first, second);
}

#[test]
fn fields_without_conditionals_keep_static_state() {
    let schema = FormBuilder::new("f", "F")
        .section(
            SectionBuilder::new("s", "S")
                .field(FieldBuilder::new("plain", FieldType::Text, "Plain").required())
                .field(FieldBuilder::new("frozen", FieldType::Text, "Frozen").read_only()),
        )
        .build()
        .expect("valid schema");
    let states = resolve_states(&schema, &ValueMap::new());
    assert!(states["plain"].visible && states["plain"].enabled && states["plain"].required);
    assert!(states["frozen"].visible && !states["frozen"].enabled);
}

#[test]
fn enable_and_disable_override_read_only() {
    let schema = FormBuilder::new("f", "F")
        .section(
            SectionBuilder::new("s", "S")
                .field(FieldBuilder::new("mode", FieldType::Text, "Mode"))
                .field(
                    FieldBuilder::new("manual", FieldType::Text, "Manual")
                        .read_only()
                        .conditional(conditional(
                            "mode",
                            ConditionOperator::Equals,
                            "manual",
                            ConditionAction::Enable,
                        )),
                ),
        )
        .build()
        .expect("valid schema");

    let states = resolve_states(&schema, &values(&[("mode", json!("manual"))]));
    assert!(states["manual"].enabled);

    let states = resolve_states(&schema, &values(&[("mode", json!("auto"))]));
    assert!(!states["manual"].enabled);
}

#[test]
fn require_and_optional_override_the_static_flag() {
    let schema = FormBuilder::new("f", "F")
        .section(
            SectionBuilder::new("s", "S")
                .field(FieldBuilder::new("notify", FieldType::Boolean, "Notify"))
                .field(FieldBuilder::new("email", FieldType::Email, "Email").conditional(
                    conditional(
                        "notify",
                        ConditionOperator::Equals,
                        "true",
                        ConditionAction::Require,
                    ),
                ))
                .field(
                    FieldBuilder::new("reason", FieldType::Text, "Reason")
                        .required()
                        .conditional(conditional(
                            "notify",
                            ConditionOperator::Equals,
                            "true",
                            ConditionAction::Optional,
                        )),
                ),
        )
        .build()
        .expect("valid schema");

    let states = resolve_states(&schema, &values(&[("notify", json!(true))]));
    assert!(states["email"].required);
    assert!(!states["reason"].required);

    let states = resolve_states(&schema, &values(&[("notify", json!(false))]));
    assert!(!states["email"].required);
    assert!(states["reason"].required);
}

#[test]
fn section_conditionals_cascade_to_fields() {
    let schema = FormBuilder::new("f", "F")
        .section(
            SectionBuilder::new("screening", "Screening")
                .field(FieldBuilder::new("referred", FieldType::Boolean, "Referred")),
        )
        .section(
            SectionBuilder::new("referral", "Referral")
                .conditional(conditional(
                    "referred",
                    ConditionOperator::Equals,
                    "true",
                    ConditionAction::Show,
                ))
                .field(FieldBuilder::new("clinic", FieldType::Text, "Clinic").conditional(
                    conditional(
                        "referred",
                        ConditionOperator::Equals,
                        "true",
                        ConditionAction::Require,
                    ),
                ))
                .field(FieldBuilder::new("notes", FieldType::LongText, "Notes")),
        )
        .build()
        .expect("valid schema");

    let states = resolve_states(&schema, &values(&[("referred", json!(false))]));
    assert!(!states["clinic"].visible);
    assert!(!states["notes"].visible);

    let states = resolve_states(&schema, &values(&[("referred", json!(true))]));
    assert!(states["clinic"].visible && states["clinic"].required);
    assert!(states["notes"].visible);

    let sections = resolve_sections(&schema, &values(&[("referred", json!(false))]));
    assert!(sections["screening"].visible);
    assert!(!sections["referral"].visible);
}

#[test]
fn section_require_applies_to_fields_without_their_own_rule() {
    let schema = FormBuilder::new("f", "F")
        .section(
            SectionBuilder::new("s1", "S1")
                .field(FieldBuilder::new("urgent", FieldType::Boolean, "Urgent")),
        )
        .section(
            SectionBuilder::new("s2", "S2")
                .conditional(conditional(
                    "urgent",
                    ConditionOperator::Equals,
                    "true",
                    ConditionAction::Require,
                ))
                .field(FieldBuilder::new("contact", FieldType::Phone, "Contact"))
                .field(FieldBuilder::new("fallback", FieldType::Text, "Fallback").conditional(
                    conditional(
                        "urgent",
                        ConditionOperator::Equals,
                        "never",
                        ConditionAction::Require,
                    ),
                )),
        )
        .build()
        .expect("valid schema");

    let states = resolve_states(&schema, &values(&[("urgent", json!(true))]));
    assert!(states["contact"].required, "section rule reaches plain fields");
    assert!(!states["fallback"].required, "field's own rule wins");
}

#[test]
fn dangling_conditional_source_fails_open() {
    // built by hand: the builder would reject the dangling reference
    let mut schema = show_hide_schema();
    schema.sections[0].fields[1].conditional = Some(conditional(
        "missing",
        ConditionOperator::IsEmpty,
        "",
        ConditionAction::Show,
    ));

    // is_empty over a missing field would be met, but an unknown id is a
    // malformation and must resolve to "never met"
    let states = resolve_states(&schema, &ValueMap::new());
    assert!(!states["b"].visible);
}
