//! Mapping, validation and preview entry points.

use crate::rules::{MappingRule, RuleSet, TransformRule, ValidationRule};
use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use sim_core::Value;

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Every stage of the pipeline for one record, for rule authoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingPreview {
    pub input: Value,
    pub output: Value,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

/// Map and transform one record.
///
/// With no mapping rules the input is carried over unchanged before
/// transforms run. Transforms whose field is absent from the output are
/// skipped.
pub fn apply_mapping(
    input: &Value,
    mappings: &[MappingRule],
    transforms: &[TransformRule],
) -> Value {
    let mut output = if mappings.is_empty() {
        input.clone()
    } else {
        Value::object()
    };

    for rule in mappings {
        let source = input
            .get_path(&rule.source_field)
            .cloned()
            .or_else(|| rule.default.clone());
        if let Some(value) = source {
            output.set_path(&rule.target_field, value);
        }
    }

    for rule in transforms {
        if let Some(slot) = output.get_path_mut(&rule.field) {
            *slot = rule.transform.apply(slot);
        }
    }

    output
}

/// Evaluate every rule; no short-circuit, so all violations are reported.
pub fn validate_mapping(record: &Value, rules: &[ValidationRule]) -> ValidationOutcome {
    let errors: Vec<ValidationError> = rules.iter().filter_map(|rule| rule.check(record)).collect();
    ValidationOutcome {
        valid: errors.is_empty(),
        errors,
    }
}

/// Run mapping, transforms and validation, collecting authoring warnings.
pub fn preview_mapping(
    input: &Value,
    mappings: &[MappingRule],
    transforms: &[TransformRule],
    validations: &[ValidationRule],
) -> MappingPreview {
    let mut warnings: Vec<String> = mappings
        .iter()
        .filter(|rule| {
            rule.required && rule.default.is_none() && input.get_path(&rule.source_field).is_none()
        })
        .map(|rule| {
            format!(
                "Required source field '{}' is missing (target '{}')",
                rule.source_field, rule.target_field
            )
        })
        .collect();

    // Same passes as apply_mapping, but skipped transforms become warnings
    let mut output = apply_mapping(input, mappings, &[]);
    for rule in transforms {
        match output.get_path_mut(&rule.field) {
            Some(slot) => *slot = rule.transform.apply(slot),
            None => warnings.push(format!(
                "Transform '{}' skipped: field '{}' is not present",
                rule.transform.name(),
                rule.field
            )),
        }
    }
    let outcome = validate_mapping(&output, validations);

    MappingPreview {
        input: input.clone(),
        output,
        errors: outcome.errors,
        warnings,
    }
}

impl RuleSet {
    /// [`apply_mapping`] with this rule set.
    pub fn apply(&self, input: &Value) -> Value {
        apply_mapping(input, &self.mappings, &self.transforms)
    }

    /// [`validate_mapping`] with this rule set.
    pub fn validate(&self, record: &Value) -> ValidationOutcome {
        validate_mapping(record, &self.validations)
    }

    /// [`preview_mapping`] with this rule set.
    pub fn preview(&self, input: &Value) -> MappingPreview {
        preview_mapping(input, &self.mappings, &self.transforms, &self.validations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Transform, ValidationKind};

    fn input() -> Value {
        Value::from(serde_json::json!({
            "customer": { "email": " ADA@EXAMPLE.COM ", "active": "yes" },
            "total_cents": "4599",
            "code": "p"
        }))
    }

    #[test]
    fn test_nested_mapping_and_defaults() {
        let mappings = vec![
            MappingRule::new("customer.email", "contact.email"),
            MappingRule::new("total_cents", "invoice.total"),
            MappingRule::new("currency", "invoice.currency").with_default("USD"),
            MappingRule::new("absent", "invoice.absent"),
        ];
        let output = apply_mapping(&input(), &mappings, &[]);

        assert_eq!(
            output.get_path("contact.email"),
            Some(&Value::from(" ADA@EXAMPLE.COM "))
        );
        assert_eq!(output.get_path("invoice.total"), Some(&Value::from("4599")));
        assert_eq!(output.get_path("invoice.currency"), Some(&Value::from("USD")));
        assert_eq!(output.get_path("invoice.absent"), None);
        assert_eq!(output.get("code"), None);
    }

    #[test]
    fn test_transforms_run_in_declaration_order() {
        let mappings = vec![MappingRule::new("total_cents", "total")];
        let transforms = vec![
            TransformRule::new(
                "total",
                Transform::ToNumber {
                    divide: Some(100.0),
                    multiply: None,
                },
            ),
            TransformRule::new(
                "total",
                Transform::Currency {
                    currency: "USD".to_string(),
                },
            ),
        ];
        let output = apply_mapping(&input(), &mappings, &transforms);
        assert_eq!(output.get_path("total.amount"), Some(&Value::Float(45.99)));
        assert_eq!(output.get_path("total.currency"), Some(&Value::from("USD")));
    }

    #[test]
    fn test_no_mappings_passes_input_through() {
        let transforms = vec![TransformRule::new("code", Transform::Uppercase)];
        let output = apply_mapping(&input(), &[], &transforms);
        assert_eq!(output.get("code"), Some(&Value::from("P")));
        assert_eq!(output.get("total_cents"), Some(&Value::from("4599")));
    }

    #[test]
    fn test_idempotent_transforms_are_stable() {
        let transforms = vec![
            TransformRule::new("customer.email", Transform::Trim),
            TransformRule::new("customer.email", Transform::Lowercase),
            TransformRule::new("customer.active", Transform::ToBoolean),
            TransformRule::new("code", Transform::Uppercase),
        ];
        let once = apply_mapping(&input(), &[], &transforms);
        let twice = apply_mapping(&once, &[], &transforms);
        assert_eq!(once, twice);
        assert_eq!(
            once.get_path("customer.email"),
            Some(&Value::from("ada@example.com"))
        );
        assert_eq!(once.get_path("customer.active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_validation_reports_every_violation() {
        let record = Value::from(serde_json::json!({ "email": "nope", "amount": -5, "name": "" }));
        let rules = vec![
            ValidationRule::new("email", ValidationKind::Email),
            ValidationRule::new("amount", ValidationKind::Positive),
            ValidationRule::new("name", ValidationKind::Required),
            ValidationRule::new("id", ValidationKind::NotNull),
            ValidationRule::new("email", ValidationKind::MinLength { min: 10 }),
        ];
        let outcome = validate_mapping(&record, &rules);

        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 5);
        let names: Vec<&str> = outcome.errors.iter().map(|e| e.rule.as_str()).collect();
        assert_eq!(names, ["email", "positive", "required", "not_null", "min_length"]);
    }

    #[test]
    fn test_validation_passes_clean_record() {
        let record = Value::from(serde_json::json!({ "email": "a@b.io" }));
        let rules = [ValidationRule::new("email", ValidationKind::Email)];
        let outcome = validate_mapping(&record, &rules);
        assert!(outcome.valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_preview_collects_warnings() {
        let rules = RuleSet {
            mappings: vec![
                MappingRule::new("customer.email", "email"),
                MappingRule::new("customer.phone", "phone").required(),
            ],
            transforms: vec![
                TransformRule::new("email", Transform::Trim),
                TransformRule::new("fax", Transform::Trim),
            ],
            validations: vec![ValidationRule::new("phone", ValidationKind::Required)],
        };
        let preview = rules.preview(&input());

        assert_eq!(preview.input, input());
        assert_eq!(preview.output.get("email"), Some(&Value::from("ADA@EXAMPLE.COM")));
        assert_eq!(preview.errors.len(), 1);
        assert_eq!(preview.warnings.len(), 2);
        assert!(preview.warnings[0].contains("customer.phone"));
        assert!(preview.warnings[1].contains("fax"));
    }
}
