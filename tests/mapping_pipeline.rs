//! Generated records flowing through rule sets.

use sandbox_sim::job::VALIDATION_FAILED;
use sandbox_sim::{EngineSettings, JobConfig, JobKind, JobStatus, SandboxEngine};
use sim_audit::NullSink;
use sim_core::{EntityKind, Value};
use sim_generator::DataGenerator;
use sim_mapping::{
    apply_mapping, validate_mapping, MappingRule, RuleSet, Transform, TransformRule,
    ValidationKind, ValidationRule,
};

const CONTACT_RULES: &str = r#"
mappings:
  - source_field: id
    target_field: id
    required: true
  - source_field: email
    target_field: contact.email
  - source_field: nickname
    target_field: contact.nickname
    default: none
transforms:
  - field: contact.email
    transform:
      type: uppercase
validations:
  - field: id
    rule:
      type: required
  - field: contact.email
    rule:
      type: email
"#;

#[test]
fn test_every_kind_is_deterministic() {
    let mut generator = DataGenerator::new(1);
    for kind in EntityKind::ALL {
        let first = generator.generate(kind, 5, Some(777));
        let second = generator.generate(kind, 5, Some(777));
        assert_eq!(first, second, "{kind}");
        assert!(first.iter().all(|r| r.identifier().is_some()), "{kind}");
        assert!(first.iter().all(|r| r.kind == kind), "{kind}");
    }
}

#[test]
fn test_mapping_generated_contacts() {
    let rules = RuleSet::from_yaml(CONTACT_RULES).unwrap();
    let mut generator = DataGenerator::new(42);

    for record in generator.generate(EntityKind::Contact, 5, Some(9)) {
        let input = record.to_value();
        let output = rules.apply(&input);

        assert_eq!(output.get("id"), input.get("id"));
        assert_eq!(output.get_path("contact.nickname"), Some(&Value::from("none")));
        let email = output.get_path("contact.email").and_then(Value::as_str).unwrap();
        assert_eq!(email, email.to_uppercase());
        assert!(rules.validate(&output).valid);

        // Input is untouched and mapping twice gives the same output
        assert_eq!(input, record.to_value());
        assert_eq!(rules.apply(&input), output);
    }
}

#[test]
fn test_every_violation_is_reported() {
    let record = Value::from(serde_json::json!({
        "name": "",
        "amount": -5,
        "email": "not-an-email",
        "tags": ["a"],
    }));
    let rules = vec![
        ValidationRule::new("name", ValidationKind::Required),
        ValidationRule::new("missing", ValidationKind::NotNull),
        ValidationRule::new("amount", ValidationKind::Positive),
        ValidationRule::new("email", ValidationKind::Email),
        ValidationRule::new("tags", ValidationKind::MinLength { min: 2 }),
        ValidationRule::new("email", ValidationKind::MaxLength { max: 64 }),
    ];

    let outcome = validate_mapping(&record, &rules);
    assert!(!outcome.valid);
    assert_eq!(outcome.errors.len(), 5);
    let failed: Vec<&str> = outcome.errors.iter().map(|e| e.rule.as_str()).collect();
    assert_eq!(
        failed,
        ["required", "not_null", "positive", "email", "min_length"]
    );
}

#[test]
fn test_transform_chain_on_nested_target() {
    let input = Value::from(serde_json::json!({ "amt": "12550" }));
    let output = apply_mapping(
        &input,
        &[MappingRule::new("amt", "invoice.amount").required()],
        &[
            TransformRule::new(
                "invoice.amount",
                Transform::ToNumber {
                    divide: Some(100.0),
                    multiply: None,
                },
            ),
            TransformRule::new(
                "invoice.amount",
                Transform::Currency {
                    currency: "EUR".to_string(),
                },
            ),
        ],
    );

    assert_eq!(
        output.to_json(),
        serde_json::json!({ "invoice": { "amount": { "amount": 125.5, "currency": "EUR" } } })
    );
}

#[tokio::test]
async fn test_job_reports_rule_violations_without_failing() {
    let engine = SandboxEngine::builder(EngineSettings::immediate())
        .log_sink(NullSink)
        .build();
    let rules = RuleSet::from_yaml(
        r#"
validations:
  - field: fax
    rule:
      type: required
"#,
    )
    .unwrap();
    let config = JobConfig::new("crm_mock", JobKind::Sync, EntityKind::Contact, 4)
        .with_seed(3)
        .with_rules(rules);

    let result = engine.jobs().run(config, None).await;
    assert_eq!(result.status, JobStatus::Completed);
    assert_eq!(result.error_count, 0);
    assert_eq!(
        result
            .errors
            .iter()
            .filter(|e| e.code == VALIDATION_FAILED)
            .count(),
        4
    );
    assert!(result
        .errors
        .iter()
        .all(|e| e.field.as_deref() == Some("fax")));
}
