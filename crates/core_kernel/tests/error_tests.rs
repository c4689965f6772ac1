//! Tests for field errors

use core_kernel::error::{describe_fields, field_errors, FieldError};
use validator::Validate;

#[test]
fn test_field_error_missing() {
    let error = FieldError::missing("policy_number");

    assert_eq!(error.field, "policy_number");
    assert_eq!(error.message, "field required");
}

#[test]
fn test_field_error_serializes_flat() {
    let error = FieldError::new("date_of_accident", "invalid datetime format");
    let json = serde_json::to_value(&error).unwrap();

    assert_eq!(json["field"], "date_of_accident");
    assert_eq!(json["message"], "invalid datetime format");
}

#[test]
fn test_describe_fields() {
    let errors = vec![
        FieldError::missing("accident_type"),
        FieldError::new("injuries_reported", "value could not be parsed to a boolean"),
    ];

    assert_eq!(
        describe_fields(&errors),
        "accident_type: field required; injuries_reported: value could not be parsed to a boolean"
    );
}

#[derive(Validate)]
struct Sample {
    #[validate(length(min = 1, message = "must not be empty"))]
    name: String,
    #[validate(length(max = 3))]
    code: String,
}

#[test]
fn test_field_errors_are_sorted_and_keep_messages() {
    let sample = Sample {
        name: String::new(),
        code: "ABCD".to_string(),
    };
    let errors = field_errors(&sample.validate().unwrap_err());

    assert_eq!(
        errors,
        vec![
            FieldError::new("code", "length"),
            FieldError::new("name", "must not be empty"),
        ]
    );
}
