//! Claim aggregate and the submission form it is built from

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{field_errors, ClaimId, FieldError, UserId};

use crate::error::ClaimError;
use crate::image::ClaimImage;

/// A stored insurance claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Owning user
    pub user_id: UserId,
    /// Policy the claim is made against
    pub policy_number: String,
    /// When the accident happened
    pub date_of_accident: DateTime<Utc>,
    /// Free-text accident category
    pub accident_type: String,
    pub description: String,
    pub injuries_reported: bool,
    pub damage_details: String,
    /// Attached images, in upload order
    pub images: Vec<ClaimImage>,
}

impl Claim {
    /// Ids of the attached images, in upload order
    pub fn image_ids(&self) -> Vec<core_kernel::ImageId> {
        self.images.iter().map(|i| i.id).collect()
    }
}

/// A validated claim ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    pub policy_number: String,
    pub date_of_accident: DateTime<Utc>,
    pub accident_type: String,
    pub description: String,
    pub injuries_reported: bool,
    pub damage_details: String,
}

impl NewClaim {
    /// Runs the field rules, returning the claim unchanged on success
    pub fn validated(self) -> Result<Self, ClaimError> {
        let errors = ClaimText {
            policy_number: self.policy_number.clone(),
            accident_type: self.accident_type.clone(),
            description: self.description.clone(),
            damage_details: self.damage_details.clone(),
        }
        .errors();

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ClaimError::Validation(errors))
        }
    }
}

/// Length rules of the free-text claim fields
///
/// Kept apart from [`NewClaim`] so the rules can run on a form whose date
/// or flag did not parse.
#[derive(Debug, Validate)]
struct ClaimText {
    #[validate(length(min = 1, max = 64, message = "ensure this value has between 1 and 64 characters"))]
    policy_number: String,

    #[validate(length(min = 1, max = 64, message = "ensure this value has between 1 and 64 characters"))]
    accident_type: String,

    #[validate(length(max = 256, message = "ensure this value has at most 256 characters"))]
    description: String,

    #[validate(length(max = 256, message = "ensure this value has at most 256 characters"))]
    damage_details: String,
}

impl ClaimText {
    fn errors(&self) -> Vec<FieldError> {
        self.validate()
            .err()
            .map(|e| field_errors(&e))
            .unwrap_or_default()
    }
}

/// Text fields of a claim submission, as they arrive in the form
#[derive(Debug, Clone, Default)]
pub struct ClaimForm {
    fields: HashMap<String, String>,
}

impl ClaimForm {
    /// Form fields a submission must carry, in reporting order
    pub const REQUIRED_FIELDS: [&'static str; 6] = [
        "policy_number",
        "date_of_accident",
        "accident_type",
        "description",
        "injuries_reported",
        "damage_details",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Records a text field; a repeated name keeps the first value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// Converts the raw fields into a validated [`NewClaim`]
    ///
    /// Every missing, unparsable or out-of-range field is reported, not just
    /// the first.
    pub fn parse(&self) -> Result<NewClaim, ClaimError> {
        let mut errors = Vec::new();

        for name in Self::REQUIRED_FIELDS {
            if self.get(name).is_none() {
                errors.push(FieldError::missing(name));
            }
        }

        let date_of_accident = self.get("date_of_accident").and_then(|raw| {
            parse_datetime(raw)
                .map_err(|e| errors.push(e))
                .ok()
        });
        let injuries_reported = self.get("injuries_reported").and_then(|raw| {
            parse_bool(raw)
                .map_err(|e| errors.push(FieldError::new("injuries_reported", e)))
                .ok()
        });

        let text = ClaimText {
            policy_number: self.text("policy_number"),
            accident_type: self.text("accident_type"),
            description: self.text("description"),
            damage_details: self.text("damage_details"),
        };
        let length_errors = text.errors();
        // A missing field is already reported once
        errors.extend(
            length_errors
                .into_iter()
                .filter(|e| self.get(&e.field).is_some()),
        );

        match (date_of_accident, injuries_reported) {
            (Some(date_of_accident), Some(injuries_reported)) if errors.is_empty() => Ok(NewClaim {
                policy_number: text.policy_number,
                date_of_accident,
                accident_type: text.accident_type,
                description: text.description,
                injuries_reported,
                damage_details: text.damage_details,
            }),
            _ => Err(ClaimError::Validation(errors)),
        }
    }
}

/// Parses an ISO-8601 timestamp
///
/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date
/// (midnight UTC).
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(FieldError::new("date_of_accident", "invalid datetime format"))
}

/// Parses a form boolean the way HTML forms and JSON clients send them
pub fn parse_bool(raw: &str) -> Result<bool, &'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "t" | "true" | "y" | "yes" => Ok(true),
        "0" | "off" | "f" | "false" | "n" | "no" => Ok(false),
        _ => Err("value could not be parsed to a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        assert_eq!(parse_datetime("2024-03-01T12:30:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-01T14:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-01T12:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-01T12:30:00.000").unwrap(), expected);
        assert_eq!(
            parse_datetime("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        let err = parse_datetime("yesterday").unwrap_err();
        assert_eq!(err.field, "date_of_accident");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("True"), Ok(true));
        assert_eq!(parse_bool("on"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert_eq!(parse_bool("No"), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }
}
