//! Test Data Builders
//!
//! Builders for claim submissions with sensible defaults, so tests only
//! spell out the fields they are about.

use domain_claims::ClaimForm;

use crate::fixtures::ClaimFixtures;

/// Builder for the text fields of a claim submission
///
/// Produces either ordered `(name, value)` pairs, for multipart requests,
/// or a [`ClaimForm`] for domain tests.
#[derive(Debug, Clone)]
pub struct ClaimFormBuilder {
    fields: Vec<(String, String)>,
}

impl Default for ClaimFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimFormBuilder {
    /// Creates a builder holding a complete, valid submission
    pub fn new() -> Self {
        let claim = ClaimFixtures::new_claim();
        let fields = vec![
            ("policy_number", claim.policy_number),
            ("date_of_accident", claim.date_of_accident.to_rfc3339()),
            ("accident_type", claim.accident_type),
            ("description", claim.description),
            ("injuries_reported", claim.injuries_reported.to_string()),
            ("damage_details", claim.damage_details),
        ];

        Self {
            fields: fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Sets a field, replacing any earlier value
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    /// Drops a field from the submission
    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|(k, _)| k != name);
        self
    }

    pub fn with_policy_number(self, policy_number: impl Into<String>) -> Self {
        self.with("policy_number", policy_number)
    }

    pub fn with_injuries_reported(self, injuries: bool) -> Self {
        self.with("injuries_reported", injuries.to_string())
    }

    /// The fields in submission order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn build(self) -> ClaimForm {
        let mut form = ClaimForm::new();
        for (name, value) in self.fields {
            form.insert(name, value);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form_parses() {
        let claim = ClaimFormBuilder::new().build().parse().unwrap();
        assert_eq!(claim, ClaimFixtures::new_claim());
    }

    #[test]
    fn test_overrides_and_removals() {
        let builder = ClaimFormBuilder::new()
            .with_policy_number("POL-9")
            .with_injuries_reported(true)
            .without("damage_details");

        assert_eq!(builder.fields().len(), 5);

        let form = builder.build();
        assert_eq!(form.get("policy_number"), Some("POL-9"));
        assert_eq!(form.get("injuries_reported"), Some("true"));
        assert!(form.get("damage_details").is_none());
    }
}
