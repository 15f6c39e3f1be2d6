//! Draft validation and interaction checks.
//!
//! Both gates are pure functions over a [`ConsultationDraft`]; neither looks
//! at the selection engine.

mod interactions;

pub use interactions::*;

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::ConsultationDraft;

/// Field key → message for every rule a draft violates.
///
/// Serializes as a JSON object whose keys keep rule order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<(String, String)>);

impl ValidationErrors {
    fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let key = key.into();
        let message = message.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = message,
            None => self.0.push((key, message)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field keys in rule order.
    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, m)| (k.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, message) in &self.0 {
            map.serialize_entry(key, message)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ValidationErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ErrorsVisitor;

        impl<'de> Visitor<'de> for ErrorsVisitor {
            type Value = ValidationErrors;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field keys to messages")
            }

            fn visit_map<A>(self, mut access: A) -> Result<ValidationErrors, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut errors = ValidationErrors::default();
                while let Some((key, message)) = access.next_entry::<String, String>()? {
                    errors.insert(key, message);
                }
                Ok(errors)
            }
        }

        deserializer.deserialize_map(ErrorsVisitor)
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: ValidationErrors,
}

/// Key for a per-medication attribute error.
pub fn medication_field_key(index: usize, field: &str) -> String {
    format!("medication_{}_{}", index, field)
}

/// Check a draft against the required-field and medication completeness
/// rules. Every rule runs so all violations are reported together.
pub fn validate(draft: &ConsultationDraft) -> ValidationReport {
    let mut errors = ValidationErrors::default();

    if !present(draft.patient_id.as_deref()) {
        errors.insert("patient_id", "Patient is required");
    }
    if !present(draft.provider_id.as_deref()) {
        errors.insert("provider_id", "Provider is required");
    }
    if !present(Some(&draft.notes.hpi)) {
        errors.insert("hpi", "History of present illness is required");
    }
    if draft.medications.is_empty() {
        errors.insert("medications", "At least one medication must be selected");
    }

    for (index, medication) in draft.medications.iter().enumerate() {
        let fields = [
            ("dosage", "Dosage", medication.dosage.as_deref()),
            ("frequency", "Frequency", medication.frequency.as_deref()),
            ("approach", "Approach", medication.approach.as_deref()),
        ];
        for (field, label, value) in fields {
            if !present(value) {
                errors.insert(
                    medication_field_key(index, field),
                    format!("{} is required for {}", label, medication.name),
                );
            }
        }
    }

    if !present(draft.follow_up.as_ref().map(|f| f.period.as_str())) {
        errors.insert("follow_up", "Follow-up period is required");
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
