//! Medication catalog models.

use serde::{Deserialize, Serialize};

/// Approach assigned to custom medications that do not declare one.
pub const DEFAULT_CUSTOM_APPROACH: &str = "Maint.";

/// Therapeutic area a medication belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationCategory {
    WeightManagement,
    Ed,
    PrimaryCare,
    MentalHealth,
    #[default]
    Other,
}

impl MedicationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationCategory::WeightManagement => "weight-management",
            MedicationCategory::Ed => "ed",
            MedicationCategory::PrimaryCare => "primary-care",
            MedicationCategory::MentalHealth => "mental-health",
            MedicationCategory::Other => "other",
        }
    }

    /// Parse from the kebab-case form. Unknown values map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weight-management" => MedicationCategory::WeightManagement,
            "ed" => MedicationCategory::Ed,
            "primary-care" => MedicationCategory::PrimaryCare,
            "mental-health" => MedicationCategory::MentalHealth,
            _ => MedicationCategory::Other,
        }
    }
}

/// A selectable dosage strength.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageOption {
    /// Stored value (e.g., "0.25mg")
    pub value: String,
    /// Display label (e.g., "0.25 mg weekly")
    pub label: String,
}

impl DosageOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A medication definition in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationCatalogEntry {
    /// Unique identifier (slug)
    pub id: String,
    /// Generic/display name
    pub name: String,
    /// Brand name, if any
    pub brand_name: Option<String>,
    pub category: MedicationCategory,
    /// Available dosage strengths
    pub dosage_options: Vec<DosageOption>,
    /// Preferred dosage value; first option is used when absent
    pub default_dosage: Option<String>,
    /// Default frequency label (e.g., "Once weekly")
    pub frequency: String,
    /// Preferred approach; first supported approach is used when absent
    pub default_approach: Option<String>,
    /// Approaches this medication may be prescribed under
    pub supported_approaches: Vec<String>,
    /// Default patient instruction lines
    pub instructions: Vec<String>,
    /// Whether the patient asked for this medication
    pub patient_preference: bool,
}

impl MedicationCatalogEntry {
    /// Create an entry with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: MedicationCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand_name: None,
            category,
            dosage_options: Vec::new(),
            default_dosage: None,
            frequency: String::new(),
            default_approach: None,
            supported_approaches: Vec::new(),
            instructions: Vec::new(),
            patient_preference: false,
        }
    }

    /// Dosage a new selection starts with.
    pub fn initial_dosage(&self) -> Option<String> {
        self.default_dosage
            .clone()
            .or_else(|| self.dosage_options.first().map(|o| o.value.clone()))
    }

    /// Approach a new selection starts with.
    pub fn initial_approach(&self) -> Option<String> {
        self.default_approach
            .clone()
            .or_else(|| self.supported_approaches.first().cloned())
    }

    pub fn supports_approach(&self, approach: &str) -> bool {
        self.supported_approaches.iter().any(|a| a == approach)
    }

    /// Entries without dosage options accept any dosage.
    pub fn accepts_dosage(&self, dosage: &str) -> bool {
        self.dosage_options.is_empty() || self.dosage_options.iter().any(|o| o.value == dosage)
    }

    /// Name with brand in parentheses, for display.
    pub fn display_name(&self) -> String {
        match &self.brand_name {
            Some(brand) => format!("{} ({})", self.name, brand),
            None => self.name.clone(),
        }
    }
}

/// Free-form input for a medication not in the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomMedication {
    /// Explicit id; derived from the name when absent
    pub id: Option<String>,
    pub name: String,
    pub brand_name: Option<String>,
    pub category: Option<MedicationCategory>,
    /// Dosage values; labels mirror the values
    pub dosages: Vec<String>,
    pub frequency: Option<String>,
    pub default_approach: Option<String>,
    pub supported_approaches: Vec<String>,
    pub instructions: Vec<String>,
}

impl CustomMedication {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Convert into a catalog entry under the given id.
    ///
    /// Approaches are always populated so approach validation never sees an
    /// empty list.
    pub fn into_entry(self, id: String) -> MedicationCatalogEntry {
        let mut supported = self.supported_approaches;
        let default_approach = self
            .default_approach
            .or_else(|| supported.first().cloned())
            .unwrap_or_else(|| DEFAULT_CUSTOM_APPROACH.to_string());
        if !supported.contains(&default_approach) {
            supported.insert(0, default_approach.clone());
        }

        MedicationCatalogEntry {
            id,
            name: self.name,
            brand_name: self.brand_name,
            category: self.category.unwrap_or_default(),
            dosage_options: self
                .dosages
                .into_iter()
                .map(|d| DosageOption::new(d.clone(), d))
                .collect(),
            default_dosage: None,
            frequency: self.frequency.unwrap_or_default(),
            default_approach: Some(default_approach),
            supported_approaches: supported,
            instructions: self.instructions,
            patient_preference: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_options() -> MedicationCatalogEntry {
        let mut entry = MedicationCatalogEntry::new("test", "Test Drug", MedicationCategory::Other);
        entry.dosage_options = vec![
            DosageOption::new("A", "A"),
            DosageOption::new("B", "B"),
            DosageOption::new("C", "C"),
        ];
        entry.supported_approaches = vec!["Titration".into(), "Maint.".into()];
        entry
    }

    #[test]
    fn test_initial_dosage_falls_back_to_first_option() {
        let mut entry = entry_with_options();
        assert_eq!(entry.initial_dosage(), Some("A".into()));

        entry.default_dosage = Some("B".into());
        assert_eq!(entry.initial_dosage(), Some("B".into()));
    }

    #[test]
    fn test_initial_approach() {
        let mut entry = entry_with_options();
        assert_eq!(entry.initial_approach(), Some("Titration".into()));

        entry.default_approach = Some("Maint.".into());
        assert_eq!(entry.initial_approach(), Some("Maint.".into()));
    }

    #[test]
    fn test_accepts_dosage() {
        let entry = entry_with_options();
        assert!(entry.accepts_dosage("C"));
        assert!(!entry.accepts_dosage("D"));

        let open = MedicationCatalogEntry::new("x", "X", MedicationCategory::Other);
        assert!(open.accepts_dosage("anything"));
    }

    #[test]
    fn test_category_serde_kebab_case() {
        let json = serde_json::to_string(&MedicationCategory::WeightManagement).unwrap();
        assert_eq!(json, "\"weight-management\"");
        assert_eq!(MedicationCategory::parse("Mental-Health"), MedicationCategory::MentalHealth);
        assert_eq!(MedicationCategory::parse("dermatology"), MedicationCategory::Other);
    }

    #[test]
    fn test_custom_entry_defaults_approach() {
        let entry = CustomMedication::named("Foo").into_entry("foo".into());
        assert_eq!(entry.default_approach.as_deref(), Some(DEFAULT_CUSTOM_APPROACH));
        assert_eq!(entry.supported_approaches, vec![DEFAULT_CUSTOM_APPROACH.to_string()]);
        assert_eq!(entry.category, MedicationCategory::Other);
    }

    #[test]
    fn test_custom_entry_keeps_declared_approaches() {
        let mut custom = CustomMedication::named("Bar");
        custom.supported_approaches = vec!["Titration".into()];
        custom.default_approach = Some("Maint.".into());

        let entry = custom.into_entry("bar".into());
        assert_eq!(entry.default_approach.as_deref(), Some("Maint."));
        assert!(entry.supports_approach("Titration"));
        assert!(entry.supports_approach("Maint."));
    }
}
