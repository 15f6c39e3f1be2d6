//! Per-consultation medication selection models.

use serde::{Deserialize, Serialize};

use super::catalog::{MedicationCatalogEntry, MedicationCategory};

/// Live configuration of a chosen medication.
///
/// A selection exists only while the medication is chosen; deselecting
/// removes it rather than flagging it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationSelection {
    /// Catalog entry id
    pub medication_id: String,
    /// Chosen dosage value
    pub dosage: Option<String>,
    /// Frequency label
    pub frequency: String,
    /// Chosen approach (e.g., "Titration", "Maint.")
    pub approach: Option<String>,
    /// Patient instruction lines, in order
    pub instructions: Vec<String>,
    pub is_patient_preference: bool,
}

impl MedicationSelection {
    /// Seed a selection from the entry's defaults.
    pub fn seeded_from(entry: &MedicationCatalogEntry) -> Self {
        Self {
            medication_id: entry.id.clone(),
            dosage: entry.initial_dosage(),
            frequency: entry.frequency.clone(),
            approach: entry.initial_approach(),
            instructions: entry.instructions.clone(),
            is_patient_preference: entry.patient_preference,
        }
    }

    /// Flatten with catalog metadata into a draft line item.
    pub fn to_line_item(&self, entry: &MedicationCatalogEntry) -> MedicationLineItem {
        MedicationLineItem {
            id: entry.id.clone(),
            name: entry.name.clone(),
            brand_name: entry.brand_name.clone(),
            dosage: self.dosage.clone(),
            frequency: Some(self.frequency.clone()).filter(|f| !f.trim().is_empty()),
            approach: self.approach.clone(),
            instructions: self.instructions.clone(),
            category: entry.category,
            is_patient_preference: self.is_patient_preference,
        }
    }
}

/// A formatted medication line in a consultation draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationLineItem {
    pub id: String,
    pub name: String,
    pub brand_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub approach: Option<String>,
    pub instructions: Vec<String>,
    pub category: MedicationCategory,
    pub is_patient_preference: bool,
}

impl MedicationLineItem {
    /// Lowercased name, brand and id, for pattern matching.
    pub fn match_terms(&self) -> Vec<String> {
        let mut terms = vec![self.name.to_lowercase(), self.id.to_lowercase()];
        if let Some(brand) = &self.brand_name {
            terms.push(brand.to_lowercase());
        }
        terms
    }
}

/// Instructions as entered: either pre-split lines or a single block of text.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionsInput {
    Lines(Vec<String>),
    Text(String),
}

impl InstructionsInput {
    /// Normalize to an ordered list of lines.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            InstructionsInput::Lines(lines) => lines,
            InstructionsInput::Text(text) => text.lines().map(str::to_string).collect(),
        }
    }
}

impl From<Vec<String>> for InstructionsInput {
    fn from(lines: Vec<String>) -> Self {
        InstructionsInput::Lines(lines)
    }
}

impl From<String> for InstructionsInput {
    fn from(text: String) -> Self {
        InstructionsInput::Text(text)
    }
}

impl From<&str> for InstructionsInput {
    fn from(text: &str) -> Self {
        InstructionsInput::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DosageOption;

    #[test]
    fn test_text_instructions_split_on_line_breaks() {
        let lines = InstructionsInput::from("Take with food\r\nAvoid alcohol\nStore cold").into_lines();
        assert_eq!(lines, vec!["Take with food", "Avoid alcohol", "Store cold"]);
    }

    #[test]
    fn test_line_instructions_kept_in_order() {
        let input: InstructionsInput = vec!["b".to_string(), "a".to_string()].into();
        assert_eq!(input.into_lines(), vec!["b", "a"]);
    }

    #[test]
    fn test_blank_frequency_becomes_missing() {
        let mut entry = MedicationCatalogEntry::new("x", "X", MedicationCategory::Other);
        entry.dosage_options = vec![DosageOption::new("1mg", "1 mg")];

        let selection = MedicationSelection::seeded_from(&entry);
        let item = selection.to_line_item(&entry);

        assert_eq!(item.dosage.as_deref(), Some("1mg"));
        assert_eq!(item.frequency, None);
        assert_eq!(item.approach, None);
    }
}
