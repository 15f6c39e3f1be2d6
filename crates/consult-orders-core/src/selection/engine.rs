//! Per-consultation medication selection state.

use crate::catalog::Catalog;
use crate::models::{
    CustomMedication, InstructionsInput, MedicationLineItem, MedicationSelection,
};

/// Tracks which catalog medications are chosen and how each is configured.
///
/// Selections are kept in the order they were made. Edits to a medication
/// that is not selected are ignored; invalid values are logged and dropped.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    catalog: Catalog,
    selections: Vec<MedicationSelection>,
}

impl SelectionEngine {
    /// Create an engine over a session catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selections: Vec::new(),
        }
    }

    /// The session catalog, including custom entries.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Select or deselect a medication. Returns whether it is now selected.
    pub fn toggle(&mut self, medication_id: &str) -> bool {
        if let Some(pos) = self.position(medication_id) {
            self.selections.remove(pos);
            tracing::debug!(medication_id, "medication deselected");
            return false;
        }

        let Some(entry) = self.catalog.get(medication_id) else {
            tracing::warn!(medication_id, "toggle ignored: medication not in catalog");
            return false;
        };

        self.selections.push(MedicationSelection::seeded_from(entry));
        tracing::debug!(medication_id, "medication selected");
        true
    }

    /// Set the dosage. Values outside the entry's options are rejected.
    pub fn set_dosage(&mut self, medication_id: &str, dosage: &str) -> bool {
        let Some(entry) = self.catalog.get(medication_id) else {
            return false;
        };
        if !entry.accepts_dosage(dosage) {
            if self.is_selected(medication_id) {
                tracing::warn!(medication_id, dosage, "dosage rejected: not a listed option");
            }
            return false;
        }

        match self.selection_mut(medication_id) {
            Some(selection) => {
                selection.dosage = Some(dosage.to_string());
                true
            }
            None => false,
        }
    }

    /// Set the frequency label.
    pub fn set_frequency(&mut self, medication_id: &str, frequency: &str) -> bool {
        match self.selection_mut(medication_id) {
            Some(selection) => {
                selection.frequency = frequency.to_string();
                true
            }
            None => false,
        }
    }

    /// Set the approach. Values the entry does not support are rejected.
    pub fn set_approach(&mut self, medication_id: &str, approach: &str) -> bool {
        if !self.is_selected(medication_id) {
            return false;
        }
        let supported = self
            .catalog
            .get(medication_id)
            .is_some_and(|entry| entry.supports_approach(approach));
        if !supported {
            tracing::warn!(medication_id, approach, "approach rejected: not supported");
            return false;
        }

        match self.selection_mut(medication_id) {
            Some(selection) => {
                selection.approach = Some(approach.to_string());
                true
            }
            None => false,
        }
    }

    /// Replace the instructions with a list of lines or a block of text.
    pub fn set_instructions(
        &mut self,
        medication_id: &str,
        instructions: impl Into<InstructionsInput>,
    ) -> bool {
        match self.selection_mut(medication_id) {
            Some(selection) => {
                selection.instructions = instructions.into().into_lines();
                true
            }
            None => false,
        }
    }

    /// Mark whether the patient asked for this medication.
    pub fn set_patient_preference(&mut self, medication_id: &str, preferred: bool) -> bool {
        match self.selection_mut(medication_id) {
            Some(selection) => {
                selection.is_patient_preference = preferred;
                true
            }
            None => false,
        }
    }

    /// Add a medication that is not in the catalog and select it.
    pub fn add_custom_medication(&mut self, custom: CustomMedication) -> String {
        let id = self.catalog.insert_custom(custom);
        tracing::info!(medication_id = %id, "custom medication added");
        self.toggle(&id);
        id
    }

    /// Selected medications flattened with catalog metadata, in selection order.
    pub fn formatted_selections(&self) -> Vec<MedicationLineItem> {
        self.selections
            .iter()
            .filter_map(|selection| {
                self.catalog
                    .get(&selection.medication_id)
                    .map(|entry| selection.to_line_item(entry))
            })
            .collect()
    }

    pub fn is_selected(&self, medication_id: &str) -> bool {
        self.position(medication_id).is_some()
    }

    /// Current configuration of a selected medication.
    pub fn config_of(&self, medication_id: &str) -> Option<&MedicationSelection> {
        self.selections.iter().find(|s| s.medication_id == medication_id)
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.selections.iter().map(|s| s.medication_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Deselect everything. Custom catalog entries are kept.
    pub fn clear(&mut self) {
        self.selections.clear();
    }

    fn position(&self, medication_id: &str) -> Option<usize> {
        self.selections.iter().position(|s| s.medication_id == medication_id)
    }

    fn selection_mut(&mut self, medication_id: &str) -> Option<&mut MedicationSelection> {
        self.selections.iter_mut().find(|s| s.medication_id == medication_id)
    }
}
