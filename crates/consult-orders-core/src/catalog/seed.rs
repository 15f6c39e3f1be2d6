//! Built-in medication definitions.

use crate::models::{DosageOption, MedicationCatalogEntry, MedicationCategory};

struct Seed {
    id: &'static str,
    name: &'static str,
    brand: Option<&'static str>,
    category: MedicationCategory,
    dosages: &'static [(&'static str, &'static str)],
    default_dosage: Option<&'static str>,
    frequency: &'static str,
    approaches: &'static [&'static str],
    default_approach: Option<&'static str>,
    instructions: &'static [&'static str],
}

const SEEDS: &[Seed] = &[
    // Weight management
    Seed {
        id: "semaglutide",
        name: "Semaglutide",
        brand: Some("Wegovy"),
        category: MedicationCategory::WeightManagement,
        dosages: &[
            ("0.25mg", "0.25 mg"),
            ("0.5mg", "0.5 mg"),
            ("1mg", "1 mg"),
            ("1.7mg", "1.7 mg"),
            ("2.4mg", "2.4 mg"),
        ],
        default_dosage: None,
        frequency: "Once weekly",
        approaches: &["Titration", "Maint."],
        default_approach: Some("Titration"),
        instructions: &[
            "Inject subcutaneously once weekly on the same day each week",
            "Rotate injection sites between abdomen, thigh and upper arm",
            "Report persistent nausea, vomiting or abdominal pain",
        ],
    },
    Seed {
        id: "tirzepatide",
        name: "Tirzepatide",
        brand: Some("Zepbound"),
        category: MedicationCategory::WeightManagement,
        dosages: &[
            ("2.5mg", "2.5 mg"),
            ("5mg", "5 mg"),
            ("7.5mg", "7.5 mg"),
            ("10mg", "10 mg"),
            ("12.5mg", "12.5 mg"),
            ("15mg", "15 mg"),
        ],
        default_dosage: None,
        frequency: "Once weekly",
        approaches: &["Titration", "Maint."],
        default_approach: Some("Titration"),
        instructions: &[
            "Inject subcutaneously once weekly",
            "Increase dose no sooner than every 4 weeks",
        ],
    },
    Seed {
        id: "metformin",
        name: "Metformin",
        brand: Some("Glucophage"),
        category: MedicationCategory::WeightManagement,
        dosages: &[("500mg", "500 mg"), ("850mg", "850 mg"), ("1000mg", "1000 mg")],
        default_dosage: Some("500mg"),
        frequency: "Twice daily",
        approaches: &["Titration", "Maint."],
        default_approach: Some("Maint."),
        instructions: &["Take with meals to reduce stomach upset"],
    },
    // ED
    Seed {
        id: "sildenafil",
        name: "Sildenafil",
        brand: Some("Viagra"),
        category: MedicationCategory::Ed,
        dosages: &[("25mg", "25 mg"), ("50mg", "50 mg"), ("100mg", "100 mg")],
        default_dosage: Some("50mg"),
        frequency: "As needed",
        approaches: &["As needed", "Daily"],
        default_approach: None,
        instructions: &[
            "Take 30-60 minutes before sexual activity",
            "Do not take more than once in 24 hours",
        ],
    },
    Seed {
        id: "tadalafil",
        name: "Tadalafil",
        brand: Some("Cialis"),
        category: MedicationCategory::Ed,
        dosages: &[
            ("2.5mg", "2.5 mg"),
            ("5mg", "5 mg"),
            ("10mg", "10 mg"),
            ("20mg", "20 mg"),
        ],
        default_dosage: None,
        frequency: "Once daily",
        approaches: &["Daily", "As needed"],
        default_approach: None,
        instructions: &["Take at the same time each day for daily use"],
    },
    // Primary care
    Seed {
        id: "lisinopril",
        name: "Lisinopril",
        brand: Some("Zestril"),
        category: MedicationCategory::PrimaryCare,
        dosages: &[("5mg", "5 mg"), ("10mg", "10 mg"), ("20mg", "20 mg")],
        default_dosage: Some("10mg"),
        frequency: "Once daily",
        approaches: &["Maint."],
        default_approach: None,
        instructions: &["Check blood pressure regularly", "Report persistent dry cough"],
    },
    Seed {
        id: "atorvastatin",
        name: "Atorvastatin",
        brand: Some("Lipitor"),
        category: MedicationCategory::PrimaryCare,
        dosages: &[("10mg", "10 mg"), ("20mg", "20 mg"), ("40mg", "40 mg")],
        default_dosage: None,
        frequency: "Once daily",
        approaches: &["Maint."],
        default_approach: None,
        instructions: &["Take in the evening", "Report unexplained muscle pain"],
    },
    // Mental health
    Seed {
        id: "sertraline",
        name: "Sertraline",
        brand: Some("Zoloft"),
        category: MedicationCategory::MentalHealth,
        dosages: &[("25mg", "25 mg"), ("50mg", "50 mg"), ("100mg", "100 mg")],
        default_dosage: None,
        frequency: "Once daily",
        approaches: &["Titration", "Maint."],
        default_approach: Some("Titration"),
        instructions: &[
            "Take at the same time each day",
            "It may take 4-6 weeks to feel the full effect",
        ],
    },
    Seed {
        id: "bupropion",
        name: "Bupropion XL",
        brand: Some("Wellbutrin"),
        category: MedicationCategory::MentalHealth,
        dosages: &[("150mg", "150 mg"), ("300mg", "300 mg")],
        default_dosage: None,
        frequency: "Once daily in the morning",
        approaches: &["Titration", "Maint."],
        default_approach: Some("Titration"),
        instructions: &["Do not crush or chew", "Avoid alcohol"],
    },
];

/// The built-in catalog entries, in display order.
pub fn default_entries() -> Vec<MedicationCatalogEntry> {
    SEEDS.iter().map(to_entry).collect()
}

fn to_entry(seed: &Seed) -> MedicationCatalogEntry {
    MedicationCatalogEntry {
        id: seed.id.to_string(),
        name: seed.name.to_string(),
        brand_name: seed.brand.map(str::to_string),
        category: seed.category,
        dosage_options: seed
            .dosages
            .iter()
            .map(|(value, label)| DosageOption::new(*value, *label))
            .collect(),
        default_dosage: seed.default_dosage.map(str::to_string),
        frequency: seed.frequency.to_string(),
        default_approach: seed.default_approach.map(str::to_string),
        supported_approaches: seed.approaches.iter().map(|a| a.to_string()).collect(),
        instructions: seed.instructions.iter().map(|i| i.to_string()).collect(),
        patient_preference: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_unique() {
        let entries = default_entries();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate seed id {}", a.id);
            }
        }
    }

    #[test]
    fn test_seed_defaults_are_consistent() {
        for entry in default_entries() {
            assert!(!entry.supported_approaches.is_empty(), "{} has no approaches", entry.id);
            if let Some(dosage) = &entry.default_dosage {
                assert!(entry.accepts_dosage(dosage), "{} default dosage invalid", entry.id);
            }
            if let Some(approach) = &entry.default_approach {
                assert!(entry.supports_approach(approach), "{} default approach invalid", entry.id);
            }
        }
    }
}
