//! Selection engine properties and seeding cases.

use consult_orders_core::models::{CustomMedication, DEFAULT_CUSTOM_APPROACH};
use consult_orders_core::validation::validate;
use consult_orders_core::{build_catalog, DraftAssembler, SelectionEngine};
use proptest::prelude::*;

const SEED_IDS: &[&str] = &[
    "semaglutide",
    "tirzepatide",
    "metformin",
    "sildenafil",
    "tadalafil",
    "lisinopril",
    "atorvastatin",
    "sertraline",
    "bupropion",
];

/// Expected defaults for a freshly selected seed medication.
struct SeedCase {
    id: &'static str,
    dosage: &'static str,
    frequency: &'static str,
    approach: &'static str,
}

fn seed_cases() -> Vec<SeedCase> {
    vec![
        SeedCase {
            id: "semaglutide",
            dosage: "0.25mg",
            frequency: "Once weekly",
            approach: "Titration",
        },
        SeedCase {
            id: "metformin",
            dosage: "500mg",
            frequency: "Twice daily",
            approach: "Maint.",
        },
        SeedCase {
            id: "sildenafil",
            dosage: "50mg",
            frequency: "As needed",
            approach: "As needed",
        },
        SeedCase {
            id: "lisinopril",
            dosage: "10mg",
            frequency: "Once daily",
            approach: "Maint.",
        },
    ]
}

#[test]
fn test_seed_cases() {
    for case in seed_cases() {
        let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
        assert!(engine.toggle(case.id), "[{}] toggle should select", case.id);

        let line = &engine.formatted_selections()[0];
        assert_eq!(line.dosage.as_deref(), Some(case.dosage), "[{}] dosage", case.id);
        assert_eq!(line.frequency.as_deref(), Some(case.frequency), "[{}] frequency", case.id);
        assert_eq!(line.approach.as_deref(), Some(case.approach), "[{}] approach", case.id);
    }
}

#[test]
fn test_default_selection_passes_medication_validation() {
    let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
    for id in SEED_IDS {
        engine.toggle(id);
    }

    let draft = DraftAssembler::new()
        .patient("patient-1")
        .provider("provider-1")
        .notes(consult_orders_core::models::ClinicalNotes {
            hpi: "Annual review".into(),
            ..Default::default()
        })
        .follow_up("6w", "", None)
        .assemble(&engine);

    let report = validate(&draft);
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
}

#[test]
fn test_custom_medication_is_selected_with_maintenance_approach() {
    let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
    let id = engine.add_custom_medication(CustomMedication {
        dosages: vec!["10 units".into()],
        frequency: Some("Nightly".into()),
        ..CustomMedication::named("Compounded Cream")
    });

    assert_eq!(id, "compounded-cream");
    assert!(engine.is_selected(&id));
    let config = engine.config_of(&id).unwrap();
    assert_eq!(config.approach.as_deref(), Some(DEFAULT_CUSTOM_APPROACH));
    assert_eq!(config.dosage.as_deref(), Some("10 units"));
    assert!(!engine.set_approach(&id, "Titration"));
}

#[test]
fn test_catalog_edits_do_not_leak_between_sessions() {
    let mut first = SelectionEngine::new(build_catalog(Vec::new()));
    first.add_custom_medication(CustomMedication::named("Only Here"));

    let second = SelectionEngine::new(build_catalog(Vec::new()));
    assert!(first.catalog().contains("only-here"));
    assert!(!second.catalog().contains("only-here"));
}

proptest! {
    /// Toggling the same medication twice leaves the selection unchanged,
    /// whatever happened before.
    #[test]
    fn toggle_twice_is_identity(
        setup in proptest::collection::vec(0..SEED_IDS.len(), 0..8),
        target in 0..SEED_IDS.len(),
    ) {
        let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
        for i in setup {
            engine.toggle(SEED_IDS[i]);
        }
        let before = engine.formatted_selections();
        let was_selected = engine.is_selected(SEED_IDS[target]);

        let now_selected = engine.toggle(SEED_IDS[target]);
        prop_assert_eq!(now_selected, !was_selected);
        engine.toggle(SEED_IDS[target]);

        let after = engine.formatted_selections();
        if was_selected {
            // Re-selecting moves the entry to the end and re-seeds defaults
            prop_assert_eq!(before.len(), after.len());
            prop_assert!(after.iter().any(|m| m.id == SEED_IDS[target]));
        } else {
            prop_assert_eq!(before, after);
        }
    }

    /// Dosage edits only ever store one of the entry's options.
    #[test]
    fn dosage_always_from_options(target in 0..SEED_IDS.len(), dosage in "[0-9]{1,3}(\\.[0-9])?mg") {
        let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
        let id = SEED_IDS[target];
        engine.toggle(id);
        engine.set_dosage(id, &dosage);

        let entry = engine.catalog().get(id).unwrap();
        let stored = engine.config_of(id).unwrap().dosage.clone().unwrap();
        prop_assert!(entry.dosage_options.iter().any(|o| o.value == stored));
    }
}
