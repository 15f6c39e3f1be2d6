//! Medication interaction checks.
//!
//! Rules are data: each [`InteractionRule`] variant names what it matches and
//! the finding it produces. Matching is case-insensitive substring matching
//! against medication name, brand and id, and against the free-text
//! contraindication notes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::MedicationLineItem;

const PDE5_INHIBITORS: &[&str] = &[
    "sildenafil",
    "tadalafil",
    "vardenafil",
    "avanafil",
    "viagra",
    "cialis",
    "levitra",
];

const GLP1_AGONISTS: &[&str] = &[
    "semaglutide",
    "tirzepatide",
    "liraglutide",
    "dulaglutide",
    "wegovy",
    "ozempic",
    "zepbound",
    "mounjaro",
];

/// Finding severity. Only `High` blocks submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single interaction warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionFinding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
}

/// A table-driven interaction rule.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionRule {
    /// A matching medication combined with a condition mentioned in the
    /// contraindication notes.
    MedicationWithCondition {
        id: &'static str,
        medications: &'static [&'static str],
        conditions: &'static [&'static str],
        severity: Severity,
        message: &'static str,
    },
    /// Two distinct selected medications, one from each pattern list.
    Combination {
        id: &'static str,
        first: &'static [&'static str],
        second: &'static [&'static str],
        severity: Severity,
        message: &'static str,
    },
}

impl InteractionRule {
    /// Evaluate against the selected medications and contraindication notes.
    pub fn evaluate(
        &self,
        medications: &[MedicationLineItem],
        contraindications: &str,
    ) -> Option<InteractionFinding> {
        let (id, severity, message, matched) = match self {
            InteractionRule::MedicationWithCondition {
                id,
                medications: patterns,
                conditions,
                severity,
                message,
            } => {
                let notes = contraindications.to_lowercase();
                let matched = medications.iter().any(|m| matches_any(m, patterns))
                    && conditions.iter().any(|c| notes.contains(c));
                (id, severity, message, matched)
            }
            InteractionRule::Combination {
                id,
                first,
                second,
                severity,
                message,
            } => {
                let matched = medications.iter().enumerate().any(|(i, a)| {
                    matches_any(a, first)
                        && medications
                            .iter()
                            .enumerate()
                            .any(|(j, b)| i != j && matches_any(b, second))
                });
                (id, severity, message, matched)
            }
        };

        matched.then(|| InteractionFinding {
            rule_id: id.to_string(),
            severity: *severity,
            message: message.to_string(),
        })
    }
}

fn matches_any(medication: &MedicationLineItem, patterns: &[&str]) -> bool {
    let terms = medication.match_terms();
    patterns
        .iter()
        .any(|p| terms.iter().any(|t| t.contains(p)))
}

/// The shipped rule set.
pub fn default_rules() -> Vec<InteractionRule> {
    vec![
        InteractionRule::MedicationWithCondition {
            id: "pde5-nitrates",
            medications: PDE5_INHIBITORS,
            conditions: &["nitrate", "nitroglycerin", "isosorbide"],
            severity: Severity::High,
            message: "PDE5 inhibitors are contraindicated with nitrate therapy: \
                      combined use can cause severe, life-threatening hypotension.",
        },
        InteractionRule::MedicationWithCondition {
            id: "pde5-alpha-blockers",
            medications: PDE5_INHIBITORS,
            conditions: &["alpha blocker", "alpha-blocker", "doxazosin", "tamsulosin"],
            severity: Severity::Medium,
            message: "PDE5 inhibitors with alpha blockers may cause symptomatic hypotension. \
                      Start at the lowest dose.",
        },
        InteractionRule::MedicationWithCondition {
            id: "bupropion-maoi",
            medications: &["bupropion", "wellbutrin"],
            conditions: &["maoi", "monoamine oxidase"],
            severity: Severity::High,
            message: "Bupropion is contraindicated within 14 days of MAOI use \
                      due to risk of hypertensive reaction.",
        },
        InteractionRule::Combination {
            id: "duplicate-glp1",
            first: GLP1_AGONISTS,
            second: GLP1_AGONISTS,
            severity: Severity::Medium,
            message: "Multiple GLP-1 receptor agonists selected. Duplicate therapy is not recommended.",
        },
    ]
}

/// Evaluates a rule set against a medication list.
#[derive(Debug, Clone)]
pub struct InteractionChecker {
    rules: Vec<InteractionRule>,
}

impl Default for InteractionChecker {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl InteractionChecker {
    pub fn new(rules: Vec<InteractionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[InteractionRule] {
        &self.rules
    }

    /// Findings in rule order.
    pub fn check(
        &self,
        medications: &[MedicationLineItem],
        contraindications: &str,
    ) -> Vec<InteractionFinding> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(medications, contraindications))
            .collect()
    }
}

/// Check with the default rule set.
pub fn check_interactions(
    medications: &[MedicationLineItem],
    contraindications: &str,
) -> Vec<InteractionFinding> {
    InteractionChecker::default().check(medications, contraindications)
}

/// Whether any finding blocks submission.
pub fn has_blocking(findings: &[InteractionFinding]) -> bool {
    findings.iter().any(|f| f.severity.is_blocking())
}
