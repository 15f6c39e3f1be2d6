//! Fuzzy catalog lookup for medication pickers.
//!
//! Substring hits on name, brand or id score 1.0; everything else is scored
//! by a blend of Jaro-Winkler and normalized Levenshtein similarity.

use strsim::{jaro_winkler, normalized_levenshtein};

use super::Catalog;
use crate::models::MedicationCatalogEntry;

/// Minimum score to be returned from a search.
const MIN_SEARCH_SCORE: f64 = 0.55;

/// A catalog entry with its match score.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch<'a> {
    pub entry: &'a MedicationCatalogEntry,
    /// Match quality (0.0 - 1.0)
    pub score: f64,
}

impl Catalog {
    /// Search entries by name, brand or id, best match first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<CatalogMatch<'_>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<CatalogMatch<'_>> = self
            .entries()
            .iter()
            .map(|entry| CatalogMatch {
                entry,
                score: score_entry(entry, &query),
            })
            .filter(|m| m.score >= MIN_SEARCH_SCORE)
            .collect();

        // Stable sort keeps catalog order among equal scores
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        matches
    }
}

fn score_entry(entry: &MedicationCatalogEntry, query: &str) -> f64 {
    let mut terms = vec![entry.name.to_lowercase(), entry.id.to_lowercase()];
    if let Some(brand) = &entry.brand_name {
        terms.push(brand.to_lowercase());
    }

    if terms.iter().any(|t| t.contains(query)) {
        return 1.0;
    }

    terms
        .iter()
        .map(|t| fuzzy_match(query, t))
        .fold(0.0, f64::max)
}

/// Jaro-Winkler favours shared prefixes, which suits typed-ahead input.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

#[cfg(test)]
mod tests {
    use crate::catalog::build_catalog;

    #[test]
    fn test_search_by_brand() {
        let catalog = build_catalog(Vec::new());
        let results = catalog.search("wegovy", 5);
        assert_eq!(results[0].entry.id, "semaglutide");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_search_tolerates_typos() {
        let catalog = build_catalog(Vec::new());
        let results = catalog.search("sildenafill", 3);
        assert!(!results.is_empty());
        assert_eq!(results[0].entry.id, "sildenafil");
    }

    #[test]
    fn test_search_respects_limit_and_empty_query() {
        let catalog = build_catalog(Vec::new());
        assert!(catalog.search("   ", 5).is_empty());
        assert!(catalog.search("a", 2).len() <= 2);
    }

    #[test]
    fn test_search_no_match() {
        let catalog = build_catalog(Vec::new());
        assert!(catalog.search("zzzzqqq", 5).is_empty());
    }
}
