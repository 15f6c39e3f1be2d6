//! Medication catalog.
//!
//! A [`Catalog`] is an owned value built once per session by [`build_catalog`].
//! Sessions never share a mutable default; custom medications are appended to
//! the session's own copy.

mod search;
mod seed;

pub use search::*;
pub use seed::*;

use crate::models::{CustomMedication, MedicationCatalogEntry, MedicationCategory};

/// Ordered collection of medication definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<MedicationCatalogEntry>,
}

/// Build a catalog from the built-in seed plus caller overrides.
///
/// An override whose id matches a seed entry replaces it in place; other
/// overrides are appended in the order given.
pub fn build_catalog<I>(overrides: I) -> Catalog
where
    I: IntoIterator<Item = MedicationCatalogEntry>,
{
    let mut catalog = Catalog::from_entries(default_entries());
    for entry in overrides {
        catalog.upsert(entry);
    }
    catalog
}

impl Catalog {
    /// Catalog containing exactly the given entries (later duplicates win).
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MedicationCatalogEntry>,
    {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.upsert(entry);
        }
        catalog
    }

    fn upsert(&mut self, entry: MedicationCatalogEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MedicationCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn entries(&self) -> &[MedicationCatalogEntry] {
        &self.entries
    }

    pub fn by_category(&self, category: MedicationCategory) -> Vec<&MedicationCatalogEntry> {
        self.entries.iter().filter(|e| e.category == category).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a custom medication and return its id.
    ///
    /// The id is the explicit one if given, otherwise the slugified name. An id
    /// already in use gets a numeric suffix so existing entries are never
    /// replaced.
    pub fn insert_custom(&mut self, custom: CustomMedication) -> String {
        let base = custom
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&custom.name));
        let base = if base.is_empty() { "custom".to_string() } else { base };

        let mut id = base.clone();
        let mut suffix = 2;
        while self.contains(&id) {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        self.entries.push(custom.into_entry(id.clone()));
        id
    }
}

/// Lowercase ASCII alphanumerics, other runs collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Foo"), "foo");
        assert_eq!(slugify("Vitamin B12 (injection)"), "vitamin-b12-injection");
        assert_eq!(slugify("  --Leading and trailing--  "), "leading-and-trailing");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_build_catalog_without_overrides_is_seed() {
        let catalog = build_catalog(Vec::new());
        assert_eq!(catalog.len(), default_entries().len());
        assert!(catalog.contains("semaglutide"));
        assert!(catalog.contains("sildenafil"));
    }

    #[test]
    fn test_build_catalog_override_replaces_in_place() {
        let seed_position = default_entries()
            .iter()
            .position(|e| e.id == "semaglutide")
            .unwrap();

        let mut replacement = MedicationCatalogEntry::new(
            "semaglutide",
            "Semaglutide (compounded)",
            MedicationCategory::WeightManagement,
        );
        replacement.frequency = "Once weekly".into();

        let catalog = build_catalog(vec![replacement]);
        assert_eq!(catalog.len(), default_entries().len());
        assert_eq!(catalog.entries()[seed_position].name, "Semaglutide (compounded)");
    }

    #[test]
    fn test_build_catalog_appends_new_entries() {
        let extra = MedicationCatalogEntry::new("naltrexone", "Naltrexone", MedicationCategory::Other);
        let catalog = build_catalog(vec![extra]);

        assert_eq!(catalog.len(), default_entries().len() + 1);
        assert_eq!(catalog.entries().last().unwrap().id, "naltrexone");
    }

    #[test]
    fn test_catalogs_do_not_share_state() {
        let mut first = build_catalog(Vec::new());
        let second = build_catalog(Vec::new());

        first.insert_custom(CustomMedication::named("Foo"));
        assert!(first.contains("foo"));
        assert!(!second.contains("foo"));
    }

    #[test]
    fn test_insert_custom_disambiguates_ids() {
        let mut catalog = Catalog::default();
        assert_eq!(catalog.insert_custom(CustomMedication::named("Foo")), "foo");
        assert_eq!(catalog.insert_custom(CustomMedication::named("foo")), "foo-2");
        assert_eq!(catalog.insert_custom(CustomMedication::named("FOO")), "foo-3");
    }

    #[test]
    fn test_insert_custom_explicit_id() {
        let mut catalog = Catalog::default();
        let mut custom = CustomMedication::named("Something Else");
        custom.id = Some("my-med".into());
        assert_eq!(catalog.insert_custom(custom), "my-med");
    }

    #[test]
    fn test_by_category() {
        let catalog = build_catalog(Vec::new());
        let ed = catalog.by_category(MedicationCategory::Ed);
        assert!(!ed.is_empty());
        assert!(ed.iter().all(|e| e.category == MedicationCategory::Ed));
    }
}
