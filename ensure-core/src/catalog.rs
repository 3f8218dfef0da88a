//! Resource catalog - the ordered, immutable list of desired resources.

use std::collections::HashSet;

use crate::error::CatalogError;

/// One desired resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition<P> {
    /// Identifier of the resource in the target system.
    pub id: String,
    /// Human-readable description, used only for reporting.
    pub label: String,
    /// Backend-specific creation data.
    pub payload: P,
}

impl<P> ResourceDefinition<P> {
    pub fn new(id: impl Into<String>, label: impl Into<String>, payload: P) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            payload,
        }
    }
}

/// Ordered list of resource definitions.
///
/// Entries cannot be changed once the catalog is built. Duplicate ids are
/// accepted by [`Catalog::new`] and reported by [`Catalog::validate`].
#[derive(Debug, Clone)]
pub struct Catalog<P> {
    entries: Vec<ResourceDefinition<P>>,
}

impl<P> Catalog<P> {
    pub fn new(entries: Vec<ResourceDefinition<P>>) -> Self {
        Self { entries }
    }

    /// Build a catalog, rejecting empty or repeated ids.
    pub fn try_new(entries: Vec<ResourceDefinition<P>>) -> Result<Self, CatalogError> {
        let catalog = Self::new(entries);
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the uniqueness invariant without rejecting the catalog.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for (idx, def) in self.entries.iter().enumerate() {
            if def.id.is_empty() {
                return Err(CatalogError::EmptyId(idx));
            }
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateId(def.id.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceDefinition<P>> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ResourceDefinition<P>> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.id.as_str())
    }
}

impl<'a, P> IntoIterator for &'a Catalog<P> {
    type Item = &'a ResourceDefinition<P>;
    type IntoIter = std::slice::Iter<'a, ResourceDefinition<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str) -> ResourceDefinition<()> {
        ResourceDefinition::new(id, format!("{} label", id), ())
    }

    #[test]
    fn test_validate_accepts_unique_ids() {
        let catalog = Catalog::new(vec![def("bpl_id"), def("bpl_name"), def("barcode")]);
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec!["bpl_id", "bpl_name", "barcode"]
        );
    }

    #[test]
    fn test_new_keeps_duplicates_validate_reports_them() {
        let catalog = Catalog::new(vec![def("a"), def("b"), def("a")]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::DuplicateId("a".to_string()))
        );
    }

    #[test]
    fn test_try_new_rejects_empty_id() {
        let err = Catalog::try_new(vec![def("a"), def("")]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyId(1));
    }

    #[test]
    fn test_get_returns_first_match() {
        let catalog = Catalog::new(vec![
            ResourceDefinition::new("q", "first", 1),
            ResourceDefinition::new("q", "second", 2),
        ]);
        assert_eq!(catalog.get("q").map(|d| d.payload), Some(1));
        assert!(catalog.get("missing").is_none());
    }
}
