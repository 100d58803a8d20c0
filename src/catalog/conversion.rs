use super::definition::{Catalog, ElementDefinition};
use crate::error::CatalogError;

/// A trait for custom data models that can be converted into a tsukuri `Catalog`.
///
/// Scrapers and wikis describe elements in many shapes. Implementing this trait on your
/// own structs provides the translation layer into the canonical catalog the graph
/// builder consumes.
///
/// # Example
///
/// ```rust,no_run
/// use tsukuri::catalog::{Catalog, ElementDefinition, IntoCatalog};
/// use tsukuri::error::CatalogError;
///
/// struct WikiRow { element: String, combos: Vec<(String, String)> }
/// struct WikiDump { rows: Vec<WikiRow> }
///
/// impl IntoCatalog for WikiDump {
///     fn into_catalog(self) -> Result<Catalog, CatalogError> {
///         Ok(self
///             .rows
///             .into_iter()
///             .map(|row| ElementDefinition::with_recipes(row.element, row.combos))
///             .collect())
///     }
/// }
/// ```
pub trait IntoCatalog {
    /// Consumes the object and converts it into a catalog.
    fn into_catalog(self) -> Result<Catalog, CatalogError>;
}

impl IntoCatalog for Catalog {
    fn into_catalog(self) -> Result<Catalog, CatalogError> {
        Ok(self)
    }
}

impl IntoCatalog for Vec<ElementDefinition> {
    fn into_catalog(self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::from_elements(self))
    }
}

impl IntoCatalog for &str {
    fn into_catalog(self) -> Result<Catalog, CatalogError> {
        Catalog::from_json_str(self)
    }
}
