use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single element as it appears in a catalog file.
///
/// An empty `recipes` list marks the element as a primitive before tiering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub name: String,
    #[serde(default)]
    pub recipes: Vec<Vec<String>>,
    #[serde(default)]
    pub image_path: String,
}

impl ElementDefinition {
    /// Creates a primitive element with no recipes.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recipes: Vec::new(),
            image_path: String::new(),
        }
    }

    /// Creates an element produced by the given ingredient pairs.
    pub fn with_recipes<I, A, B>(name: impl Into<String>, recipes: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            name: name.into(),
            recipes: recipes
                .into_iter()
                .map(|(a, b)| vec![a.into(), b.into()])
                .collect(),
            image_path: String::new(),
        }
    }

    pub fn image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = image_path.into();
        self
    }
}

/// The complete list of elements a graph is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub elements: Vec<ElementDefinition>,
}

impl Catalog {
    pub fn from_elements(elements: Vec<ElementDefinition>) -> Self {
        Self { elements }
    }

    /// Parses a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| CatalogError::JsonParseError(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementDefinition> {
        self.elements.iter()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if let Some(position) = self.elements.iter().position(|e| e.name.trim().is_empty()) {
            return Err(CatalogError::ValidationError(format!(
                "element at index {} has an empty name",
                position
            )));
        }
        Ok(())
    }
}

impl FromIterator<ElementDefinition> for Catalog {
    fn from_iter<T: IntoIterator<Item = ElementDefinition>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
