use thiserror::Error;

/// Errors that can occur while loading an element catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid catalog data: {0}")]
    ValidationError(String),
}

/// Errors that can occur while building the element graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Catalog contains no elements")]
    EmptyCatalog,

    #[error(
        "Tier assignment left {} element(s) unresolved: {}",
        unresolved.len(),
        unresolved.join(", ")
    )]
    ConstructionDefect { unresolved: Vec<String> },
}

/// Errors returned by a recipe-tree search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("No valid recipe tree found for {0}")]
    NoSolution(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cycle detected at element: {0}")]
    CycleDetected(String),
}

/// A solution tree that does not respect the graph's recipes or tiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeDefect {
    #[error("Tree references unknown element '{0}'")]
    UnknownElement(String),

    #[error("Leaf '{0}' is not a base element")]
    NonBaseLeaf(String),

    #[error("'{target}' cannot be made from '{first}' and '{second}'")]
    UnknownRecipe {
        target: String,
        first: String,
        second: String,
    },

    #[error("Ingredient '{ingredient}' (tier {ingredient_tier:?}) is not below '{target}' (tier {target_tier:?})")]
    TierOrder {
        target: String,
        target_tier: Option<u32>,
        ingredient: String,
        ingredient_tier: Option<u32>,
    },
}

/// Errors raised while delivering progress updates. The search itself never sees them.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Update stream is closed")]
    Closed,

    #[error("Failed to write update: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize update: {0}")]
    Serialization(String),
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
