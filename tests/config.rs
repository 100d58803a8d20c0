//! Configuration and catalog loading tests.
mod common;
use common::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;
use tsukuri::config::{DEFAULT_IMAGE_BASE_URL, resolve_image_path};
use tsukuri::error::{CatalogError, ConfigError};
use tsukuri::prelude::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn temp_json(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.image_base_url, DEFAULT_IMAGE_BASE_URL);
        assert_eq!(config.primitives, vec!["Air", "Earth", "Fire", "Water"]);
        assert!(!config.strict);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("TSUKURI_CATALOG", "/srv/elements.json"),
                ("BASE_URL", "http://localhost:8080"),
                ("TSUKURI_PRIMITIVES", " Air, Fire ,,Time "),
                ("TSUKURI_STRICT", "Yes"),
                ("TSUKURI_LOG", "tsukuri=debug"),
            ]))
            .unwrap();

        assert_eq!(config.catalog_path.to_str(), Some("/srv/elements.json"));
        assert_eq!(config.image_base_url, "http://localhost:8080");
        assert_eq!(config.primitives, vec!["Air", "Fire", "Time"]);
        assert!(config.strict);
        assert_eq!(config.log_filter, "tsukuri=debug");
    }

    #[test]
    fn test_missing_keys_leave_config_untouched() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[])).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup(&[("TSUKURI_STRICT", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TSUKURI_STRICT"));

        let err = config
            .apply_overrides(lookup(&[("TSUKURI_PRIMITIVES", " , ,")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TSUKURI_PRIMITIVES"));
    }

    #[test]
    fn test_from_file_fills_missing_fields_with_defaults() {
        let file = temp_json(r#"{"image_base_url": "https://cdn.test/", "strict": true}"#);
        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.image_base_url, "https://cdn.test/");
        assert!(config.strict);
        assert_eq!(config.primitives.len(), 4);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = Config::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let file = temp_json("strict = true");
        let bad = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(bad, ConfigError::Parse(_)));
    }

    #[test]
    fn test_resolve_image_path() {
        let base = "https://img.test/";
        assert_eq!(resolve_image_path(base, ""), "");
        assert_eq!(
            resolve_image_path(base, "../backend/public/fire.svg"),
            "https://img.test/public/fire.svg"
        );
        assert_eq!(
            resolve_image_path(base, "/public/fire.svg"),
            "https://img.test/public/fire.svg"
        );
        assert_eq!(
            resolve_image_path("https://img.test", "public/fire.svg"),
            "https://img.test/public/fire.svg"
        );
        assert_eq!(
            resolve_image_path(base, "http://elsewhere/fire.svg"),
            "http://elsewhere/fire.svg"
        );
    }
}

#[cfg(test)]
mod catalog_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_from_json() {
        let catalog = Catalog::from_json_str(
            r#"[
                {"name": "Fire", "recipes": [], "image_path": "/fire.svg"},
                {"name": "Earth"},
                {"name": "Lava", "recipes": [["Fire", "Earth"]]}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.elements[0].image_path, "/fire.svg");
        assert!(catalog.elements[1].recipes.is_empty());
        assert_eq!(
            catalog.elements[2],
            ElementDefinition::with_recipes("Lava", [("Fire", "Earth")])
        );
    }

    #[test]
    fn test_catalog_from_file() {
        let json = serde_json::to_string(&classic_catalog()).unwrap();
        let file = temp_json(&json);

        let catalog = Catalog::from_file(file.path()).unwrap();
        assert_eq!(catalog, classic_catalog());
    }

    #[test]
    fn test_catalog_errors() {
        assert!(matches!(
            Catalog::from_json_str("{\"name\": "),
            Err(CatalogError::JsonParseError(_))
        ));
        assert!(matches!(
            Catalog::from_json_str(r#"[{"name": "Fire"}, {"name": "  "}]"#),
            Err(CatalogError::ValidationError(_))
        ));
        assert!(matches!(
            Catalog::from_file("/definitely/not/here.json"),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn test_into_catalog_conversions() {
        let from_str = r#"[{"name": "Air"}]"#.into_catalog().unwrap();
        assert_eq!(from_str.len(), 1);

        let from_vec = vec![
            ElementDefinition::primitive("Air"),
            ElementDefinition::primitive("Fire"),
        ]
        .into_catalog()
        .unwrap();
        assert_eq!(from_vec.len(), 2);

        let collected: Catalog = ["Air", "Water"]
            .into_iter()
            .map(ElementDefinition::primitive)
            .collect();
        assert!(!collected.is_empty());
    }

    #[test]
    fn test_builder_accepts_json_catalog() {
        let catalog = r#"[{"name": "Air"}, {"name": "Fire"}, {"name": "Energy", "recipes": [["Fire", "Air"]]}]"#
            .into_catalog()
            .unwrap();
        let graph = GraphBuilder::new(catalog).build().unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.get("Energy").unwrap().tier(), Some(1));
    }

    #[test]
    fn test_builder_resolves_image_paths() {
        let catalog = Catalog::from_elements(vec![
            ElementDefinition::primitive("Fire").image("/public/fire.svg"),
            ElementDefinition::primitive("Air"),
        ]);
        let graph = GraphBuilder::new(catalog)
            .image_base_url("https://img.test/")
            .build()
            .unwrap();

        assert_eq!(
            graph.get("Fire").unwrap().image_path(),
            "https://img.test/public/fire.svg"
        );
        assert_eq!(graph.get("Air").unwrap().image_path(), "");
    }
}
