//! Resource Registry - Load resource descriptors from JSON
//!
//! The nine catalogue resources are declared in `src/resources/catalog.json`,
//! embedded at compile time and validated once on first access.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error as ThisError;

/// Embedded catalogue (compiled into the binary)
const CATALOG_JSON: &str = include_str!("../resources/catalog.json");

/// Placeholder substituted with the record id in update/remove templates
pub const ID_PLACEHOLDER: &str = "{id}";

/// Color definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColorDef {
    pub value: String,
    pub color: [u8; 3],
}

/// Endpoint templates of a resource
#[derive(Debug, Clone, Deserialize)]
pub struct PathsDef {
    pub list: String,
    pub create: String,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub remove: Option<String>,
}

/// How a table cell turns a row value into text
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellRender {
    #[default]
    Plain,
    /// Truthy -> "Yes", otherwise "No"
    YesNo,
    /// Foreign key resolved through a lookup list
    Lookup {
        lookup: String,
        label_fields: Vec<String>,
    },
    /// Image URL shown as a marker, optionally followed by a title field
    Media {
        #[serde(default)]
        title_field: Option<String>,
    },
}

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub key: String,
    pub header: String,
    pub width: u16,
    #[serde(default)]
    pub render: CellRender,
    #[serde(default)]
    pub color_map: Option<String>,
}

/// Auxiliary list fetched next to the main list (join tables)
#[derive(Debug, Clone, Deserialize)]
pub struct LookupDef {
    pub key: String,
    pub path: String,
}

/// Form field kind and its kind-specific settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Toggle,
    Select {
        lookup: String,
        label_fields: Vec<String>,
    },
    Slug {
        source: String,
    },
}

/// Form field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Value used by a fresh form and when a row lacks the field
    #[serde(default)]
    pub empty: Option<serde_json::Value>,
}

/// Resource descriptor from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub key: String,
    pub label: String,
    pub paths: PathsDef,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub search_keys: Vec<String>,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub lookups: Vec<LookupDef>,
    /// Fallback chain for the human title of a row, `id` comes last
    #[serde(default)]
    pub title_fields: Vec<String>,
    pub fields: Vec<FieldDef>,
}

impl ResourceDef {
    pub fn can_edit(&self) -> bool {
        self.paths.update.is_some()
    }

    pub fn can_delete(&self) -> bool {
        self.paths.remove.is_some()
    }

    /// Endpoint of a single record, `None` when the resource has no update path
    pub fn update_path(&self, id: &str) -> Option<String> {
        self.paths.update.as_deref().map(|t| expand_id(t, id))
    }

    pub fn remove_path(&self, id: &str) -> Option<String> {
        self.paths.remove.as_deref().map(|t| expand_id(t, id))
    }

    /// Verbs available for this resource, shown in the header
    pub fn capability_hint(&self) -> &'static str {
        match (self.can_edit(), self.can_delete()) {
            (true, _) => "GET / POST / PATCH / DELETE",
            (false, true) => "GET / POST / DELETE",
            (false, false) => "GET / POST",
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required_fields.iter().any(|r| r == name)
    }

    fn check_consistency(&self) -> Result<(), CatalogError> {
        if self.paths.list.trim().is_empty() {
            return Err(CatalogError::MissingPath {
                resource: self.key.clone(),
                path: "list",
            });
        }
        if self.paths.create.trim().is_empty() {
            return Err(CatalogError::MissingPath {
                resource: self.key.clone(),
                path: "create",
            });
        }
        if self.paths.update.is_some() && self.paths.remove.is_none() {
            return Err(CatalogError::UpdateWithoutRemove(self.key.clone()));
        }
        for template in [&self.paths.update, &self.paths.remove].into_iter().flatten() {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(CatalogError::MissingIdPlaceholder {
                    resource: self.key.clone(),
                    template: template.clone(),
                });
            }
        }

        let declared: HashSet<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        let check = |name: &str, role: &'static str, allow_id: bool| {
            if declared.contains(name) || (allow_id && name == "id") {
                Ok(())
            } else {
                Err(CatalogError::UnknownField {
                    resource: self.key.clone(),
                    field: name.to_string(),
                    role,
                })
            }
        };
        for name in &self.required_fields {
            check(name.as_str(), "required field", false)?;
        }
        for name in &self.search_keys {
            check(name.as_str(), "search key", true)?;
        }
        for name in &self.title_fields {
            check(name.as_str(), "title field", true)?;
        }
        for field in &self.fields {
            if let FieldKind::Slug { source } = &field.kind {
                check(source.as_str(), "slug source", false)?;
            }
        }

        let lookups: HashSet<&str> = self.lookups.iter().map(|l| l.key.as_str()).collect();
        let referenced = self
            .columns
            .iter()
            .filter_map(|c| match &c.render {
                CellRender::Lookup { lookup, .. } => Some(lookup),
                _ => None,
            })
            .chain(self.fields.iter().filter_map(|f| match &f.kind {
                FieldKind::Select { lookup, .. } => Some(lookup),
                _ => None,
            }));
        for lookup in referenced {
            if !lookups.contains(lookup.as_str()) {
                return Err(CatalogError::UnknownLookup {
                    resource: self.key.clone(),
                    lookup: lookup.clone(),
                });
            }
        }
        Ok(())
    }
}

fn expand_id(template: &str, id: &str) -> String {
    template.replace(ID_PLACEHOLDER, &urlencoding::encode(id))
}

/// Problems found while loading a catalogue
#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("catalogue is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate resource key '{0}'")]
    DuplicateKey(String),
    #[error("resource '{resource}' has an empty {path} path")]
    MissingPath {
        resource: String,
        path: &'static str,
    },
    #[error("resource '{0}' declares an update path without a remove path")]
    UpdateWithoutRemove(String),
    #[error("resource '{resource}': template '{template}' has no {{id}} placeholder")]
    MissingIdPlaceholder { resource: String, template: String },
    #[error("resource '{resource}': {role} '{field}' is not a declared field")]
    UnknownField {
        resource: String,
        field: String,
        role: &'static str,
    },
    #[error("resource '{resource}': lookup '{lookup}' is not declared")]
    UnknownLookup { resource: String, lookup: String },
}

/// Root structure of resources/catalog.json
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub color_maps: HashMap<String, Vec<ColorDef>>,
    /// Tab order follows declaration order
    pub resources: Vec<ResourceDef>,
}

impl Catalog {
    /// Parse and validate a catalogue document
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(content)?;
        let mut seen = HashSet::new();
        for resource in &catalog.resources {
            if !seen.insert(resource.key.as_str()) {
                return Err(CatalogError::DuplicateKey(resource.key.clone()));
            }
            resource.check_consistency()?;
        }
        Ok(catalog)
    }
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<Catalog> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static Catalog {
    REGISTRY.get_or_init(|| {
        Catalog::parse(CATALOG_JSON)
            .unwrap_or_else(|e| panic!("Failed to load embedded resource catalogue: {}", e))
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.iter().find(|r| r.key == key)
}

/// Get all resource keys in tab order (for autocomplete and tab bar)
pub fn get_all_resource_keys() -> Vec<&'static str> {
    get_registry()
        .resources
        .iter()
        .map(|r| r.key.as_str())
        .collect()
}

/// Get a color map by name
pub fn get_color_map(name: &str) -> Option<&'static Vec<ColorDef>> {
    get_registry().color_maps.get(name)
}

/// Get color for a value based on color map name
pub fn get_color_for_value(color_map_name: &str, value: &str) -> Option<[u8; 3]> {
    get_color_map(color_map_name)?
        .iter()
        .find(|c| c.value == value)
        .map(|c| c.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_all_nine_resources_in_order() {
        let keys = get_all_resource_keys();
        assert_eq!(
            keys,
            vec![
                "actor",
                "category",
                "director",
                "genre",
                "movie",
                "movie_actor",
                "movie_category",
                "movie_director",
                "movie_genre",
            ]
        );
    }

    #[test]
    fn test_actor_resource_shape() {
        let actor = get_resource("actor").unwrap();
        assert_eq!(actor.label, "Actors");
        assert_eq!(actor.paths.list, "/actor");
        assert_eq!(actor.required_fields, vec!["full_name"]);
        assert!(actor.can_edit());
        assert_eq!(actor.capability_hint(), "GET / POST / PATCH / DELETE");
    }

    #[test]
    fn test_join_tables_declare_lookups() {
        let movie_actor = get_resource("movie_actor").unwrap();
        let keys: Vec<_> = movie_actor.lookups.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["movies", "actors"]);
        assert!(get_resource("movie_director").unwrap().lookups.is_empty());
    }

    #[test]
    fn test_id_is_percent_encoded_in_templates() {
        let genre = get_resource("genre").unwrap();
        assert_eq!(genre.update_path("a b/c").unwrap(), "/genre/a%20b%2Fc");
        assert_eq!(genre.remove_path("42").unwrap(), "/genre/42");
    }

    #[test]
    fn test_active_color_map_exists() {
        assert_eq!(get_color_for_value("active", "Yes"), Some([80, 200, 120]));
        assert!(get_color_for_value("active", "Maybe").is_none());
    }

    #[test]
    fn test_update_without_remove_is_rejected() {
        let json = r#"{"resources":[{"key":"x","label":"X",
            "paths":{"list":"/x","create":"/x","update":"/x/{id}"},
            "columns":[],"fields":[]}]}"#;
        assert!(matches!(
            Catalog::parse(json),
            Err(CatalogError::UpdateWithoutRemove(k)) if k == "x"
        ));
    }

    #[test]
    fn test_remove_without_update_is_accepted() {
        let json = r#"{"resources":[{"key":"x","label":"X",
            "paths":{"list":"/x","create":"/x","remove":"/x/{id}"},
            "columns":[],"fields":[]}]}"#;
        let catalog = Catalog::parse(json).unwrap();
        let x = &catalog.resources[0];
        assert!(!x.can_edit());
        assert!(x.can_delete());
        assert_eq!(x.capability_hint(), "GET / POST / DELETE");
    }

    #[test]
    fn test_unknown_required_field_is_rejected() {
        let json = r#"{"resources":[{"key":"x","label":"X",
            "paths":{"list":"/x","create":"/x"},
            "required_fields":["name"],
            "columns":[],"fields":[]}]}"#;
        assert!(matches!(
            Catalog::parse(json),
            Err(CatalogError::UnknownField { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_undeclared_lookup_is_rejected() {
        let json = r#"{"resources":[{"key":"x","label":"X",
            "paths":{"list":"/x","create":"/x"},
            "columns":[{"key":"a_id","header":"A","width":10,
                "render":{"kind":"lookup","lookup":"as","label_fields":["name"]}}],
            "fields":[]}]}"#;
        assert!(matches!(
            Catalog::parse(json),
            Err(CatalogError::UnknownLookup { lookup, .. }) if lookup == "as"
        ));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let json = r#"{"resources":[
            {"key":"x","label":"X","paths":{"list":"/x","create":"/x"},"columns":[],"fields":[]},
            {"key":"x","label":"Y","paths":{"list":"/y","create":"/y"},"columns":[],"fields":[]}]}"#;
        assert!(matches!(Catalog::parse(json), Err(CatalogError::DuplicateKey(_))));
    }
}
