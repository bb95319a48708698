//! Engine configuration: the attribute list plus query-building settings.

use std::{collections::BTreeSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::attribute_config::FacetConfigEntry;
use crate::error::{Error, Result};
use crate::facet_config::{self, CompiledFacetConfig};
use crate::search_const::{DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_FACET_VALUES, DEFAULT_PER_PAGE};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub attributes: Vec<FacetConfigEntry>,
    #[serde(default)]
    pub nested_fields: Vec<String>,
    #[serde(default)]
    pub base_filters: Vec<String>,
    #[serde(default)]
    pub facet_deny_list: Vec<String>,
    pub search: SearchSettings,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_visibility_namespace")]
    pub visibility_namespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    pub collection: String,
    pub query_by: String,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    #[serde(default = "default_max_facet_values")]
    pub max_facet_values: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_visibility_namespace() -> String {
    "facet-visibility".to_string()
}

fn default_per_page() -> u64 {
    DEFAULT_PER_PAGE
}

fn default_max_facet_values() -> u64 {
    DEFAULT_MAX_FACET_VALUES
}

impl EngineConfig {
    pub fn compile(&self) -> CompiledFacetConfig {
        facet_config::compile(&self.attributes)
    }

    /// Configured deny-list plus every attribute that opted out of facet counts.
    pub fn effective_facet_deny_list(&self, compiled: &CompiledFacetConfig) -> BTreeSet<String> {
        let mut deny_list = compiled.facet_deny_list();
        deny_list.extend(self.facet_deny_list.iter().cloned());
        deny_list
    }
}

pub fn load(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path).map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
    let mut cfg: EngineConfig =
        serde_json::from_str(&raw).map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

    normalize(&mut cfg);
    validate(&cfg)?;

    Ok(cfg)
}

pub fn normalize(cfg: &mut EngineConfig) {
    fn trim_dedupe(values: &mut Vec<String>) {
        let mut seen = BTreeSet::new();
        values.retain_mut(|value| {
            *value = value.trim().to_string();
            !value.is_empty() && seen.insert(value.clone())
        });
    }

    trim_dedupe(&mut cfg.nested_fields);
    trim_dedupe(&mut cfg.base_filters);
    trim_dedupe(&mut cfg.facet_deny_list);
    for entry in &mut cfg.attributes {
        if let FacetConfigEntry::Attribute(descriptor) = entry {
            descriptor.schema_field = descriptor.schema_field.trim().to_string();
            descriptor.group_id = descriptor.group_id.trim().to_string();
        }
    }
}

pub fn validate(cfg: &EngineConfig) -> Result<()> {
    if cfg.search.collection.trim().is_empty() {
        return Err(Error::Validation { message: "search.collection must be non-empty.".to_string() });
    }
    if cfg.search.per_page == 0 {
        return Err(Error::Validation { message: "search.perPage must be greater than zero.".to_string() });
    }
    if cfg.visibility_namespace.trim().is_empty() {
        return Err(Error::Validation { message: "visibilityNamespace must be non-empty.".to_string() });
    }
    for entry in &cfg.attributes {
        match entry {
            FacetConfigEntry::Attribute(descriptor) if descriptor.schema_field.is_empty() => {
                return Err(Error::Validation { message: "attributes[].schemaField must be non-empty.".to_string() });
            }
            FacetConfigEntry::Group(group) if group.id.trim().is_empty() => {
                return Err(Error::Validation { message: "attributes[].id of a group must be non-empty.".to_string() });
            }
            _ => {}
        }
    }
    for field in &cfg.nested_fields {
        if field.contains(':') || field.ends_with('.') {
            return Err(Error::Validation { message: format!("nestedFields entry {field:?} is not an attribute path.") });
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"{
        "attributes": [
            {"type": "group", "id": "person", "name": "Person"},
            {"type": "attribute", "groupId": "person", "schemaField": " person.gender "},
            {"type": "attribute", "groupId": "studies", "schemaField": "studies.name",
             "options": {"facetCounts": false}}
        ],
        "nestedFields": ["studies", " studies "],
        "baseFilters": ["base.isScheduledForDeletion:false"],
        "facetDenyList": ["file.hash"],
        "search": {"collection": "people", "queryBy": "person.name"}
    }"#;

    #[test]
    fn loads_normalizes_and_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.nested_fields, vec!["studies".to_string()]);
        assert_eq!(cfg.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(cfg.search.per_page, DEFAULT_PER_PAGE);

        let compiled = cfg.compile();
        assert_eq!(compiled.group_attributes("person"), vec!["person.gender"]);
        assert_eq!(
            cfg.effective_facet_deny_list(&compiled),
            BTreeSet::from(["file.hash".to_string(), "studies.name".to_string()])
        );
    }

    #[test]
    fn reports_parse_and_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(matches!(load(file.path()), Err(Error::ParseConfig { .. })));

        let mut cfg: EngineConfig = serde_json::from_str(SAMPLE).unwrap();
        cfg.search.collection = " ".to_string();
        assert!(matches!(validate(&cfg), Err(Error::Validation { .. })));

        assert!(matches!(load(Path::new("/nonexistent/engine.json")), Err(Error::ReadConfig { .. })));
    }
}
