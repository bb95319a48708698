//! Declarative description of the searchable attributes and their groups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::search_const::DEFAULT_REFINEMENT_LIST_LIMIT;
use crate::timestamp_boundary::TimezoneMode;


/// One entry of the static attribute list; groups and attributes are interleaved and the order
/// is the on-screen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FacetConfigEntry {
    Group(FilterGroupDescriptor),
    Attribute(AttributeDescriptor),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterGroupDescriptor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    /// Empty for category-only attributes that belong to no group.
    #[serde(default)]
    pub group_id: String,
    pub schema_field: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl AttributeDescriptor {
    pub fn new(group_id: impl Into<String>, schema_field: impl Into<String>) -> Self {
        Self { group_id: group_id.into(), schema_field: schema_field.into(), options: Map::new() }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Typed view of the rendering hints. A malformed option falls back to its own default;
    /// the well-formed ones are kept.
    pub fn hints(&self) -> AttributeOptions {
        if let Ok(hints) = parse_options(self.options.clone()) {
            return hints;
        }
        let valid = self
            .options
            .iter()
            .filter(|(key, value)| {
                let single = Map::from_iter([((*key).clone(), (*value).clone())]);
                match parse_options(single) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::warn!("Ignoring malformed option {} of {}: {}", key, self.schema_field, e);
                        false
                    }
                }
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        parse_options(valid).unwrap_or_default()
    }
}

fn parse_options(options: Map<String, Value>) -> serde_json::Result<AttributeOptions> {
    serde_json::from_value(Value::Object(options))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    #[default]
    RefinementList,
    DateRange,
}

/// Rendering hints carried in [`AttributeDescriptor::options`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeOptions {
    pub widget: WidgetKind,
    pub searchable: bool,
    pub sortable: bool,
    pub placeholder_key: Option<String>,
    pub default_visible: bool,
    pub timezone: TimezoneMode,
    /// Facet values never offered in the list.
    pub exclude_values: Vec<String>,
    /// `false` keeps the attribute filterable but stops the backend from counting its values.
    pub facet_counts: bool,
    pub limit: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self {
            widget: WidgetKind::default(),
            searchable: false,
            sortable: false,
            placeholder_key: None,
            default_visible: false,
            timezone: TimezoneMode::default(),
            exclude_values: Vec::new(),
            facet_counts: true,
            limit: DEFAULT_REFINEMENT_LIST_LIMIT,
            extra: Map::new(),
        }
    }
}
