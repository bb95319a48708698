use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::search_query::SearchQuery;


/// Result snapshot the orchestrator pushes into widgets after every search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchResults {
    pub query: SearchQuery,
    pub found: u64,
    pub hits: Vec<serde_json::Value>,
    pub facets: BTreeMap<String, SearchResultFacets>,
    pub page: u64,
}

impl SearchResults {
    pub fn facet(&self, attribute: &str) -> Option<&SearchResultFacets> {
        self.facets.get(attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultFacets {
    pub facet_field: String,
    pub facet_values: Vec<SearchResultFacetItem>,
    pub stats: Option<FacetStats>,
}

impl SearchResultFacets {
    pub fn empty(facet_field: impl Into<String>) -> Self {
        Self { facet_field: facet_field.into(), facet_values: Vec::new(), stats: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultFacetItem {
    pub display_string: String,
    pub original_value: FacetOriginalValue,
    pub count: u64,
}

/// Numeric bounds of an attribute across the current result set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacetStats {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum FacetOriginalValue {
    String(String),
    Int(u64),
}

impl FacetOriginalValue {
    /// Takes the type from the backend's JSON: strings stay strings even when they are all digits
    /// (`"01234"`), non-negative integers become `Int`, anything else is kept as its JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => FacetOriginalValue::String(s.clone()),
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(i) => FacetOriginalValue::Int(i),
                None => FacetOriginalValue::String(n.to_string()),
            },
            other => FacetOriginalValue::String(other.to_string()),
        }
    }
}

impl fmt::Display for FacetOriginalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetOriginalValue::String(s) => write!(f, "{s}"),
            FacetOriginalValue::Int(i) => write!(f, "{i}"),
        }
    }
}
