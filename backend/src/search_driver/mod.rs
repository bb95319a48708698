//! Wire model of multi-search requests and the seam to the search backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

mod http_driver;
pub use http_driver::HttpSearchDriver;


/// Sends a batch of search requests to the backend and returns one result per request.
pub trait SearchDriver {
    fn multi_search(&self, request: MultiSearchRequest) -> impl Future<Output = anyhow::Result<MultiSearchResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MultiSearchRequest {
    pub searches: Vec<SearchRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchRequest {
    pub collection: String,
    pub q: String,
    pub query_by: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filter_by: String,
    #[serde(default, with = "comma_list", skip_serializing_if = "Vec::is_empty")]
    pub facet_by: Vec<String>,
    pub max_facet_values: u64,
    pub per_page: u64,
    /// One-based, as the backend expects.
    pub page: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MultiSearchResponse {
    pub results: Vec<RawSearchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawSearchResult {
    pub found: u64,
    pub hits: Vec<RawSearchHit>,
    pub facet_counts: Vec<RawFacetCounts>,
    pub search_time_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchHit {
    pub document: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawFacetCounts {
    pub field_name: String,
    pub counts: Vec<RawFacetBucket>,
    pub stats: Option<RawFacetStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFacetBucket {
    /// Kept as sent so string values that look numeric are not reinterpreted.
    pub value: serde_json::Value,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawFacetStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// `facet_by` travels as a comma separated string.
mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&values.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
    }
}
