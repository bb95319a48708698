use std::sync::Mutex;

use common::config::EngineConfig;
use serde_json::json;

use crate::search_driver::{MultiSearchRequest, MultiSearchResponse, SearchDriver};


/// Driver that records every batch and answers with a canned response.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    requests: Mutex<Vec<MultiSearchRequest>>,
    response: MultiSearchResponse,
}

impl RecordingDriver {
    pub fn with_response(response: MultiSearchResponse) -> Self {
        Self { requests: Mutex::new(Vec::new()), response }
    }

    pub fn requests(&self) -> Vec<MultiSearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl SearchDriver for RecordingDriver {
    async fn multi_search(&self, request: MultiSearchRequest) -> anyhow::Result<MultiSearchResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

pub fn sample_config() -> EngineConfig {
    serde_json::from_value(json!({
        "attributes": [
            {"type": "group", "id": "person", "name": "Person"},
            {"type": "attribute", "groupId": "person", "schemaField": "person.gender", "options": {"defaultVisible": true}},
            {"type": "attribute", "groupId": "person", "schemaField": "person.nationalities.text", "options": {"searchable": true}},
            {"type": "group", "id": "studies", "name": "Studies"},
            {"type": "attribute", "groupId": "studies", "schemaField": "studies.name"},
            {"type": "attribute", "groupId": "studies", "schemaField": "studies.statusText"},
            {"type": "attribute", "groupId": "studies", "schemaField": "studies.type"},
            {"type": "group", "id": "file", "name": "File"},
            {"type": "attribute", "groupId": "file", "schemaField": "file.createdAt", "options": {"widget": "dateRange"}},
            {"type": "attribute", "schemaField": "base.isScheduledForDeletion", "options": {"facetCounts": false}}
        ],
        "nestedFields": ["studies"],
        "baseFilters": ["base.isScheduledForDeletion:false"],
        "facetDenyList": ["file.hash"],
        "search": {"collection": "people", "queryBy": "person.name"}
    }))
    .unwrap()
}

pub fn sample_response() -> MultiSearchResponse {
    serde_json::from_value(json!({
        "results": [{
            "found": 2,
            "hits": [{"document": {"id": "1"}}, {"document": {"id": "2"}}],
            "facet_counts": [
                {"field_name": "person.gender", "counts": [{"value": "f", "count": 2}]},
                {"field_name": "studies.name", "counts": [{"value": "X", "count": 1}, {"value": "Y", "count": 1}]}
            ]
        }]
    }))
    .unwrap()
}
