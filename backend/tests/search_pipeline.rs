use std::sync::Mutex;

use backend::api::search::SearchService;
use backend::search_driver::{HttpSearchDriver, MultiSearchRequest, MultiSearchResponse, SearchDriver};
use common::search_query::{NumericOperator, SearchParameters, SearchQuery};
use common::search_result::FacetOriginalValue;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const CONFIG: &str = r#"{
    "attributes": [
        {"type": "group", "id": "person", "name": "Person"},
        {"type": "attribute", "groupId": "person", "schemaField": "person.gender"},
        {"type": "group", "id": "studies", "name": "Studies"},
        {"type": "attribute", "groupId": "studies", "schemaField": "studies.name"},
        {"type": "attribute", "groupId": "studies", "schemaField": "studies.type"},
        {"type": "attribute", "groupId": "studies", "schemaField": "studies.hash", "options": {"facetCounts": false}},
        {"type": "group", "id": "file", "name": "File"},
        {"type": "attribute", "groupId": "file", "schemaField": "file.createdAt", "options": {"widget": "dateRange"}}
    ],
    "nestedFields": [" studies ", "studies"],
    "baseFilters": ["base.isScheduledForDeletion:false"],
    "search": {"collection": "people", "queryBy": "person.name", "perPage": 10}
}"#;

#[derive(Default)]
struct FakeBackend {
    requests: Mutex<Vec<MultiSearchRequest>>,
    response: MultiSearchResponse,
}

impl SearchDriver for FakeBackend {
    async fn multi_search(&self, request: MultiSearchRequest) -> anyhow::Result<MultiSearchResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

fn load_config() -> common::config::EngineConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, CONFIG).unwrap();
    common::config::load(&path).unwrap()
}

fn refined_query() -> SearchQuery {
    let mut query = SearchQuery::from_query_string("smith");
    query.toggle_facet_value("studies.name", FacetOriginalValue::String("X".to_string()));
    query.toggle_facet_value("studies.type", FacetOriginalValue::String("T".to_string()));
    query.toggle_facet_value("studies.hash", FacetOriginalValue::String("abc".to_string()));
    query.add_numeric_refinement("file.createdAt", NumericOperator::GreaterOrEqual, 1_709_251_200);
    query
}

fn canned_response() -> MultiSearchResponse {
    serde_json::from_value(json!({
        "results": [
            {
                "found": 1,
                "hits": [{"document": {"id": "7", "person.name": "Smith"}}],
                "facet_counts": [
                    {"field_name": "studies.name", "counts": [{"value": "X", "count": 1}]},
                    {"field_name": "person.gender", "counts": [{"value": "m", "count": 1}, {"value": "f", "count": 1}]}
                ]
            },
            {"facet_counts": [{"field_name": "studies.name", "counts": [{"value": "X", "count": 1}, {"value": "Z", "count": 4}]}]},
            {"facet_counts": []}
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn refined_query_runs_through_the_whole_pipeline() {
    let config = load_config();
    assert_eq!(config.nested_fields, vec!["studies".to_string()]);

    let backend = FakeBackend { response: canned_response(), ..Default::default() };
    let service = SearchService::new(config, backend);
    let results = service.search(&refined_query(), &SearchParameters::default()).await.unwrap();

    let sent = service.adapter().driver().requests.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    let searches = &sent[0].searches;
    assert_eq!(searches.len(), 3);

    let main = &searches[0];
    assert_eq!(main.q, "smith");
    assert_eq!(main.per_page, 10);
    assert_eq!(main.page, 1);
    assert_eq!(main.facet_by, vec!["person.gender".to_string(), "studies.name".to_string(), "studies.type".to_string()]);
    assert_eq!(
        main.filter_by,
        "base.isScheduledForDeletion:false && file.createdAt:>=1709251200 && studies.{hash:=[`abc`] && name:=[`X`] && type:=[`T`]}"
    );

    assert_eq!(searches[1].facet_by, vec!["studies.name".to_string()]);
    assert_eq!(
        searches[1].filter_by,
        "base.isScheduledForDeletion:false && file.createdAt:>=1709251200 && studies.{hash:=[`abc`] && type:=[`T`]}"
    );
    assert_eq!(searches[2].facet_by, vec!["studies.type".to_string()]);

    assert_eq!(results.found, 1);
    assert_eq!(results.hits[0]["id"], "7");
    let names = &results.facet("studies.name").unwrap().facet_values;
    assert_eq!(names.iter().map(|item| (item.display_string.as_str(), item.count)).collect::<Vec<_>>(), vec![("Z", 4), ("X", 1)]);
    assert!(results.facet("studies.type").unwrap().facet_values.is_empty());
    let genders = &results.facet("person.gender").unwrap().facet_values;
    assert_eq!(genders.iter().map(|item| item.display_string.as_str()).collect::<Vec<_>>(), vec!["f", "m"]);
}

#[tokio::test]
async fn widget_requested_facets_are_added_once() {
    let service = SearchService::new(load_config(), FakeBackend::default());
    let mut params = SearchParameters::default();
    params.add_facet("person.gender");
    params.add_facet("file.createdAt");
    let params = params.with_max_values_per_facet(50);

    let request = service.build_search_requests(&SearchQuery::default(), &params);
    assert_eq!(request.searches.len(), 1);
    assert_eq!(request.searches[0].facet_by.iter().filter(|facet| *facet == "person.gender").count(), 1);
    assert!(request.searches[0].facet_by.contains(&"file.createdAt".to_string()));
    assert_eq!(request.searches[0].max_facet_values, 50);
    assert_eq!(request.searches[0].q, "*");
    assert_eq!(request.searches[0].filter_by, "base.isScheduledForDeletion:false");
}

/// Answers a single HTTP request with `body` and hands back the raw request text.
async fn serve_once(listener: TcpListener, body: String) -> String {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        raw.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok()).flatten()
                })
                .unwrap_or(0);
            if raw.len() >= header_end + 4 + content_length || n == 0 {
                break;
            }
        } else if n == 0 {
            break;
        }
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();
    String::from_utf8_lossy(&raw).to_string()
}

#[tokio::test]
async fn http_driver_posts_the_adapted_batch() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let body = serde_json::to_string(&canned_response()).unwrap();
    let server = tokio::spawn(serve_once(listener, body));

    let service = SearchService::new(load_config(), HttpSearchDriver::new(url, Some("secret".to_string())));
    let results = service.search(&refined_query(), &SearchParameters::default()).await.unwrap();
    assert_eq!(results.found, 1);

    let raw = server.await.unwrap();
    let lowered = raw.to_lowercase();
    assert!(raw.starts_with("POST /multi_search "));
    assert!(lowered.contains("x-typesense-api-key: secret"));
    let payload: serde_json::Value = serde_json::from_str(&raw[raw.find("\r\n\r\n").unwrap() + 4..]).unwrap();
    assert_eq!(payload["searches"][0]["facet_by"], "person.gender,studies.name,studies.type");
    assert_eq!(payload["searches"][1]["per_page"], 0);
}
