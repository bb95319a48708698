//! Search endpoint: refinements in, shaped results out.

use std::collections::BTreeSet;

use anyhow::Context;
use common::config::EngineConfig;
use common::facet_config::CompiledFacetConfig;
use common::search_query::{SearchParameters, SearchQuery};
use common::search_result::{SearchResultFacets, SearchResults};

use crate::api::search::request_adapter::SearchRequestAdapter;
use crate::api::search::search_facets::shape_facet_counts;
use crate::api::search::search_filter::{build_filter_expression, build_filter_expression_excluding, build_query_text};
use crate::search_driver::{MultiSearchRequest, MultiSearchResponse, SearchDriver, SearchRequest};


/// Turns a [`SearchQuery`] into a multi-search batch, sends it through the
/// [`SearchRequestAdapter`] and shapes the answer.
pub struct SearchService<D> {
    config: EngineConfig,
    compiled: CompiledFacetConfig,
    adapter: SearchRequestAdapter<D>,
}

impl<D: SearchDriver + Sync> SearchService<D> {
    pub fn new(config: EngineConfig, driver: D) -> Self {
        let compiled = config.compile();
        let deny_list = config.effective_facet_deny_list(&compiled);
        Self { adapter: SearchRequestAdapter::new(driver, deny_list), compiled, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compiled(&self) -> &CompiledFacetConfig {
        &self.compiled
    }

    pub fn adapter(&self) -> &SearchRequestAdapter<D> {
        &self.adapter
    }

    /// Attributes that get a dedicated sub-request: selected, counted, and not deny-listed.
    fn disjunctive_attributes(&self, query: &SearchQuery, facets: &[String]) -> Vec<String> {
        facets
            .iter()
            .filter(|facet| query.facet_filters.contains_key(facet.as_str()))
            .filter(|facet| !self.adapter.facet_deny_list().contains(facet.as_str()))
            .cloned()
            .collect()
    }

    /// Requested facets: every configured refinement list plus what widgets asked for.
    fn facet_names(&self, params: &SearchParameters) -> Vec<String> {
        let mut facets = self.compiled.facet_attributes();
        let mut seen = facets.iter().cloned().collect::<BTreeSet<_>>();
        for facet in &params.facets {
            if seen.insert(facet.clone()) {
                facets.push(facet.clone());
            }
        }
        facets
    }

    /// Sub-request 0 carries the full filter and every facet; each selected facet gets one more
    /// sub-request without its own selection so its other values keep their counts.
    pub fn build_search_requests(&self, query: &SearchQuery, params: &SearchParameters) -> MultiSearchRequest {
        let settings = &self.config.search;
        let facets = self.facet_names(params);
        let max_facet_values = params.max_values_per_facet.unwrap_or(settings.max_facet_values).max(settings.max_facet_values);
        let base = SearchRequest {
            collection: settings.collection.clone(),
            q: build_query_text(query),
            query_by: settings.query_by.clone(),
            filter_by: build_filter_expression(query, &self.config),
            facet_by: facets.clone(),
            max_facet_values,
            per_page: settings.per_page,
            page: query.page + 1,
        };

        let mut searches = vec![base.clone()];
        for attribute in self.disjunctive_attributes(query, &facets) {
            searches.push(SearchRequest {
                filter_by: build_filter_expression_excluding(query, &self.config, &attribute),
                facet_by: vec![attribute],
                per_page: 0,
                page: 1,
                ..base.clone()
            });
        }
        MultiSearchRequest { searches }
    }

    pub async fn search(&self, query: &SearchQuery, params: &SearchParameters) -> anyhow::Result<SearchResults> {
        let request = self.build_search_requests(query, params);
        let disjunctive = request.searches.iter().skip(1).flat_map(|search| search.facet_by.clone()).collect::<Vec<_>>();

        let response = self.adapter.multi_search(request).await?;
        shape_results(query, response, &disjunctive)
    }
}

fn shape_results(query: &SearchQuery, response: MultiSearchResponse, disjunctive: &[String]) -> anyhow::Result<SearchResults> {
    if let Some(error) = response.results.iter().find_map(|result| result.error.clone()) {
        anyhow::bail!("Search backend rejected the request: {}", error);
    }
    let mut results = response.results.into_iter();
    let main = results.next().context("search backend returned no results")?;

    let mut shaped = SearchResults {
        query: query.clone(),
        found: main.found,
        hits: main.hits.into_iter().map(|hit| hit.document).collect(),
        facets: main
            .facet_counts
            .iter()
            .map(|raw| (raw.field_name.clone(), shape_facet_counts(raw)))
            .collect(),
        page: query.page,
    };

    for (attribute, result) in disjunctive.iter().zip(results) {
        let facet = result
            .facet_counts
            .iter()
            .find(|raw| &raw.field_name == attribute)
            .map(shape_facet_counts)
            .unwrap_or_else(|| SearchResultFacets::empty(attribute.clone()));
        shaped.facets.insert(attribute.clone(), facet);
    }
    Ok(shaped)
}


#[cfg(test)]
mod tests {
    use common::search_result::FacetOriginalValue;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::search_driver::{RawFacetBucket, RawFacetCounts, RawSearchResult};
    use crate::test_support::{RecordingDriver, sample_config, sample_response};

    #[test]
    fn adds_one_sub_request_per_selected_facet() {
        let service = SearchService::new(sample_config(), RecordingDriver::default());
        let mut query = SearchQuery::from_query_string("Smith");
        query.toggle_facet_value("person.gender", FacetOriginalValue::String("f".to_string()));
        query.toggle_facet_value("base.isScheduledForDeletion", FacetOriginalValue::String("false".to_string()));

        let request = service.build_search_requests(&query, &SearchParameters::default());

        assert_eq!(request.searches.len(), 2);
        assert_eq!(request.searches[0].q, "Smith");
        assert!(request.searches[0].facet_by.contains(&"base.isScheduledForDeletion".to_string()));
        assert_eq!(request.searches[1].facet_by, vec!["person.gender".to_string()]);
        assert_eq!(
            request.searches[1].filter_by,
            "base.isScheduledForDeletion:false && base.isScheduledForDeletion:=[`false`]"
        );
        assert_eq!(request.searches[1].per_page, 0);
    }

    #[tokio::test]
    async fn search_adapts_and_shapes() {
        let mut response = sample_response();
        response.results.push(RawSearchResult {
            facet_counts: vec![RawFacetCounts {
                field_name: "person.gender".to_string(),
                counts: vec![RawFacetBucket { value: "f".into(), count: 2 }, RawFacetBucket { value: "m".into(), count: 5 }],
                stats: None,
            }],
            ..Default::default()
        });
        let service = SearchService::new(sample_config(), RecordingDriver::with_response(response));
        let mut query = SearchQuery::default();
        query.toggle_facet_value("person.gender", FacetOriginalValue::String("f".to_string()));

        let results = service.search(&query, &SearchParameters::default()).await.unwrap();

        let sent = service.adapter().driver().requests();
        assert!(!sent[0].searches[0].facet_by.contains(&"base.isScheduledForDeletion".to_string()));
        assert_eq!(results.found, 2);
        let genders = &results.facet("person.gender").unwrap().facet_values;
        assert_eq!(genders.iter().map(|item| item.count).collect::<Vec<_>>(), vec![5, 2]);
    }

    #[tokio::test]
    async fn backend_errors_surface() {
        let response = MultiSearchResponse {
            results: vec![RawSearchResult { error: Some("bad filter".to_string()), ..Default::default() }],
        };
        let service = SearchService::new(sample_config(), RecordingDriver::with_response(response));
        let err = service.search(&SearchQuery::default(), &SearchParameters::default()).await.unwrap_err();
        assert!(err.to_string().contains("bad filter"));
    }
}
