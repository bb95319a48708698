//! Strips deny-listed facets from outgoing multi-search batches.

use std::collections::BTreeSet;

use crate::search_driver::{MultiSearchRequest, MultiSearchResponse, SearchDriver};


/// Sits in front of a [`SearchDriver`] and removes deny-listed names from the facet list of the
/// first sub-request. Filters and every other field pass through untouched, and so does the
/// response.
#[derive(Debug, Clone)]
pub struct SearchRequestAdapter<D> {
    driver: D,
    facet_deny_list: BTreeSet<String>,
}

impl<D: SearchDriver> SearchRequestAdapter<D> {
    pub fn new(driver: D, facet_deny_list: impl IntoIterator<Item = String>) -> Self {
        Self { driver, facet_deny_list: facet_deny_list.into_iter().collect() }
    }

    pub fn facet_deny_list(&self) -> &BTreeSet<String> {
        &self.facet_deny_list
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn adapt(&self, mut request: MultiSearchRequest) -> MultiSearchRequest {
        if let Some(first) = request.searches.first_mut() {
            let before = first.facet_by.len();
            first.facet_by.retain(|facet| !self.facet_deny_list.contains(facet));
            if first.facet_by.len() != before {
                tracing::debug!("Dropped {} deny-listed facets from the first sub-request", before - first.facet_by.len());
            }
        }
        request
    }
}

impl<D: SearchDriver + Sync> SearchDriver for SearchRequestAdapter<D> {
    async fn multi_search(&self, request: MultiSearchRequest) -> anyhow::Result<MultiSearchResponse> {
        let request = self.adapt(request);
        self.driver.multi_search(request).await
    }
}
