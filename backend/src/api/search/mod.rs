//! Outgoing query path: filter building, request adaptation and response shaping.

mod search_for_results;
pub use search_for_results::SearchService;

pub mod request_adapter;
pub use request_adapter::SearchRequestAdapter;

pub mod search_facets;

pub mod search_filter;
