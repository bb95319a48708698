//! Filter expression builder for search queries.

use common::config::EngineConfig;
use common::filter_expression::{join_conditions, membership_condition, merge_all, numeric_condition};
use common::search_query::SearchQuery;


/// Base filters, then one membership condition per selected facet, then numeric range conditions,
/// scoped per repeated field.
pub fn build_filter_expression(query: &SearchQuery, config: &EngineConfig) -> String {
    let mut terms = config.base_filters.clone();

    for (field_name, values) in query.facet_filters.iter() {
        if values.is_empty() {
            continue;
        }
        terms.push(membership_condition(field_name, values));
    }

    for (field_name, refinements) in query.numeric_filters.iter() {
        for refinement in refinements {
            terms.push(numeric_condition(field_name, refinement.operator, refinement.value));
        }
    }

    let expression = join_conditions(&terms);
    merge_all(config.nested_fields.iter().map(String::as_str), &expression)
}

/// Same as [`build_filter_expression`] without the attribute's own selection, so the facet keeps
/// counting the values that are not selected.
pub fn build_filter_expression_excluding(query: &SearchQuery, config: &EngineConfig, attribute: &str) -> String {
    build_filter_expression(&query.without_facet_filter(attribute), config)
}

/// Free text as sent to the backend; an empty query matches everything.
pub fn build_query_text(query: &SearchQuery) -> String {
    let query_string = query.query_string.trim();
    if query_string.is_empty() { "*".to_string() } else { query_string.to_string() }
}
