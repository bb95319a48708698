//! Shared search query models and helpers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::search_result::FacetOriginalValue;


/// Refinement state of one search: free text plus the committed refinements of every widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchQuery {
    pub query_string: String,
    pub facet_filters: BTreeMap<String, BTreeSet<FacetOriginalValue>>,
    pub numeric_filters: BTreeMap<String, Vec<NumericRefinement>>,
    pub page: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericOperator {
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl NumericOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericOperator::GreaterOrEqual => ">=",
            NumericOperator::LessOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NumericRefinement {
    pub operator: NumericOperator,
    pub value: i64,
}

impl SearchQuery {
    pub fn from_query_string(query_string: impl Into<String>) -> Self {
        Self { query_string: query_string.into(), ..Default::default() }
    }

    pub fn is_facet_value_selected(&self, attribute: &str, value: &FacetOriginalValue) -> bool {
        self.facet_filters.get(attribute).is_some_and(|values| values.contains(value))
    }

    /// Adds or removes `value` from the attribute's selection and returns whether it is now selected.
    /// Empty selections are removed so an attribute never carries an empty filter.
    pub fn toggle_facet_value(&mut self, attribute: &str, value: FacetOriginalValue) -> bool {
        let should_add = !self.is_facet_value_selected(attribute, &value);
        let entry = self.facet_filters.entry(attribute.to_string()).or_default();
        if should_add {
            entry.insert(value);
        } else {
            entry.remove(&value);
        }
        if entry.is_empty() {
            self.facet_filters.remove(attribute);
        }
        self.page = 0;
        should_add
    }

    pub fn selected_facet_values(&self, attribute: &str) -> BTreeSet<FacetOriginalValue> {
        self.facet_filters.get(attribute).cloned().unwrap_or_default()
    }

    pub fn numeric_refinements(&self, attribute: &str) -> &[NumericRefinement] {
        self.numeric_filters.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn numeric_refinement(&self, attribute: &str, operator: NumericOperator) -> Option<i64> {
        self.numeric_refinements(attribute)
            .iter()
            .find(|refinement| refinement.operator == operator)
            .map(|refinement| refinement.value)
    }

    pub fn remove_numeric_refinements(&mut self, attribute: &str) {
        if self.numeric_filters.remove(attribute).is_some() {
            self.page = 0;
        }
    }

    /// Replaces any refinement with the same operator on the attribute.
    pub fn add_numeric_refinement(&mut self, attribute: &str, operator: NumericOperator, value: i64) {
        let entry = self.numeric_filters.entry(attribute.to_string()).or_default();
        entry.retain(|refinement| refinement.operator != operator);
        entry.push(NumericRefinement { operator, value });
        entry.sort();
        self.page = 0;
    }

    /// Drops both discrete and numeric refinements on the attribute.
    pub fn clear_refinements(&mut self, attribute: &str) {
        self.facet_filters.remove(attribute);
        self.remove_numeric_refinements(attribute);
    }

    pub fn has_refinements(&self, attribute: &str) -> bool {
        self.facet_filters.contains_key(attribute) || !self.numeric_refinements(attribute).is_empty()
    }

    /// Copy of the query without the attribute's own discrete filter, used to count its unselected values.
    pub fn without_facet_filter(&self, attribute: &str) -> SearchQuery {
        let mut query = self.clone();
        query.facet_filters.remove(attribute);
        query
    }
}


/// Parameters widgets contribute declaratively before a search is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchParameters {
    pub facets: Vec<String>,
    pub max_values_per_facet: Option<u64>,
}

impl SearchParameters {
    pub fn add_facet(&mut self, attribute: &str) {
        if !self.facets.iter().any(|facet| facet == attribute) {
            self.facets.push(attribute.to_string());
        }
    }

    pub fn with_max_values_per_facet(mut self, max_values: u64) -> Self {
        self.max_values_per_facet = Some(self.max_values_per_facet.map_or(max_values, |current| current.max(max_values)));
        self
    }
}
