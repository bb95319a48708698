//! Facet response shaping.

use std::collections::HashSet;

use common::search_result::{FacetOriginalValue, FacetStats, SearchResultFacetItem, SearchResultFacets};

use crate::search_driver::RawFacetCounts;


/// Deduplicates the backend buckets and orders them by count, then display string.
pub fn shape_facet_counts(raw: &RawFacetCounts) -> SearchResultFacets {
    let mut result = SearchResultFacets {
        facet_field: raw.field_name.clone(),
        facet_values: Vec::new(),
        stats: raw.stats.as_ref().and_then(|stats| match (stats.min, stats.max) {
            (Some(min), Some(max)) => Some(FacetStats { min, max }),
            _ => None,
        }),
    };

    if raw.counts.is_empty() {
        return result;
    }

    let mut response = raw
        .counts
        .iter()
        .map(|bucket| (FacetOriginalValue::from_json(&bucket.value), bucket.count))
        .collect::<Vec<_>>();
    response.sort_by_key(|(_v, count)| u64::MAX - *count);
    let mut present_values = HashSet::new();
    for (value, count) in response {
        if present_values.contains(&value) {
            continue;
        }
        present_values.insert(value.clone());
        result.facet_values.push(SearchResultFacetItem {
            display_string: value.to_string(),
            original_value: value,
            count: count,
        });
    }
    drop(present_values);

    result.facet_values.sort_by_key(|item| (u64::MAX - item.count, item.display_string.clone()));
    result
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::search_driver::{RawFacetBucket, RawFacetStats};

    fn bucket(value: impl Into<serde_json::Value>, count: u64) -> RawFacetBucket {
        RawFacetBucket { value: value.into(), count }
    }

    #[test]
    fn dedupes_keeping_highest_count_and_sorts() {
        let raw = RawFacetCounts {
            field_name: "person.nationalities.text".to_string(),
            counts: vec![bucket("FR", 3), bucket("DE", 7), bucket("AT", 3), bucket("DE", 1)],
            stats: None,
        };

        let shaped = shape_facet_counts(&raw);
        let values = shaped.facet_values.iter().map(|item| (item.display_string.as_str(), item.count)).collect::<Vec<_>>();
        assert_eq!(values, vec![("DE", 7), ("AT", 3), ("FR", 3)]);
    }

    #[test]
    fn keeps_numeric_values_and_stats() {
        let raw = RawFacetCounts {
            field_name: "file.type".to_string(),
            counts: vec![bucket(4, 2), bucket("01234", 1)],
            stats: Some(RawFacetStats { min: Some(1.0), max: Some(9.0) }),
        };

        let shaped = shape_facet_counts(&raw);
        assert_eq!(shaped.facet_values[0].original_value, FacetOriginalValue::Int(4));
        assert_eq!(shaped.facet_values[1].original_value, FacetOriginalValue::String("01234".to_string()));
        assert_eq!(shaped.facet_values[1].display_string, "01234");
        assert_eq!(shaped.stats, Some(FacetStats { min: 1.0, max: 9.0 }));
    }
}
