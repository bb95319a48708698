//! Compact URL encoding for shareable search state.

use std::{fmt::Display, str::FromStr};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};


/// Wraps a value that travels in a URL segment as URL-safe base64 over CBOR.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UrlParam<T>(pub T);

impl<T> From<T> for UrlParam<T> {
    fn from(value: T) -> Self {
        UrlParam(value)
    }
}

impl<T> UrlParam<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Display output is what FromStr parses
impl<T: Serialize> Display for UrlParam<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut serialized = Vec::new();
        if let Err(e) = ciborium::into_writer(self, &mut serialized) {
            tracing::warn!("Failed to encode url parameter: {}", e);
            return Err(std::fmt::Error);
        }
        write!(f, "{}", URL_SAFE.encode(serialized))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateParseError {
    #[error("failed to decode base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("failed to deserialize: {0}")]
    Deserialize(#[from] ciborium::de::Error<std::io::Error>),
}

impl<T: for<'de> Deserialize<'de>> FromStr for UrlParam<T> {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = URL_SAFE.decode(s.as_bytes())?;
        Ok(ciborium::from_reader(std::io::Cursor::new(decoded))?)
    }
}


#[cfg(test)]
mod tests {
    use common::search_query::{NumericOperator, SearchQuery};
    use common::search_result::FacetOriginalValue;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn search_query_survives_the_url() {
        let mut query = SearchQuery::from_query_string("alice");
        query.toggle_facet_value("person.gender", FacetOriginalValue::String("female".to_string()));
        query.add_numeric_refinement("file.createdAt", NumericOperator::GreaterOrEqual, 1_709_251_200);
        query.page = 3;

        let encoded = UrlParam(query.clone()).to_string();
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')));

        let decoded: UrlParam<SearchQuery> = encoded.parse().unwrap();
        assert_eq!(decoded.into_inner(), query);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!("not base64!".parse::<UrlParam<SearchQuery>>(), Err(StateParseError::Decode(_))));
        let not_cbor = URL_SAFE.encode([0xff, 0x00]);
        assert!(matches!(not_cbor.parse::<UrlParam<SearchQuery>>(), Err(StateParseError::Deserialize(_))));
    }
}
