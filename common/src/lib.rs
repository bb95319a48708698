//! Shared search model and pure query-construction logic used by frontend and backend.

extern crate serde;


pub mod search_query;
pub mod search_result;
pub mod search_const;
pub mod filter_expression;
pub mod timestamp_boundary;
pub mod attribute_config;
pub mod facet_config;
pub mod config;
pub mod error;

pub use error::{Error, Result};
