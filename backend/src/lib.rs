//! Search backend access: query building, facet deny-listing and the HTTP driver.

pub mod api;
pub mod search_driver;

#[cfg(test)]
pub(crate) mod test_support;
