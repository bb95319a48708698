//! Constants of the backend filter language and search defaults.

/// Separator joining atomic conditions of a filter expression.
pub const FILTER_SEPARATOR: &str = " && ";

/// Calendar date format accepted by date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const DEFAULT_MAX_FACET_VALUES: u64 = 21;
pub const DEFAULT_REFINEMENT_LIST_LIMIT: usize = 10;

pub const SECONDS_PER_DAY: i64 = 86_400;
