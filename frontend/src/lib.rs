//! Client-side refinement engine: widgets that turn user input into search refinements,
//! the session they refine, and persisted facet visibility.

pub mod data_definitions;
pub mod debounce;
pub mod search_session;
pub mod visibility;
pub mod widgets;

pub use data_definitions::url_param::UrlParam;
pub use search_session::SearchSession;
