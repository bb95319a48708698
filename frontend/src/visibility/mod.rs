//! Which refinement widgets the user wants to see.

mod facet_visibility;
mod storage;

pub use facet_visibility::{FacetVisibilityStore, VisibilityState};
#[cfg(feature = "web")]
pub use storage::LocalStorage;
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage};
