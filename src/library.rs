//! Track catalog: the ordered list of selectable audio sources.
//!
//! The catalog comes either from a static list in the config or from a
//! directory scan, and is read-only once the player starts.

mod model;
mod scan;

pub use model::{Catalog, Track, file_name_of};
pub use scan::scan;
