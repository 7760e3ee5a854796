//! Application module: the player controller used by the TUI and runtime.
//!
//! `App` lives in `app::model` and holds the catalog, the media element and
//! the derived view state the UI renders.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
