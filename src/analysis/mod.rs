//! Pattern analytics over recent outcome history.
//!
//! All functions in this module are pure and synchronous: they read an
//! immutable most-recent-first slice of outcomes and return derived
//! signals. Nothing here mutates session state.

pub mod frequency;
pub mod section;

pub use frequency::{hot_numbers, missing_numbers};
pub use section::{section_signal, SectionSignal};
