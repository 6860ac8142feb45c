//! Viewport-intersection tracking for carousel items.

mod entry;
mod tracker;

pub use entry::IntersectionEntry;
pub use tracker::{EntrySink, IntersectionTracker, ObservedTarget};
