//! Carousel contents and scroll-position synchronization.

mod items;
mod sync;

pub use items::{Carousel, CarouselMode, ItemCollection};
pub use sync::CarouselSync;
