#![allow(dead_code, unused_imports)]

pub mod image_variants;
pub mod test_images;

pub use image_variants::ImageVariant;
pub use test_images::*;
