#![deny(missing_docs)]
//! Image types and traits for raster buffers processed by nearblack

/// image representation for raster processing purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// sample types that can be stored in an image.
pub mod sample;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
pub use crate::sample::SampleType;
