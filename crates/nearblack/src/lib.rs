#![doc = include_str!("../../../README.md")]

#[doc(inline)]
pub use nearblack_image as image;

#[doc(inline)]
pub use nearblack_imgproc as imgproc;

#[doc(inline)]
pub use nearblack_io as io;
