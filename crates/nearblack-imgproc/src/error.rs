use nearblack_image::ImageError;

/// Errors reported before a near-black collapse touches any pixel.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NearBlackError {
    /// Error related to the image buffer.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// The raster has no pixel in one of its axes, or no band at all.
    #[error("Invalid raster dimensions: {0}x{1} with {2} bands")]
    InvalidDimensions(usize, usize, usize),

    /// The target color set holds no color.
    #[error("The target color set must hold at least one color")]
    EmptyTargets,

    /// A target color does not have one sample per color band.
    #[error("Target color {index} has {got} samples, expected {expected}")]
    InvalidTarget {
        /// Position of the offending color in the set.
        index: usize,
        /// Number of color bands of the raster.
        expected: usize,
        /// Number of samples of the color.
        got: usize,
    },

    /// A numeric parameter is out of its valid range.
    #[error("Invalid parameter `{0}`: {1} must not be negative")]
    InvalidParameter(&'static str, i64),

    /// An alpha band was requested on a raster whose bands cannot carry one.
    #[error("Cannot set an alpha band on a raster with {0} bands")]
    BandCountMismatch(usize),
}
