use nearblack_image::{Image, SampleType};

use crate::{
    color::{TargetColors, TieBreak},
    error::NearBlackError,
    parallel,
    sweep::{LineSweep, PixelClass, RunCounting},
};

const VALID: u8 = 255;
const INVALID: u8 = 0;

/// Parameters of a near-black collapse.
///
/// # Examples
///
/// ```
/// use nearblack_imgproc::nearblack::NearBlackParams;
///
/// let params = NearBlackParams::default()
///     .with_near_dist(10)
///     .with_max_non_black(0)
///     .with_set_mask(true);
///
/// assert_eq!(params.near_dist, 10);
/// assert!(params.collapse_colors);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NearBlackParams {
    /// The largest per-band difference for a pixel to be near a target color.
    pub near_dist: i32,
    /// The number of non-matching pixels a sweep may cross before it stops.
    pub max_non_black: i32,
    /// Produce an alpha band, inline in the fourth band for four band rasters.
    pub set_alpha: bool,
    /// Produce a validity mask.
    pub set_mask: bool,
    /// Rewrite the color bands of collapsed pixels to the target color.
    pub collapse_colors: bool,
    /// How to pick a target when a pixel matches several.
    pub tie_break: TieBreak,
}

impl Default for NearBlackParams {
    fn default() -> Self {
        Self {
            near_dist: 15,
            max_non_black: 2,
            set_alpha: false,
            set_mask: false,
            collapse_colors: true,
            tie_break: TieBreak::FirstListed,
        }
    }
}

impl NearBlackParams {
    /// Set the near distance.
    pub fn with_near_dist(mut self, near_dist: i32) -> Self {
        self.near_dist = near_dist;
        self
    }

    /// Set the number of non-matching pixels a sweep may cross.
    pub fn with_max_non_black(mut self, max_non_black: i32) -> Self {
        self.max_non_black = max_non_black;
        self
    }

    /// Enable or disable the alpha band.
    pub fn with_set_alpha(mut self, set_alpha: bool) -> Self {
        self.set_alpha = set_alpha;
        self
    }

    /// Enable or disable the validity mask.
    pub fn with_set_mask(mut self, set_mask: bool) -> Self {
        self.set_mask = set_mask;
        self
    }

    /// Enable or disable the rewrite of collapsed pixels.
    pub fn with_collapse_colors(mut self, collapse_colors: bool) -> Self {
        self.collapse_colors = collapse_colors;
        self
    }

    /// Set the tie-break rule.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// Number of pixels a collapse marked invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollapseStats {
    /// Pixels marked invalid.
    pub collapsed: usize,
    /// Pixels of the raster.
    pub total: usize,
}

impl CollapseStats {
    /// Share of the raster marked invalid, in `[0, 1]`.
    pub fn collapsed_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.collapsed as f64 / self.total as f64
    }
}

/// The products of a collapse run in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NearBlackMasks<T> {
    /// The alpha band, `T::max_value()` for valid pixels and zero for collapsed ones.
    pub alpha: Option<Image<T, 1>>,
    /// The validity mask, 255 for valid pixels and 0 for collapsed ones.
    pub mask: Option<Image<u8, 1>>,
    /// Collapse statistics.
    pub stats: CollapseStats,
}

/// The products of a collapse into a new raster.
#[derive(Debug, Clone, PartialEq)]
pub struct NearBlackOutput<T, const C: usize> {
    /// The collapsed raster.
    pub image: Image<T, C>,
    /// The alpha band, `T::max_value()` for valid pixels and zero for collapsed ones.
    pub alpha: Option<Image<T, 1>>,
    /// The validity mask, 255 for valid pixels and 0 for collapsed ones.
    pub mask: Option<Image<u8, 1>>,
    /// Collapse statistics.
    pub stats: CollapseStats,
}

/// Number of bands compared against the target colors.
pub const fn color_bands(channels: usize) -> usize {
    if channels < 3 {
        channels
    } else {
        3
    }
}

fn validate<T: SampleType, const C: usize>(
    image: &Image<T, C>,
    targets: &TargetColors<T>,
    params: &NearBlackParams,
) -> Result<(), NearBlackError> {
    if image.width() == 0 || image.height() == 0 || C == 0 {
        return Err(NearBlackError::InvalidDimensions(
            image.width(),
            image.height(),
            C,
        ));
    }

    if targets.is_empty() {
        return Err(NearBlackError::EmptyTargets);
    }

    let expected = color_bands(C);
    if let Some((index, color)) = targets
        .colors()
        .iter()
        .enumerate()
        .find(|(_, color)| color.len() != expected)
    {
        return Err(NearBlackError::InvalidTarget {
            index,
            expected,
            got: color.len(),
        });
    }

    if params.near_dist < 0 {
        return Err(NearBlackError::InvalidParameter(
            "near_dist",
            params.near_dist as i64,
        ));
    }

    if params.max_non_black < 0 {
        return Err(NearBlackError::InvalidParameter(
            "max_non_black",
            params.max_non_black as i64,
        ));
    }

    if params.set_alpha && C > 4 {
        return Err(NearBlackError::BandCountMismatch(C));
    }

    Ok(())
}

/// Walks the raster from its four edges and collapses the border it finds.
struct Eroder<'a, T, const C: usize> {
    image: &'a mut Image<T, C>,
    valid: &'a mut Image<u8, 1>,
    targets: &'a TargetColors<T>,
    near_dist: i64,
    max_non_black: usize,
    tie_break: TieBreak,
    collapse_colors: bool,
    collapsed: usize,
}

impl<T: SampleType, const C: usize> Eroder<'_, T, C> {
    fn is_valid(&self, x: usize, y: usize) -> bool {
        self.valid.as_slice()[y * self.image.width() + x] == VALID
    }

    fn classify(&self, x: usize, y: usize) -> PixelClass {
        let offset = (y * self.image.width() + x) * C;
        let pixel = &self.image.as_slice()[offset..offset + color_bands(C)];
        let matched = self
            .targets
            .find_match(pixel, self.near_dist, self.tie_break);

        match (self.is_valid(x, y), matched) {
            (false, matched) => PixelClass::Collapsed(matched),
            (true, Some(index)) => PixelClass::Target(index),
            (true, None) => PixelClass::Content,
        }
    }

    fn collapse(&mut self, x: usize, y: usize, class: PixelClass, fill_target: Option<usize>) {
        if !self.is_valid(x, y) {
            return;
        }

        let width = self.image.width();
        self.valid.as_slice_mut()[y * width + x] = INVALID;
        self.collapsed += 1;

        if !self.collapse_colors {
            return;
        }

        let index = match class {
            PixelClass::Target(index) => index,
            _ => fill_target.unwrap_or(0),
        };

        if let Some(color) = self.targets.get(index) {
            let offset = (y * width + x) * C;
            self.image.as_slice_mut()[offset..offset + color.len()].copy_from_slice(color);
        }
    }

    fn visit(&mut self, sweep: &mut LineSweep, x: usize, y: usize) {
        let class = self.classify(x, y);
        if sweep.advance(class) {
            self.collapse(x, y, class, sweep.fill_target());
        }
    }

    /// Run one streamed pass over the rows, top-down or bottom-up.
    ///
    /// Each row first advances the column sweeps, then runs the left to right sweep over all
    /// columns but the last and the right to left sweep over all columns but the first.
    fn run_pass(&mut self, top_down: bool) {
        let (width, height) = (self.image.width(), self.image.height());
        let row_budget = if top_down { self.max_non_black } else { 0 };
        let before = self.collapsed;

        let mut columns = vec![LineSweep::new(self.max_non_black, RunCounting::Cumulative); width];

        for step in 0..height {
            let y = if top_down { step } else { height - 1 - step };

            for (x, sweep) in columns.iter_mut().enumerate() {
                self.visit(sweep, x, y);
            }

            let mut sweep = LineSweep::new(row_budget, RunCounting::Reset);
            for x in 0..width - 1 {
                self.visit(&mut sweep, x, y);
                if sweep.is_stopped() {
                    break;
                }
            }

            let mut sweep = LineSweep::new(row_budget, RunCounting::Reset);
            for x in (1..width).rev() {
                self.visit(&mut sweep, x, y);
                if sweep.is_stopped() {
                    break;
                }
            }
        }

        log::debug!(
            "{} pass collapsed {} pixels",
            if top_down { "top-down" } else { "bottom-up" },
            self.collapsed - before
        );
    }
}

/// Collapse the near-black border of a raster in place.
///
/// Sweeps walk the raster from its four edges and collapse every pixel near one of the target
/// colors, crossing up to `max_non_black` non-matching pixels before they stop. Collapsed pixels
/// are rewritten to the target color unless `collapse_colors` is off.
///
/// # Arguments
///
/// * `image` - The raster to collapse.
/// * `targets` - The colors the border is made of, one sample per color band.
/// * `params` - The collapse parameters.
///
/// # Returns
///
/// The requested alpha band and validity mask, and the collapse statistics. With four bands the
/// alpha band is also written inline into the fourth band of `image`.
///
/// # Errors
///
/// The parameters are checked before any sample is touched.
///
/// # Examples
///
/// ```
/// use nearblack_image::{Image, ImageSize};
/// use nearblack_imgproc::color::TargetColors;
/// use nearblack_imgproc::nearblack::{collapse_in_place, NearBlackParams};
///
/// let mut image = Image::<u8, 1>::new(
///     ImageSize { width: 4, height: 1 },
///     vec![3, 200, 200, 200],
/// ).unwrap();
///
/// let params = NearBlackParams::default().with_max_non_black(0).with_set_mask(true);
/// let masks = collapse_in_place(&mut image, &TargetColors::black(1), &params).unwrap();
///
/// assert_eq!(image.as_slice(), &[0, 200, 200, 200]);
/// assert_eq!(masks.mask.unwrap().as_slice(), &[0, 255, 255, 255]);
/// assert_eq!(masks.stats.collapsed, 1);
/// ```
pub fn collapse_in_place<T: SampleType, const C: usize>(
    image: &mut Image<T, C>,
    targets: &TargetColors<T>,
    params: &NearBlackParams,
) -> Result<NearBlackMasks<T>, NearBlackError> {
    validate(image, targets, params)?;

    let size = image.size();
    let mut valid = Image::<u8, 1>::from_size_val(size, VALID)?;

    let mut eroder = Eroder {
        image: &mut *image,
        valid: &mut valid,
        targets,
        near_dist: params.near_dist as i64,
        max_non_black: params.max_non_black as usize,
        tie_break: params.tie_break,
        collapse_colors: params.collapse_colors,
        collapsed: 0,
    };
    eroder.run_pass(true);
    eroder.run_pass(false);

    let stats = CollapseStats {
        collapsed: eroder.collapsed,
        total: size.num_pixels(),
    };

    let alpha = if params.set_alpha {
        Some(alpha_band(image, &valid)?)
    } else {
        None
    };

    let mask = if params.set_mask { Some(valid) } else { None };

    Ok(NearBlackMasks { alpha, mask, stats })
}

/// Collapse the near-black border of a raster into a new raster.
///
/// Same as [`collapse_in_place`], leaving `src` untouched.
///
/// # Examples
///
/// ```
/// use nearblack_image::{Image, ImageSize};
/// use nearblack_imgproc::color::TargetColors;
/// use nearblack_imgproc::nearblack::{collapse, NearBlackParams};
///
/// let src = Image::<u8, 3>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![250, 252, 255, 10, 200, 30],
/// ).unwrap();
///
/// let params = NearBlackParams::default().with_max_non_black(0).with_set_alpha(true);
/// let out = collapse(&src, &TargetColors::white(3), &params).unwrap();
///
/// assert_eq!(out.image.as_slice(), &[255, 255, 255, 10, 200, 30]);
/// assert_eq!(out.alpha.unwrap().as_slice(), &[0, 255]);
/// ```
pub fn collapse<T: SampleType, const C: usize>(
    src: &Image<T, C>,
    targets: &TargetColors<T>,
    params: &NearBlackParams,
) -> Result<NearBlackOutput<T, C>, NearBlackError> {
    validate(src, targets, params)?;

    let mut image = src.clone();
    let NearBlackMasks { alpha, mask, stats } = collapse_in_place(&mut image, targets, params)?;

    Ok(NearBlackOutput {
        image,
        alpha,
        mask,
        stats,
    })
}

fn alpha_band<T: SampleType, const C: usize>(
    image: &mut Image<T, C>,
    valid: &Image<u8, 1>,
) -> Result<Image<T, 1>, NearBlackError> {
    if C == 4 {
        parallel::par_iter_rows(valid, image, |v, px| {
            if v[0] == INVALID {
                px[3] = T::zero();
            }
        })?;
        return Ok(image.channel(3)?);
    }

    let mut alpha = Image::<T, 1>::from_size_val(image.size(), T::zero())?;
    parallel::par_iter_rows_val(valid, &mut alpha, |v, a| {
        *a = if *v == VALID {
            T::max_value()
        } else {
            T::zero()
        };
    })?;

    Ok(alpha)
}
