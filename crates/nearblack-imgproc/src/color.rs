use nearblack_image::SampleType;

use crate::error::NearBlackError;

/// How to pick a target when a pixel is near more than one color of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TieBreak {
    /// The first matching color in listed order wins.
    #[default]
    FirstListed,
    /// The matching color with the smallest Chebyshev distance wins, ties go to the first listed.
    Nearest,
}

/// Compute the Chebyshev (max-component) distance between a pixel and a color.
///
/// Only the samples present in both slices are compared.
///
/// # Examples
///
/// ```
/// use nearblack_imgproc::color::chebyshev_distance;
///
/// assert_eq!(chebyshev_distance(&[10u8, 250, 3], &[0, 255, 0]), 10);
/// ```
pub fn chebyshev_distance<T: SampleType>(pixel: &[T], target: &[T]) -> i64 {
    pixel
        .iter()
        .zip(target.iter())
        .map(|(&p, &t)| (p.to_i64() - t.to_i64()).abs())
        .max()
        .unwrap_or(0)
}

/// Check whether every band of a pixel lies within `near_dist` of a color.
///
/// # Arguments
///
/// * `pixel` - The color bands of the pixel.
/// * `target` - The target color, one sample per color band.
/// * `near_dist` - The largest absolute difference allowed per band.
///
/// # Examples
///
/// ```
/// use nearblack_imgproc::color::is_near;
///
/// assert!(is_near(&[12u8, 0, 15], &[0, 0, 0], 15));
/// assert!(!is_near(&[16u8, 0, 0], &[0, 0, 0], 15));
/// ```
pub fn is_near<T: SampleType>(pixel: &[T], target: &[T], near_dist: i64) -> bool {
    pixel
        .iter()
        .zip(target.iter())
        .all(|(&p, &t)| (p.to_i64() - t.to_i64()).abs() <= near_dist)
}

/// An ordered, non-empty set of colors a border is made of.
///
/// Every color carries one sample per color band of the raster it is matched against.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetColors<T> {
    colors: Vec<Vec<T>>,
}

impl<T: SampleType> TargetColors<T> {
    /// Create a set from a list of colors.
    ///
    /// # Errors
    ///
    /// Returns [`NearBlackError::EmptyTargets`] if the list is empty and
    /// [`NearBlackError::InvalidTarget`] if the colors do not share the same number of samples.
    ///
    /// # Examples
    ///
    /// ```
    /// use nearblack_imgproc::color::TargetColors;
    ///
    /// let targets = TargetColors::new(vec![vec![0u8, 0, 0], vec![255, 255, 255]]).unwrap();
    /// assert_eq!(targets.len(), 2);
    /// assert_eq!(targets.bands(), 3);
    /// ```
    pub fn new(colors: Vec<Vec<T>>) -> Result<Self, NearBlackError> {
        let expected = match colors.first() {
            Some(first) => first.len(),
            None => return Err(NearBlackError::EmptyTargets),
        };

        if let Some((index, color)) = colors
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

        Ok(Self { colors })
    }

    /// A single pure black target.
    pub fn black(bands: usize) -> Self {
        Self {
            colors: vec![vec![T::zero(); bands]],
        }
    }

    /// A single pure white target, the maximum value of the sample type in every band.
    pub fn white(bands: usize) -> Self {
        Self {
            colors: vec![vec![T::max_value(); bands]],
        }
    }

    /// Number of samples per color.
    pub fn bands(&self) -> usize {
        self.colors.first().map_or(0, Vec::len)
    }

    /// Number of colors in the set.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false, a set holds at least one color.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colors in listed order.
    pub fn colors(&self) -> &[Vec<T>] {
        &self.colors
    }

    /// Get a color by its position in the set.
    pub fn get(&self, index: usize) -> Option<&[T]> {
        self.colors.get(index).map(Vec::as_slice)
    }

    /// Find the color of the set a pixel is near to.
    ///
    /// # Arguments
    ///
    /// * `pixel` - The color bands of the pixel.
    /// * `near_dist` - The largest absolute difference allowed per band.
    /// * `tie_break` - How to choose between several matching colors.
    ///
    /// # Returns
    ///
    /// The index of the matched color, or `None` if the pixel is near none of them.
    ///
    /// # Examples
    ///
    /// ```
    /// use nearblack_imgproc::color::{TargetColors, TieBreak};
    ///
    /// let targets = TargetColors::new(vec![vec![0u8], vec![255]]).unwrap();
    /// assert_eq!(targets.find_match(&[250u8], 15, TieBreak::FirstListed), Some(1));
    /// assert_eq!(targets.find_match(&[128u8], 15, TieBreak::FirstListed), None);
    /// ```
    pub fn find_match(&self, pixel: &[T], near_dist: i64, tie_break: TieBreak) -> Option<usize> {
        match tie_break {
            TieBreak::FirstListed => self
                .colors
                .iter()
                .position(|color| is_near(pixel, color, near_dist)),
            TieBreak::Nearest => {
                let mut best: Option<(usize, i64)> = None;
                for (index, color) in self.colors.iter().enumerate() {
                    let distance = chebyshev_distance(pixel, color);
                    if distance > near_dist {
                        continue;
                    }
                    if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                        best = Some((index, distance));
                    }
                }
                best.map(|(index, _)| index)
            }
        }
    }
}
