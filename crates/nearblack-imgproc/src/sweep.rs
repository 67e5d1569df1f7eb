/// How a sweep counts the non-matching pixels it has crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCounting {
    /// The count restarts at zero on every near pixel.
    Reset,
    /// The count accumulates over the whole line.
    Cumulative,
}

/// The state of a sweep walking one line of pixels from a raster edge inwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// No pixel visited yet.
    Edge,
    /// Inside a run of near pixels.
    Collapsing,
    /// Crossing non-matching pixels, holding how many were crossed.
    Overshoot(usize),
    /// The sweep reached content and visits nothing more.
    Stopped,
}

/// What a sweep sees when it visits a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    /// A valid pixel near the target color at the given index.
    Target(usize),
    /// A pixel already marked invalid, with the target color it is still near to, if any.
    Collapsed(Option<usize>),
    /// A valid pixel near none of the target colors.
    Content,
}

impl PixelClass {
    /// Whether a sweep treats the pixel as border.
    pub fn is_near(&self) -> bool {
        !matches!(self, PixelClass::Content)
    }
}

/// A sweep along one row or one column.
///
/// The sweep is fed the pixels of its line in walking order and answers, for each of them,
/// whether it has to be collapsed. A line that does not start on a near pixel is content
/// right from the edge and is left untouched.
///
/// # Examples
///
/// ```
/// use nearblack_imgproc::sweep::{LineSweep, PixelClass, RunCounting};
///
/// let mut sweep = LineSweep::new(1, RunCounting::Reset);
/// assert!(sweep.advance(PixelClass::Target(0)));
/// assert!(sweep.advance(PixelClass::Content));
/// assert!(!sweep.advance(PixelClass::Content));
/// assert!(sweep.is_stopped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSweep {
    state: SweepState,
    budget: usize,
    counting: RunCounting,
    fill_target: Option<usize>,
}

impl LineSweep {
    /// Create a sweep starting at the raster edge.
    ///
    /// # Arguments
    ///
    /// * `budget` - The number of non-matching pixels the sweep may cross before stopping.
    /// * `counting` - How the crossed pixels are counted.
    pub fn new(budget: usize, counting: RunCounting) -> Self {
        Self {
            state: SweepState::Edge,
            budget,
            counting,
            fill_target: None,
        }
    }

    /// Visit the next pixel of the line.
    ///
    /// Returns true if the pixel has to be collapsed.
    pub fn advance(&mut self, class: PixelClass) -> bool {
        let near = class.is_near();

        let collapse = match self.state {
            SweepState::Stopped => false,
            SweepState::Edge => {
                self.state = if near {
                    SweepState::Collapsing
                } else {
                    SweepState::Stopped
                };
                near
            }
            SweepState::Collapsing | SweepState::Overshoot(_) if near => {
                if self.counting == RunCounting::Reset {
                    self.state = SweepState::Collapsing;
                }
                true
            }
            SweepState::Collapsing => self.overshoot(1),
            SweepState::Overshoot(crossed) => self.overshoot(crossed + 1),
        };

        if collapse {
            if let PixelClass::Target(index) | PixelClass::Collapsed(Some(index)) = class {
                self.fill_target = Some(index);
            }
        }

        collapse
    }

    fn overshoot(&mut self, crossed: usize) -> bool {
        if crossed > self.budget {
            self.state = SweepState::Stopped;
            false
        } else {
            self.state = SweepState::Overshoot(crossed);
            true
        }
    }

    /// Whether the sweep visits nothing more.
    pub fn is_stopped(&self) -> bool {
        self.state == SweepState::Stopped
    }

    /// The current state of the sweep.
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// The last target color matched on this line, used to rewrite overshoot pixels.
    pub fn fill_target(&self) -> Option<usize> {
        self.fill_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: PixelClass = PixelClass::Target(0);
    const C: PixelClass = PixelClass::Content;
    const X: PixelClass = PixelClass::Collapsed(None);

    fn run(sweep: &mut LineSweep, line: &[PixelClass]) -> Vec<bool> {
        line.iter().map(|&class| sweep.advance(class)).collect()
    }

    #[test]
    fn content_at_edge_stops() {
        let mut sweep = LineSweep::new(5, RunCounting::Reset);
        assert_eq!(run(&mut sweep, &[C, T, T]), vec![false, false, false]);
        assert!(sweep.is_stopped());
        assert_eq!(sweep.fill_target(), None);
    }

    #[test]
    fn overshoot_within_budget() {
        let mut sweep = LineSweep::new(2, RunCounting::Reset);
        assert_eq!(
            run(&mut sweep, &[T, T, C, C, C, C]),
            vec![true, true, true, true, false, false]
        );
        assert_eq!(sweep.state(), SweepState::Stopped);
    }

    #[test]
    fn zero_budget() {
        let mut sweep = LineSweep::new(0, RunCounting::Reset);
        assert_eq!(run(&mut sweep, &[X, T, C, T]), vec![true, true, false, false]);
    }

    #[test]
    fn reset_counting() {
        let mut sweep = LineSweep::new(1, RunCounting::Reset);
        assert_eq!(
            run(&mut sweep, &[T, C, T, C, T, C, C]),
            vec![true, true, true, true, true, true, false]
        );
    }

    #[test]
    fn cumulative_counting() {
        let mut sweep = LineSweep::new(1, RunCounting::Cumulative);
        assert_eq!(
            run(&mut sweep, &[T, C, T, C, T]),
            vec![true, true, true, false, false]
        );
        assert!(sweep.is_stopped());
    }

    #[test]
    fn cumulative_keeps_overshoot_state() {
        let mut sweep = LineSweep::new(3, RunCounting::Cumulative);
        run(&mut sweep, &[T, C, T]);
        assert_eq!(sweep.state(), SweepState::Overshoot(1));

        let mut sweep = LineSweep::new(3, RunCounting::Reset);
        run(&mut sweep, &[T, C, T]);
        assert_eq!(sweep.state(), SweepState::Collapsing);
    }

    #[test]
    fn fill_target_follows_last_match() {
        let mut sweep = LineSweep::new(1, RunCounting::Reset);
        sweep.advance(PixelClass::Target(1));
        assert_eq!(sweep.fill_target(), Some(1));
        sweep.advance(X);
        assert_eq!(sweep.fill_target(), Some(1));
        sweep.advance(PixelClass::Target(0));
        assert_eq!(sweep.fill_target(), Some(0));
        sweep.advance(C);
        assert_eq!(sweep.fill_target(), Some(0));
        sweep.advance(PixelClass::Collapsed(Some(1)));
        assert_eq!(sweep.fill_target(), Some(1));
    }
}
