use num_traits::{Bounded, Zero};

/// Trait for the fixed-width integer samples an image can hold.
///
/// Every sample widens losslessly into an `i64`, which is where color distances are computed.
/// The maximum value of the type marks a fully valid alpha sample, zero a fully invalid one.
///
/// Send and Sync are required to build outputs row by row in parallel.
pub trait SampleType:
    Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + Bounded + Zero + 'static
{
    /// Widen the sample into an `i64`.
    fn to_i64(self) -> i64;
}

macro_rules! impl_sample_type {
    ($($t:ty),*) => {
        $(
            impl SampleType for $t {
                #[inline]
                fn to_i64(self) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

impl_sample_type!(u8, u16, u32, i8, i16, i32);

#[cfg(test)]
mod tests {
    use super::SampleType;

    #[test]
    fn sample_widening() {
        assert_eq!(255u8.to_i64(), 255);
        assert_eq!(u32::MAX.to_i64(), 4_294_967_295);
        assert_eq!((-12i16).to_i64(), -12);
    }

    #[test]
    fn sample_bounds() {
        assert_eq!(<u8 as num_traits::Bounded>::max_value(), 255);
        assert_eq!(<u16 as num_traits::Zero>::zero(), 0);
    }
}
