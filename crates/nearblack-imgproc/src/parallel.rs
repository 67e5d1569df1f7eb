use rayon::prelude::*;

use nearblack_image::{Image, ImageError};

fn check_same_size<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &Image<T2, C2>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Apply a function to each pixel in the image in parallel, row by row.
///
/// The function receives all the samples of a source pixel and of the matching destination pixel.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the two images differ in size.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) -> Result<(), ImageError>
where
    T1: Send + Sync,
    T2: Send + Sync,
{
    check_same_size(src, dst)?;
    if src.cols() == 0 || C1 == 0 || C2 == 0 {
        return Ok(());
    }

    let cols = src.cols();
    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });

    Ok(())
}

/// Apply a function to each sample of two single band images in parallel, row by row.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the two images differ in size.
pub fn par_iter_rows_val<T1, T2>(
    src: &Image<T1, 1>,
    dst: &mut Image<T2, 1>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) -> Result<(), ImageError>
where
    T1: Send + Sync,
    T2: Send + Sync,
{
    check_same_size(src, dst)?;
    if src.cols() == 0 {
        return Ok(());
    }

    let cols = src.cols();
    src.as_slice()
        .par_chunks_exact(cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .iter()
                .zip(dst_chunk.iter_mut())
                .for_each(|(src_val, dst_val)| {
                    f(src_val, dst_val);
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearblack_image::ImageSize;

    #[test]
    fn rows_pixelwise() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let mask = Image::<u8, 1>::new(size, vec![255, 0, 0, 255])?;
        let mut rgba = Image::<u8, 4>::from_size_val(size, 9)?;

        par_iter_rows(&mask, &mut rgba, |m, px| {
            if m[0] == 0 {
                px[3] = 0;
            }
        })?;

        assert_eq!(rgba.channel(3)?.as_slice(), &[9, 0, 0, 9]);
        assert_eq!(rgba.channel(0)?.as_slice(), &[9, 9, 9, 9]);
        Ok(())
    }

    #[test]
    fn rows_val() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let mask = Image::<u8, 1>::new(size, vec![0, 255, 0])?;
        let mut alpha = Image::<u16, 1>::from_size_val(size, 0)?;

        par_iter_rows_val(&mask, &mut alpha, |m, a| {
            *a = if *m > 0 { u16::MAX } else { 0 };
        })?;

        assert_eq!(alpha.as_slice(), &[0, u16::MAX, 0]);
        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<(), ImageError> {
        let mask = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        assert_eq!(
            par_iter_rows_val(&mask, &mut dst, |_, _| {}),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}
