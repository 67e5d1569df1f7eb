use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use nearblack_image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::error::IoError;

/// An 8-bit PNG image, tagged with its channel layout.
#[derive(Debug, Clone, PartialEq)]
pub enum PngImage {
    /// Grayscale, one channel.
    Mono8(Image<u8, 1>),
    /// Grayscale with alpha, two channels.
    MonoAlpha8(Image<u8, 2>),
    /// RGB, three channels.
    Rgb8(Image<u8, 3>),
    /// RGBA, four channels.
    Rgba8(Image<u8, 4>),
}

impl PngImage {
    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            PngImage::Mono8(image) => image.size(),
            PngImage::MonoAlpha8(image) => image.size(),
            PngImage::Rgb8(image) => image.size(),
            PngImage::Rgba8(image) => image.size(),
        }
    }

    /// Get the number of channels of the image.
    pub fn num_channels(&self) -> usize {
        match self {
            PngImage::Mono8(_) => 1,
            PngImage::MonoAlpha8(_) => 2,
            PngImage::Rgb8(_) => 3,
            PngImage::Rgba8(_) => 4,
        }
    }
}

/// Read an 8-bit PNG image of any channel layout.
///
/// Palette images are expanded to RGB or RGBA, and grayscale images with less than
/// 8 bits are expanded to 8 bits.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] for 16-bit images.
pub fn read_image_png(file_path: impl AsRef<Path>) -> Result<PngImage, IoError> {
    let (buf, size, color_type) = read_png_impl(file_path)?;

    Ok(match color_type {
        ColorType::Grayscale => PngImage::Mono8(Image::new(size, buf)?),
        ColorType::GrayscaleAlpha => PngImage::MonoAlpha8(Image::new(size, buf)?),
        ColorType::Rgb => PngImage::Rgb8(Image::new(size, buf)?),
        ColorType::Rgba => PngImage::Rgba8(Image::new(size, buf)?),
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed colors were not expanded".to_string(),
            ))
        }
    })
}

/// Read a PNG image with a single channel (mono8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn read_image_png_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    match read_image_png(file_path)? {
        PngImage::Mono8(image) => Ok(image),
        other => Err(channel_mismatch(other.num_channels(), 1)),
    }
}

/// Read a PNG image with three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_png_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    match read_image_png(file_path)? {
        PngImage::Rgb8(image) => Ok(image),
        other => Err(channel_mismatch(other.num_channels(), 3)),
    }
}

/// Read a PNG image with four channels (rgba8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGBA image with four channels (rgba8).
pub fn read_image_png_rgba8(file_path: impl AsRef<Path>) -> Result<Image<u8, 4>, IoError> {
    match read_image_png(file_path)? {
        PngImage::Rgba8(image) => Ok(image),
        other => Err(channel_mismatch(other.num_channels(), 4)),
    }
}

fn channel_mismatch(got: usize, expected: usize) -> IoError {
    IoError::UnsupportedFormat(format!("expected {expected} channels, found {got}"))
}

/// Write an 8-bit PNG image of any channel layout.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image to write.
pub fn write_image_png(file_path: impl AsRef<Path>, image: &PngImage) -> Result<(), IoError> {
    match image {
        PngImage::Mono8(image) => write_image_png_mono8(file_path, image),
        PngImage::MonoAlpha8(image) => write_image_png_mono_alpha8(file_path, image),
        PngImage::Rgb8(image) => write_image_png_rgb8(file_path, image),
        PngImage::Rgba8(image) => write_image_png_rgba8(file_path, image),
    }
}

/// Writes the given PNG _(mono8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The grayscale image.
pub fn write_image_png_mono8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Grayscale,
    )
}

/// Writes the given PNG _(mono8 with alpha)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The grayscale image with its alpha channel.
pub fn write_image_png_mono_alpha8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 2>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::GrayscaleAlpha,
    )
}

/// Writes the given PNG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The RGB image.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgb,
    )
}

/// Writes the given PNG _(rgba8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The RGBA image.
pub fn write_image_png_rgba8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 4>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgba,
    )
}

// utility function to read the png file
fn read_png_impl(
    file_path: impl AsRef<Path>,
) -> Result<(Vec<u8>, ImageSize, ColorType), IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    if let Some(extension) = file_path.extension() {
        if extension != "png" {
            return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
        }
    } else {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file = File::open(file_path)?;
    let mut decoder = Decoder::new(BufReader::new(file));
    decoder.set_transformations(Transformations::EXPAND);

    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    if info.bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "bit depth {:?}, only 8-bit images are supported",
            info.bit_depth
        )));
    }

    buf.truncate(info.buffer_size());

    log::debug!(
        "read {}: {}x{} {:?}",
        file_path.display(),
        info.width,
        info.height,
        info.color_type
    );

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };

    Ok((buf, size, info.color_type))
}

// utility function to write the png file
fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(
        BufWriter::new(file),
        image_size.width as u32,
        image_size.height as u32,
    );
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;

    fn ramp<const C: usize>(width: usize, height: usize) -> Result<Image<u8, C>, IoError> {
        let data = (0..width * height * C).map(|i| (i % 251) as u8).collect();
        Ok(Image::new(ImageSize { width, height }, data)?)
    }

    #[test]
    fn read_write_png_mono8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("mono8.png");

        let image = ramp::<1>(7, 5)?;
        write_image_png_mono8(&file_path, &image)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_png_mono8(&file_path)?;
        assert_eq!(image_back, image);

        Ok(())
    }

    #[test]
    fn read_write_png_any() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let images = [
            PngImage::MonoAlpha8(ramp::<2>(4, 3)?),
            PngImage::Rgb8(ramp::<3>(4, 3)?),
            PngImage::Rgba8(ramp::<4>(4, 3)?),
        ];

        for (i, image) in images.iter().enumerate() {
            let file_path = tmp_dir.path().join(format!("image-{i}.png"));
            write_image_png(&file_path, image)?;

            let image_back = read_image_png(&file_path)?;
            assert_eq!(image_back.num_channels(), image.num_channels());
            assert_eq!(image_back.size(), image.size());
            assert_eq!(&image_back, image);
        }

        Ok(())
    }

    #[test]
    fn read_png_wrong_layout() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("rgb8.png");
        write_image_png_rgb8(&file_path, &ramp::<3>(2, 2)?)?;

        assert!(matches!(
            read_image_png_rgba8(&file_path),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(read_image_png_rgb8(&file_path).is_ok());

        Ok(())
    }

    #[test]
    fn read_png_missing_or_wrong_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let missing = tmp_dir.path().join("missing.png");
        assert!(matches!(
            read_image_png(&missing),
            Err(IoError::FileDoesNotExist(_))
        ));

        let wrong = tmp_dir.path().join("image.jpg");
        std::fs::write(&wrong, b"not a png")?;
        assert!(matches!(
            read_image_png(&wrong),
            Err(IoError::InvalidFileExtension(_))
        ));

        let garbage = tmp_dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not a png")?;
        assert!(matches!(
            read_image_png(&garbage),
            Err(IoError::PngDecodeError(_))
        ));

        Ok(())
    }
}
