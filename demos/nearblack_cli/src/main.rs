use argh::FromArgs;
use std::path::PathBuf;

use nearblack::{
    image::{Image, ImageError},
    imgproc::{
        color::{TargetColors, TieBreak},
        nearblack::{collapse_in_place, NearBlackMasks, NearBlackParams},
        NearBlackError,
    },
    io::png::{self, PngImage},
};

/// Collapse the nearly black (or white) borders of an image and mark them invalid
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the input png image
    #[argh(positional)]
    input: PathBuf,

    /// path to the output png image, the input is updated in place if omitted
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// search for nearly white pixels instead of nearly black
    #[argh(switch)]
    white: bool,

    /// a border color as comma separated band values, e.g. 0,0,0 (repeatable)
    #[argh(option, from_str_fn(parse_color))]
    color: Vec<Vec<u8>>,

    /// how far from the border colors a pixel may be per band
    #[argh(option, default = "15")]
    near: i32,

    /// number of non-matching pixels a sweep may cross before it stops
    #[argh(option, default = "2")]
    nb: i32,

    /// add an alpha band, or update the existing one
    #[argh(switch)]
    setalpha: bool,

    /// write a validity mask next to the output as <stem>.msk.png
    #[argh(switch)]
    setmask: bool,

    /// pick the nearest border color when a pixel is near several
    #[argh(switch)]
    nearest: bool,

    /// only log warnings and errors
    #[argh(switch, short = 'q')]
    quiet: bool,
}

fn parse_color(value: &str) -> Result<Vec<u8>, String> {
    value
        .split(',')
        .map(|band| {
            band.trim()
                .parse::<u8>()
                .map_err(|e| format!("invalid color band `{band}`: {e}"))
        })
        .collect()
}

impl Args {
    fn params(&self) -> NearBlackParams {
        NearBlackParams::default()
            .with_near_dist(self.near)
            .with_max_non_black(self.nb)
            .with_set_alpha(self.setalpha)
            .with_set_mask(self.setmask)
            .with_tie_break(if self.nearest {
                TieBreak::Nearest
            } else {
                TieBreak::FirstListed
            })
    }

    fn targets(&self, bands: usize) -> Result<TargetColors<u8>, NearBlackError> {
        if !self.color.is_empty() {
            TargetColors::new(self.color.clone())
        } else if self.white {
            Ok(TargetColors::white(bands))
        } else {
            Ok(TargetColors::black(bands))
        }
    }

    fn output(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.input.clone())
    }
}

/// Append an alpha band to an image, producing an image with one more channel.
fn append_alpha<const C: usize, const D: usize>(
    image: &Image<u8, C>,
    alpha: &Image<u8, 1>,
) -> Result<Image<u8, D>, ImageError> {
    if D != C + 1 {
        return Err(ImageError::InvalidChannelShape(D, C + 1));
    }

    if image.size() != alpha.size() {
        return Err(ImageError::InvalidImageSize(
            image.cols(),
            image.rows(),
            alpha.cols(),
            alpha.rows(),
        ));
    }

    let mut data = Vec::with_capacity(image.size().num_pixels() * D);
    for (pixel, a) in image.as_slice().chunks_exact(C).zip(alpha.as_slice()) {
        data.extend_from_slice(pixel);
        data.push(*a);
    }

    Image::new(image.size(), data)
}

/// Keep the lowest of two alpha bands per pixel.
fn intersect_alpha(
    existing: &Image<u8, 1>,
    computed: &Image<u8, 1>,
) -> Result<Image<u8, 1>, ImageError> {
    let data = existing
        .as_slice()
        .iter()
        .zip(computed.as_slice())
        .map(|(a, b)| *a.min(b))
        .collect();
    Image::new(existing.size(), data)
}

fn collapse_image<const C: usize>(
    mut image: Image<u8, C>,
    targets: &TargetColors<u8>,
    params: &NearBlackParams,
) -> Result<(Image<u8, C>, NearBlackMasks<u8>), NearBlackError> {
    let masks = collapse_in_place(&mut image, targets, params)?;
    log::info!(
        "collapsed {} of {} pixels ({:.2}%)",
        masks.stats.collapsed,
        masks.stats.total,
        100.0 * masks.stats.collapsed_ratio()
    );
    Ok((image, masks))
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.white && !args.color.is_empty() {
        return Err("--white and --color are mutually exclusive".into());
    }

    let params = args.params();
    let output = args.output();

    let image = png::read_image_png(&args.input)?;
    log::info!(
        "processing {} ({}, {} channels) into {}",
        args.input.display(),
        image.size(),
        image.num_channels(),
        output.display()
    );
    log::debug!("{params:?}");

    let (result, mask) = match image {
        PngImage::Mono8(gray) => {
            let (gray, masks) = collapse_image(gray, &args.targets(1)?, &params)?;
            let result = match masks.alpha {
                Some(alpha) => PngImage::MonoAlpha8(append_alpha(&gray, &alpha)?),
                None => PngImage::Mono8(gray),
            };
            (result, masks.mask)
        }
        PngImage::MonoAlpha8(gray_alpha) => {
            let existing = gray_alpha.channel(1)?;
            let (gray, masks) =
                collapse_image(gray_alpha.channel(0)?, &args.targets(1)?, &params)?;
            let alpha = match masks.alpha {
                Some(alpha) => intersect_alpha(&existing, &alpha)?,
                None => existing,
            };
            (
                PngImage::MonoAlpha8(append_alpha(&gray, &alpha)?),
                masks.mask,
            )
        }
        PngImage::Rgb8(rgb) => {
            let (rgb, masks) = collapse_image(rgb, &args.targets(3)?, &params)?;
            let result = match masks.alpha {
                Some(alpha) => PngImage::Rgba8(append_alpha(&rgb, &alpha)?),
                None => PngImage::Rgb8(rgb),
            };
            (result, masks.mask)
        }
        PngImage::Rgba8(rgba) => {
            let (rgba, masks) = collapse_image(rgba, &args.targets(3)?, &params)?;
            (PngImage::Rgba8(rgba), masks.mask)
        }
    };

    png::write_image_png(&output, &result)?;

    if let Some(mask) = mask {
        let mask_path = output.with_extension("msk.png");
        png::write_image_png_mono8(&mask_path, &mask)?;
        log::info!("wrote validity mask {}", mask_path.display());
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    run(&args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearblack::image::ImageSize;

    fn args(input: PathBuf, output: Option<PathBuf>) -> Args {
        Args {
            input,
            output,
            white: false,
            color: vec![],
            near: 15,
            nb: 0,
            setalpha: false,
            setmask: false,
            nearest: false,
            quiet: true,
        }
    }

    #[test]
    fn parse_colors() {
        assert_eq!(parse_color("0,0,0"), Ok(vec![0, 0, 0]));
        assert_eq!(parse_color("255, 128 ,3"), Ok(vec![255, 128, 3]));
        assert!(parse_color("0,256,0").is_err());
        assert!(parse_color("a").is_err());
    }

    #[test]
    fn append_and_intersect_alpha() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let rgb = Image::<u8, 3>::new(size, vec![1, 2, 3, 4, 5, 6])?;
        let alpha = Image::<u8, 1>::new(size, vec![0, 255])?;

        let rgba: Image<u8, 4> = append_alpha(&rgb, &alpha)?;
        assert_eq!(rgba.as_slice(), &[1, 2, 3, 0, 4, 5, 6, 255]);

        let wrong: Result<Image<u8, 2>, _> = append_alpha(&rgb, &alpha);
        assert_eq!(wrong, Err(ImageError::InvalidChannelShape(2, 4)));

        let existing = Image::<u8, 1>::new(size, vec![200, 100])?;
        assert_eq!(intersect_alpha(&existing, &alpha)?.as_slice(), &[0, 100]);
        Ok(())
    }

    #[test]
    fn rgb_with_alpha_and_mask() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let input = tmp_dir.path().join("input.png");
        let output = tmp_dir.path().join("output.png");

        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let rgb = Image::<u8, 3>::new(size, vec![2, 2, 2, 90, 120, 30, 250, 250, 250])?;
        png::write_image_png_rgb8(&input, &rgb)?;

        let mut args = args(input.clone(), Some(output.clone()));
        args.setalpha = true;
        args.setmask = true;
        args.color = vec![vec![0, 0, 0], vec![255, 255, 255]];
        run(&args)?;

        let rgba = png::read_image_png_rgba8(&output)?;
        assert_eq!(
            rgba.as_slice(),
            &[0, 0, 0, 0, 90, 120, 30, 255, 255, 255, 255, 0]
        );

        let mask = png::read_image_png_mono8(tmp_dir.path().join("output.msk.png"))?;
        assert_eq!(mask.as_slice(), &[0, 255, 0]);

        // the input is left untouched
        assert_eq!(png::read_image_png_rgb8(&input)?, rgb);
        Ok(())
    }

    #[test]
    fn gray_in_place() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let input = tmp_dir.path().join("gray.png");

        let size = ImageSize {
            width: 3,
            height: 1,
        };
        png::write_image_png_mono8(&input, &Image::<u8, 1>::new(size, vec![250, 100, 248])?)?;

        let mut args = args(input.clone(), None);
        args.white = true;
        run(&args)?;

        assert_eq!(png::read_image_png_mono8(&input)?.as_slice(), &[255, 100, 255]);
        Ok(())
    }

    #[test]
    fn white_and_color_conflict() {
        let mut args = args(PathBuf::from("missing.png"), None);
        args.white = true;
        args.color = vec![vec![0]];
        assert!(run(&args).is_err());
    }
}
