use std::path::Path;

use image::ColorType;
use pano_image::{Image, ImageSize};

use crate::error::IoError;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

fn has_supported_extension(file_path: &Path) -> bool {
    file_path.extension().is_some_and(|ext| {
        let ext = ext.to_ascii_lowercase();
        SUPPORTED_EXTENSIONS.iter().any(|s| ext == *s)
    })
}

/// Reads an image from the given file path as RGB floats in `[0, 1]`.
///
/// Any format supported by the image crate is accepted. Grayscale and RGBA
/// files are converted to RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image with three channels.
pub fn load_image(file_path: impl AsRef<Path>) -> Result<Image<f32, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let image = Image::<u8, 3>::new(size, img.into_rgb8().into_raw())?;
    log::debug!("loaded {} image from {}", size, file_path.display());

    Ok(image.cast_and_scale(1.0 / 255.0)?)
}

/// Writes an image to the given file path.
///
/// Samples are clamped to `[0, 1]` and stored as 8 bits. The format follows
/// the extension, which must be `png`, `jpg` or `jpeg`.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - An image with 1, 3 or 4 channels.
pub fn save_image<const C: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<f32, C>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    if !has_supported_extension(file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let color = match C {
        1 => ColorType::L8,
        3 => ColorType::Rgb8,
        4 => ColorType::Rgba8,
        _ => return Err(IoError::UnsupportedChannels(C)),
    };

    let data = image
        .as_slice()
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect::<Vec<_>>();

    image::save_buffer(
        file_path,
        &data,
        image.width() as u32,
        image.height() as u32,
        color,
    )?;

    log::debug!("saved {} image to {}", image.size(), file_path.display());

    Ok(())
}
