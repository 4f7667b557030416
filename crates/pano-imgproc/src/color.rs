use crate::parallel;
use pano_image::{Image, ImageError};

/// Define the RGB weights for the grayscale conversion.
const RW: f64 = 0.299;
const GW: f64 = 0.587;
const BW: f64 = 0.114;

/// Reduce an image with any number of channels to a single luminance channel.
///
/// One channel is copied as is. Three or more channels use the RGB luma
/// weights on the first three:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// Two channels are averaged.
///
/// # Example
///
/// ```
/// use pano_image::{Image, ImageSize};
/// use pano_imgproc::color::gray_from_any;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let gray = gray_from_any(&image).unwrap();
/// assert_eq!(gray.num_channels(), 1);
/// assert_eq!(gray.size().width, 4);
/// ```
pub fn gray_from_any<T, const C: usize>(src: &Image<T, C>) -> Result<Image<T, 1>, ImageError>
where
    T: Send + Sync + num_traits::Float,
{
    let mut dst = Image::<T, 1>::from_size_val(src.size(), T::zero())?;

    let rw = T::from(RW).ok_or(ImageError::CastError)?;
    let gw = T::from(GW).ok_or(ImageError::CastError)?;
    let bw = T::from(BW).ok_or(ImageError::CastError)?;
    let n = T::from(C).ok_or(ImageError::CastError)?;

    // parallelize the grayscale conversion by rows
    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = match C {
            1 => src_pixel[0],
            c if c >= 3 => rw * src_pixel[0] + gw * src_pixel[1] + bw * src_pixel[2],
            _ => src_pixel.iter().fold(T::zero(), |acc, &v| acc + v) / n,
        };
    });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gray_from_rgb_weights() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new([2, 1].into(), vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0])?;
        let gray = gray_from_any(&image)?;
        assert_relative_eq!(gray.as_slice()[0], 0.299, epsilon = 1e-6);
        assert_relative_eq!(gray.as_slice()[1], 0.701, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_gray_from_rgba_ignores_alpha() -> Result<(), ImageError> {
        let image = Image::<f64, 4>::new([1, 1].into(), vec![0.0, 1.0, 0.0, 1.0])?;
        assert_relative_eq!(gray_from_any(&image)?.as_slice()[0], 0.587, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_gray_from_any() -> Result<(), ImageError> {
        let mono = Image::<f32, 1>::new([2, 1].into(), vec![0.25, 0.75])?;
        assert_eq!(gray_from_any(&mono)?, mono);

        let two = Image::<f32, 2>::new([1, 1].into(), vec![0.2, 0.6])?;
        assert_relative_eq!(gray_from_any(&two)?.as_slice()[0], 0.4, epsilon = 1e-6);

        let rgb = Image::<f32, 3>::from_size_val([1, 1].into(), 0.5)?;
        assert_relative_eq!(gray_from_any(&rgb)?.as_slice()[0], 0.5, epsilon = 1e-6);
        Ok(())
    }
}
