use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use pano_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored row-major and interleaved, i.e. with shape (H, W, C).
/// Images are plain values: cloning copies the pixel buffer, so stages never
/// share mutable pixel data.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use pano_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0f32; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.width * size.height * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.width * size.height * CHANNELS,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and a constant pixel value.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * CHANNELS];
        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// The raw pixel data in (H, W, C) order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The raw pixel data in (H, W, C) order, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, ch: usize) -> usize {
        (y * self.size.width + x) * CHANNELS + ch
    }

    /// Get a reference to a sample addressed as `[row, col, channel]`.
    ///
    /// Returns `None` when the index falls outside the image.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [y, x, ch] = index;
        if x >= self.size.width || y >= self.size.height || ch >= CHANNELS {
            return None;
        }
        self.data.get(self.offset(x, y, ch))
    }

    /// Get a mutable reference to a sample addressed as `[row, col, channel]`.
    pub fn get_mut(&mut self, index: [usize; 3]) -> Option<&mut T> {
        let [y, x, ch] = index;
        if x >= self.size.width || y >= self.size.height || ch >= CHANNELS {
            return None;
        }
        let offset = self.offset(x, y, ch);
        self.data.get_mut(offset)
    }

    /// Get the pixel value at `(x, y)` for channel `ch`.
    ///
    /// # Errors
    ///
    /// If the coordinates or the channel are out of bounds, an error is returned.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if ch >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, CHANNELS));
        }

        Ok(self.data[self.offset(x, y, ch)])
    }

    /// Read a sample using clamped addressing.
    ///
    /// Coordinates outside `[0, w) x [0, h)` are moved to the nearest edge pixel.
    ///
    /// PRECONDITION: the image is not empty and `ch < CHANNELS`.
    #[inline]
    pub fn clamped_pixel(&self, x: i64, y: i64, ch: usize) -> T
    where
        T: Copy,
    {
        let x = x.clamp(0, self.size.width as i64 - 1) as usize;
        let y = y.clamp(0, self.size.height as i64 - 1) as usize;
        self.data[self.offset(x, y, ch)]
    }

    /// Write a sample, silently ignoring coordinates outside the image.
    #[inline]
    pub fn set_pixel(&mut self, x: i64, y: i64, ch: usize, val: T) {
        if x < 0 || y < 0 || ch >= CHANNELS {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let offset = self.offset(x, y, ch);
        self.data[offset] = val;
    }

    /// Get a channel of the image.
    ///
    /// # Errors
    ///
    /// If the channel index is out of bounds, an error is returned.
    pub fn channel(&self, channel: usize) -> Result<Image<T, 1>, ImageError>
    where
        T: Copy,
    {
        if channel >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(channel, CHANNELS));
        }

        let channel_data = self
            .data
            .chunks_exact(CHANNELS)
            .map(|pixel| pixel[channel])
            .collect();

        Image::new(self.size, channel_data)
    }

    /// Cast the pixel data to a different type and scale it.
    ///
    /// # Examples
    ///
    /// ```
    /// use pano_image::{Image, ImageSize};
    ///
    /// let image_u8 = Image::<u8, 3>::new(
    ///     ImageSize { height: 2, width: 1 },
    ///     vec![0u8, 0, 255, 0, 0, 255],
    /// ).unwrap();
    ///
    /// let image_f32 = image_u8.cast_and_scale::<f32>(1. / 255.0).unwrap();
    ///
    /// assert_eq!(image_f32.get([1, 0, 2]), Some(&1.0f32));
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast + std::ops::Mul<Output = U> + Copy,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .data
            .iter()
            .map(|&x| {
                let xu = U::from(x).ok_or(ImageError::CastError)?;
                Ok(xu * scale)
            })
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, casted_data)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(ImageSize::from([10, 20]), image_size);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new([10, 20].into(), vec![0.0; 10 * 20 * 3])?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 3);
        Ok(())
    }

    #[test]
    fn image_wrong_length() {
        let res = Image::<f32, 2>::new([2, 2].into(), vec![0.0; 7]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(7, 8)));
    }

    #[test]
    fn image_get_indexing() -> Result<(), ImageError> {
        // 3 wide, 2 high, 2 channels
        let data = (0..12).map(|v| v as f32).collect::<Vec<_>>();
        let image = Image::<f32, 2>::new([3, 2].into(), data)?;
        assert_eq!(image.get([0, 0, 0]), Some(&0.0));
        assert_eq!(image.get([0, 1, 1]), Some(&3.0));
        assert_eq!(image.get([1, 2, 1]), Some(&11.0));
        assert_eq!(image.get([2, 0, 0]), None);
        assert_eq!(image.get([0, 0, 2]), None);
        assert_eq!(image.get_pixel(2, 1, 0)?, 10.0);
        assert!(image.get_pixel(3, 0, 0).is_err());
        Ok(())
    }

    #[test]
    fn image_clamped_pixel() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f32, 1>::new(
            [3, 2].into(),
            vec![
                1.0, 2.0, 3.0,
                4.0, 5.0, 6.0,
            ],
        )?;
        assert_eq!(image.clamped_pixel(-5, -5, 0), 1.0);
        assert_eq!(image.clamped_pixel(10, -1, 0), 3.0);
        assert_eq!(image.clamped_pixel(-1, 7, 0), 4.0);
        assert_eq!(image.clamped_pixel(4, 4, 0), 6.0);
        assert_eq!(image.clamped_pixel(1, 1, 0), 5.0);
        Ok(())
    }

    #[test]
    fn image_set_pixel_ignores_out_of_bounds() -> Result<(), ImageError> {
        let mut image = Image::<f32, 1>::from_size_val([2, 2].into(), 0.0)?;
        image.set_pixel(-1, 0, 0, 1.0);
        image.set_pixel(0, 2, 0, 1.0);
        image.set_pixel(1, 1, 0, 7.0);
        assert_eq!(image.as_slice(), &[0.0, 0.0, 0.0, 7.0]);
        Ok(())
    }

    #[test]
    fn image_channel() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new([1, 2].into(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
        let channel = image.channel(2)?;
        assert_eq!(channel.as_slice(), &[2.0, 5.0]);
        assert_eq!(
            image.channel(3),
            Err(ImageError::ChannelIndexOutOfBounds(3, 3))
        );
        Ok(())
    }
}
