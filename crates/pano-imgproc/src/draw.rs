use pano_geometry::{model_inliers, Mat33};
use pano_image::{Image, ImageError};

use crate::features::{matched_points, Descriptor, FeatureError, Match};

/// Color of keypoint markers.
pub const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];
/// Color of match lines.
pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
/// Color of inlier match lines.
pub const GREEN: [f32; 3] = [0.0, 1.0, 0.0];

// half length of the arms of a keypoint cross
const MARKER_RADIUS: i64 = 9;

// map an rgb color onto the first channels of an image
fn channels<const C: usize>(rgb: [f32; 3]) -> [f32; C] {
    let mut color = [0.0; C];
    color
        .iter_mut()
        .zip(rgb.iter())
        .for_each(|(c, &v)| *c = v);
    color
}

#[inline]
fn set_color<const C: usize>(img: &mut Image<f32, C>, x: i64, y: i64, color: [f32; C]) {
    for (ch, &v) in color.iter().enumerate() {
        img.set_pixel(x, y, ch, v);
    }
}

/// Draws a line on an image inplace using a standard Bresenham's line algorithm.
///
/// Pixels falling outside the image are skipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
pub fn draw_line<const C: usize>(
    img: &mut Image<f32, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [f32; C],
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        set_color(img, x0, y0, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draw a cross centred at a point.
pub fn mark_spot<const C: usize>(img: &mut Image<f32, C>, p: &[f64; 2]) {
    let (x, y) = (p[0] as i64, p[1] as i64);
    let color = channels::<C>(MAGENTA);
    for i in -MARKER_RADIUS..=MARKER_RADIUS {
        set_color(img, x + i, y, color);
        set_color(img, x, y + i, color);
    }
}

/// Return a copy of the image with a cross drawn on every keypoint.
pub fn mark_corners<const C: usize>(image: &Image<f32, C>, descriptors: &[Descriptor]) -> Image<f32, C> {
    let mut marked = image.clone();
    for d in descriptors {
        mark_spot(&mut marked, &d.point);
    }
    marked
}

/// Place two images next to each other.
///
/// The canvas is as wide as both images together and as tall as the taller
/// one; `a` sits on the left, `b` on the right and the rest is zero.
pub fn side_by_side<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
) -> Result<Image<f32, C>, ImageError> {
    let size = [a.width() + b.width(), a.height().max(b.height())];
    let mut both = Image::<f32, C>::from_size_val(size.into(), 0.0)?;

    let row_len = both.width() * C;
    for (offset, img) in [(0, a), (a.width() * C, b)] {
        let src_row = img.width() * C;
        if src_row == 0 {
            continue;
        }
        for (y, row) in img.as_slice().chunks_exact(src_row).enumerate() {
            let start = y * row_len + offset;
            both.as_slice_mut()[start..start + src_row].copy_from_slice(row);
        }
    }

    Ok(both)
}

/// Draw match lines between two images placed side by side.
///
/// Every match is drawn in red, then every inlier is drawn over it in green.
///
/// # Arguments
///
/// * `a` - The first image.
/// * `b` - The second image.
/// * `da` - The descriptors of `a`.
/// * `db` - The descriptors of `b`.
/// * `matches` - The matches to draw in red.
/// * `inliers` - The matches to draw in green.
pub fn draw_matches<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    da: &[Descriptor],
    db: &[Descriptor],
    matches: &[Match],
    inliers: &[Match],
) -> Result<Image<f32, C>, FeatureError> {
    let mut both = side_by_side(a, b)?;
    let shift = a.width() as f64;

    for (set, rgb) in [(matches, RED), (inliers, GREEN)] {
        let (x1, x2) = matched_points(da, db, set)?;
        let color = channels::<C>(rgb);
        for (p, q) in x1.iter().zip(x2.iter()) {
            draw_line(
                &mut both,
                (p[0] as i64, p[1] as i64),
                ((q[0] + shift) as i64, q[1] as i64),
                color,
            );
        }
    }

    Ok(both)
}

/// Draw the matches with the inliers of a homography highlighted.
///
/// # Arguments
///
/// * `h` - Homography mapping points of `a` onto points of `b`.
/// * `threshold` - Inlier distance in pixels.
pub fn draw_inliers<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    h: &Mat33,
    da: &[Descriptor],
    db: &[Descriptor],
    matches: &[Match],
    threshold: f64,
) -> Result<Image<f32, C>, FeatureError> {
    let (x1, x2) = matched_points(da, db, matches)?;
    let inliers = model_inliers(h, &x1, &x2, threshold)
        .into_iter()
        .map(|i| matches[i])
        .collect::<Vec<_>>();

    log::info!("{} inliers out of {} matches", inliers.len(), matches.len());

    draw_matches(a, b, da, db, matches, &inliers)
}
