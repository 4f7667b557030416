use rand::{rngs::StdRng, Rng, SeedableRng};

use pano::geometry::{compute_homography, model_inliers, project_point, Mat33, RansacParams};
use pano::image::{Image, ImageSize};
use pano::imgproc::features::{match_descriptors, ScaleSpaceConfig};
use pano::{find_matches, panorama_image, register, PanoramaConfig, PanoramaError};

const BLOCK: usize = 8;
const SHIFT: usize = 40;

// a mosaic of flat blocks with random colors, full of corners
fn mosaic(width: usize, height: usize, seed: u64) -> Result<Image<f32, 3>, PanoramaError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (bx, by) = (width.div_ceil(BLOCK), height.div_ceil(BLOCK));
    let colors = (0..bx * by)
        .map(|_| [0; 3].map(|_: i32| rng.random_range(0.1f32..1.0)))
        .collect::<Vec<_>>();

    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&colors[(y / BLOCK) * bx + x / BLOCK]);
        }
    }
    Ok(Image::new(ImageSize { width, height }, data)?)
}

fn crop(src: &Image<f32, 3>, x0: usize, width: usize) -> Result<Image<f32, 3>, PanoramaError> {
    let mut data = Vec::with_capacity(width * src.height() * 3);
    for y in 0..src.height() {
        let start = (y * src.width() + x0) * 3;
        data.extend_from_slice(&src.as_slice()[start..start + width * 3]);
    }
    Ok(Image::new(
        ImageSize {
            width,
            height: src.height(),
        },
        data,
    )?)
}

fn test_config() -> PanoramaConfig {
    PanoramaConfig {
        ransac: RansacParams {
            max_iterations: 2000,
            random_seed: Some(42),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn register_translated_crops() -> Result<(), PanoramaError> {
    let scene = mosaic(160, 120, 1)?;
    let a = crop(&scene, 0, 100)?;
    let b = crop(&scene, SHIFT, 100)?;

    let registration = register(&a, &b, &test_config())?;
    assert!(registration.matches.len() >= 20);
    assert!(registration.homography.inlier_count() >= 20);

    let h = registration.homography.model;
    for p in [[50.0, 60.0], [80.0, 10.0], [45.0, 110.0]] {
        let q = project_point(&h, &p);
        assert!((q[0] - (p[0] - SHIFT as f64)).abs() < 0.5, "{p:?} -> {q:?}");
        assert!((q[1] - p[1]).abs() < 0.5, "{p:?} -> {q:?}");
    }
    Ok(())
}

#[test]
fn register_translated_crops_in_scale_space() -> Result<(), PanoramaError> {
    let scene = mosaic(160, 120, 1)?;
    let a = crop(&scene, 0, 100)?;
    let b = crop(&scene, SHIFT, 100)?;

    let mut config = test_config();
    config.detector.scale_space = Some(ScaleSpaceConfig {
        octaves: 2,
        scales_per_octave: 2,
    });

    let registration = register(&a, &b, &config)?;
    assert!(registration.homography.inlier_count() >= 20);

    // keypoints of the second octave are mapped back to full resolution
    assert!(registration
        .keypoints_a
        .iter()
        .all(|d| d.point[0] < 100.0 && d.point[1] < 120.0));

    let h = registration.homography.model;
    for p in [[50.0, 60.0], [80.0, 10.0], [45.0, 110.0]] {
        let q = project_point(&h, &p);
        assert!((q[0] - (p[0] - SHIFT as f64)).abs() < 1.0, "{p:?} -> {q:?}");
        assert!((q[1] - p[1]).abs() < 1.0, "{p:?} -> {q:?}");
    }
    Ok(())
}

#[test]
fn matches_are_mutual_and_unique() -> Result<(), PanoramaError> {
    let scene = mosaic(120, 80, 2)?;
    let a = crop(&scene, 0, 80)?;
    let b = crop(&scene, 24, 80)?;

    let (da, db, matches) = find_matches(&a, &b, &test_config().detector)?;
    assert!(!matches.is_empty());

    let mut used_a = vec![false; da.len()];
    let mut used_b = vec![false; db.len()];
    for m in &matches {
        assert!(!used_a[m.a] && !used_b[m.b]);
        used_a[m.a] = true;
        used_b[m.b] = true;
    }

    // matching is symmetric up to swapping the roles of a and b
    let swapped = match_descriptors(&db, &da)?;
    assert_eq!(swapped.len(), matches.len());
    for m in &swapped {
        assert!(matches.iter().any(|n| n.a == m.b && n.b == m.a));
    }
    Ok(())
}

#[test]
fn stitch_translated_crops() -> Result<(), PanoramaError> {
    let scene = mosaic(160, 120, 3)?;
    let a = crop(&scene, 0, 100)?;
    let b = crop(&scene, SHIFT, 100)?;

    let pano = panorama_image(&a, &b, &test_config())?;
    assert!((137..=140).contains(&pano.width()), "width {}", pano.width());
    assert!((118..=121).contains(&pano.height()), "height {}", pano.height());

    // left of the overlap only a contributes
    for y in 0..pano.height().min(120) {
        for x in 0..SHIFT {
            for c in 0..3 {
                assert_eq!(pano.get_pixel(x, y, c)?, scene.get_pixel(x, y, c)?);
            }
        }
    }

    // right of a, block centers are resampled from b
    for y in (BLOCK / 2..112).step_by(BLOCK) {
        for x in (100..136).step_by(BLOCK) {
            for c in 0..3 {
                let (got, want) = (pano.get_pixel(x, y, c)?, scene.get_pixel(x, y, c)?);
                assert!((got - want).abs() < 1e-3, "({x}, {y}, {c}): {got} != {want}");
            }
        }
    }
    Ok(())
}

#[test]
fn flat_images_fall_back_to_identity() -> Result<(), PanoramaError> {
    let a = Image::<f32, 3>::from_size_val([30, 20].into(), 0.5)?;

    let registration = register(&a, &a, &test_config())?;
    assert!(registration.keypoints_a.is_empty());
    assert!(registration.matches.is_empty());
    assert_eq!(registration.homography.model, pano::geometry::linalg::IDENTITY);

    let pano = panorama_image(&a, &a, &test_config())?;
    assert_eq!(pano, a);
    Ok(())
}

#[test]
fn homography_round_trip() -> Result<(), PanoramaError> {
    #[rustfmt::skip]
    let h_true: Mat33 = [
        [1.1, 0.05, 12.0],
        [-0.03, 0.95, -4.0],
        [2e-4, -1e-4, 1.0],
    ];
    let mut rng = StdRng::seed_from_u64(5);
    let x1 = (0..30)
        .map(|_| [rng.random_range(0.0..300.0), rng.random_range(0.0..200.0)])
        .collect::<Vec<_>>();
    let x2 = x1.iter().map(|p| project_point(&h_true, p)).collect::<Vec<_>>();

    let h = compute_homography(&x1, &x2)?;
    for (row, row_true) in h.iter().zip(h_true.iter()) {
        for (v, v_true) in row.iter().zip(row_true.iter()) {
            approx::assert_relative_eq!(v, v_true, epsilon = 1e-6);
        }
    }
    assert_eq!(model_inliers(&h, &x1, &x2, 1e-3).len(), x1.len());
    Ok(())
}

#[test]
fn save_and_reload_panorama() -> Result<(), Box<dyn std::error::Error>> {
    let scene = mosaic(64, 48, 4)?;
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("scene.png");

    pano::io::save_image(&path, &scene)?;
    let loaded = pano::io::load_image(&path)?;
    assert_eq!(loaded.size(), scene.size());
    for (x, y) in loaded.as_slice().iter().zip(scene.as_slice()) {
        assert!((x - y).abs() <= 0.5 / 255.0 + 1e-6);
    }
    Ok(())
}
