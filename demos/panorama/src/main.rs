use argh::FromArgs;
use std::path::PathBuf;

use pano::imgproc::{draw, features};
use pano::io::{load_image, save_image};
use pano::PanoramaConfig;

#[derive(FromArgs)]
/// Detect, match and stitch two overlapping images into a panorama
struct Args {
    /// path to a JSON configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// absolute response threshold
    #[argh(option)]
    threshold: Option<f32>,

    /// scale of the response function
    #[argh(option)]
    sigma: Option<f32>,

    /// radius of the non-maximum suppression window
    #[argh(option)]
    nms: Option<usize>,

    /// odd side length of the descriptor patch
    #[argh(option)]
    window: Option<usize>,

    /// search this many pyramid octaves for keypoints
    #[argh(option)]
    octaves: Option<usize>,

    /// scales per pyramid octave, implies a scale space search
    #[argh(option)]
    scales: Option<usize>,

    /// RANSAC inlier distance in pixels
    #[argh(option)]
    inlier_threshold: Option<f64>,

    /// RANSAC iterations
    #[argh(option)]
    iterations: Option<usize>,

    /// stop RANSAC once this many inliers are found
    #[argh(option)]
    cutoff: Option<usize>,

    /// seed of the RANSAC sampler
    #[argh(option)]
    seed: Option<u64>,

    /// weight of the first image where both overlap
    #[argh(option)]
    blend: Option<f32>,

    /// print the resolved configuration as JSON
    #[argh(switch)]
    print_config: bool,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Corners(CornersArgs),
    Matches(PairArgs),
    Inliers(InliersArgs),
    Stitch(StitchArgs),
}

#[derive(FromArgs)]
/// Mark the keypoints of an image
#[argh(subcommand, name = "corners")]
struct CornersArgs {
    /// path to the input image
    #[argh(positional)]
    image: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o', default = "PathBuf::from(\"corners.png\")")]
    output: PathBuf,
}

#[derive(FromArgs)]
/// Draw the matches between two images
#[argh(subcommand, name = "matches")]
struct PairArgs {
    /// path to the first image
    #[argh(positional)]
    a: PathBuf,

    /// path to the second image
    #[argh(positional)]
    b: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o', default = "PathBuf::from(\"matches.png\")")]
    output: PathBuf,
}

#[derive(FromArgs)]
/// Draw the matches between two images with the RANSAC inliers in green
#[argh(subcommand, name = "inliers")]
struct InliersArgs {
    /// path to the first image
    #[argh(positional)]
    a: PathBuf,

    /// path to the second image
    #[argh(positional)]
    b: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o', default = "PathBuf::from(\"inliers.png\")")]
    output: PathBuf,
}

#[derive(FromArgs)]
/// Stitch two images into a panorama
#[argh(subcommand, name = "stitch")]
struct StitchArgs {
    /// path to the first image
    #[argh(positional)]
    a: PathBuf,

    /// path to the second image
    #[argh(positional)]
    b: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o', default = "PathBuf::from(\"panorama.png\")")]
    output: PathBuf,
}

fn resolve_config(args: &Args) -> Result<PanoramaConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PanoramaConfig::from_json_file(path)?,
        None => PanoramaConfig::default(),
    };

    if let Some(t) = args.threshold {
        config.detector.threshold = features::Threshold::Absolute(t);
    }
    if let Some(sigma) = args.sigma {
        config.detector.sigma = sigma;
    }
    if let Some(nms) = args.nms {
        config.detector.nms_radius = nms;
    }
    if let Some(window) = args.window {
        config.detector.window = window;
    }
    if args.octaves.is_some() || args.scales.is_some() {
        let mut pyramid = config.detector.scale_space.unwrap_or_default();
        if let Some(octaves) = args.octaves {
            pyramid.octaves = octaves;
        }
        if let Some(scales) = args.scales {
            pyramid.scales_per_octave = scales;
        }
        config.detector.scale_space = Some(pyramid);
    }
    if let Some(t) = args.inlier_threshold {
        config.ransac.inlier_threshold = t;
    }
    if let Some(iterations) = args.iterations {
        config.ransac.max_iterations = iterations;
    }
    if let Some(cutoff) = args.cutoff {
        config.ransac.cutoff = cutoff;
    }
    if args.seed.is_some() {
        config.ransac.random_seed = args.seed;
    }
    if let Some(blend) = args.blend {
        config.composite.blend = blend;
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let config = resolve_config(&args)?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    match args.command {
        Command::Corners(cmd) => {
            let image = load_image(&cmd.image)?;
            let keypoints = features::detect_keypoints(&image, &config.detector)?;
            log::info!("{} keypoints", keypoints.len());
            save_image(&cmd.output, &draw::mark_corners(&image, &keypoints))?;
        }
        Command::Matches(cmd) => {
            let (a, b) = (load_image(&cmd.a)?, load_image(&cmd.b)?);
            let (da, db, matches) = pano::find_matches(&a, &b, &config.detector)?;
            let a_marked = draw::mark_corners(&a, &da);
            let b_marked = draw::mark_corners(&b, &db);
            let lines = draw::draw_matches(&a_marked, &b_marked, &da, &db, &matches, &[])?;
            save_image(&cmd.output, &lines)?;
        }
        Command::Inliers(cmd) => {
            let (a, b) = (load_image(&cmd.a)?, load_image(&cmd.b)?);
            let registration = pano::register(&a, &b, &config)?;
            let lines = draw::draw_inliers(
                &a,
                &b,
                &registration.homography.model,
                &registration.keypoints_a,
                &registration.keypoints_b,
                &registration.matches,
                config.ransac.inlier_threshold,
            )?;
            save_image(&cmd.output, &lines)?;
        }
        Command::Stitch(cmd) => {
            let (a, b) = (load_image(&cmd.a)?, load_image(&cmd.b)?);
            let panorama = pano::panorama_image(&a, &b, &config)?;
            save_image(&cmd.output, &panorama)?;
        }
    }

    Ok(())
}
