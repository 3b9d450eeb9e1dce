use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use image_fingerprint_core::{
    codec, compute_hash, detect_and_crop_with, find_duplicate_groups, similarity, Config,
    ImageFormat, LogLevel, PerceptualHash,
};

mod discovery;

#[derive(Parser)]
#[command(name = "image-fingerprint")]
#[command(about = "Crop images to their content and find near-duplicates")]
#[command(version)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop an image to its non-background content
    Crop {
        /// Image to crop
        input: PathBuf,

        /// Where to write the crop; the extension selects the format
        #[arg(short, long)]
        output: PathBuf,

        /// Margin around the detected content, in pixels
        #[arg(long)]
        padding: Option<u32>,

        /// Channel value at or above which a pixel is background
        #[arg(long)]
        background_threshold: Option<u8>,

        /// Alpha value at or below which a pixel is transparent
        #[arg(long)]
        alpha_threshold: Option<u8>,

        /// JPEG quality for the output
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
    },

    /// Print the perceptual hash of each image
    Hash {
        /// Images to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Side length of the hash grid
        #[arg(long)]
        grid_size: Option<u32>,

        /// Print hashes as hex instead of bit strings
        #[arg(long)]
        hex: bool,
    },

    /// Score how similar two images are
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Side length of the hash grid
        #[arg(long)]
        grid_size: Option<u32>,
    },

    /// Scan files and directories for near-duplicate images
    Dedupe {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Minimum similarity (0-100) for two images to be duplicates
        #[arg(long)]
        threshold: Option<f64>,

        /// Side length of the hash grid
        #[arg(long)]
        grid_size: Option<u32>,

        /// Maximum directory depth for scanning
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "image-fingerprint.json")]
        path: PathBuf,
    },
}

fn init_logger(verbose: u8, level: LogLevel) {
    let level = match verbose {
        0 => level.into(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn decode_file(path: &Path) -> anyhow::Result<image_fingerprint_core::DecodedImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    codec::decode(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

fn hash_file(path: &Path, grid_size: u32) -> anyhow::Result<PerceptualHash> {
    let image = decode_file(path)?;
    compute_hash(&image, grid_size).with_context(|| format!("Failed to hash {}", path.display()))
}

fn run_crop(
    config: &Config,
    input: &Path,
    output: &Path,
    quality: Option<u8>,
) -> anyhow::Result<()> {
    let format = output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .with_context(|| format!("Cannot tell output format from {}", output.display()))?;

    let image = decode_file(input)?;
    let result = detect_and_crop_with(&image, &config.crop)?;

    if result.is_fallback() {
        info!("Keeping whole image for {}", input.display());
    }

    let bytes = codec::encode(
        &result.cropped,
        format,
        Some(quality.unwrap_or(config.jpeg_quality)),
    )?;
    fs::write(output, bytes).with_context(|| format!("Failed to write {}", output.display()))?;

    let b = result.bounds;
    println!(
        "{}: {}x{} -> ({}, {})-({}, {}) {}x{}",
        input.display(),
        result.original_width,
        result.original_height,
        b.min_x,
        b.min_y,
        b.max_x,
        b.max_y,
        b.width(),
        b.height()
    );
    Ok(())
}

fn run_hash(files: &[PathBuf], grid_size: u32, hex: bool) -> anyhow::Result<()> {
    let results: Vec<_> = files
        .par_iter()
        .map(|path| hash_file(path, grid_size))
        .collect();

    let mut failures = 0;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(hash) if hex => println!("{}  {}", hash.to_hex(), path.display()),
            Ok(hash) => println!("{}  {}", hash, path.display()),
            Err(e) => {
                warn!("{:#}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} images could not be hashed", failures, files.len());
    }
    Ok(())
}

fn run_compare(first: &Path, second: &Path, grid_size: u32) -> anyhow::Result<()> {
    let a = hash_file(first, grid_size)?;
    let b = hash_file(second, grid_size)?;

    println!("{}", similarity(&a, &b)?);
    Ok(())
}

fn run_dedupe(
    paths: &[PathBuf],
    threshold: f64,
    grid_size: u32,
    max_depth: Option<usize>,
) -> anyhow::Result<()> {
    info!("Discovering images...");
    let images = discovery::discover_images(paths, max_depth);
    info!("Found {} images", images.len());

    // Create a progress bar with style
    let progress_bar = ProgressBar::new(images.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Computing image hashes...");

    let hashed: Vec<(PathBuf, PerceptualHash)> = images
        .par_iter()
        .filter_map(|path| {
            let result = hash_file(path, grid_size);
            progress_bar.inc(1);
            match result {
                Ok(hash) => Some((path.clone(), hash)),
                Err(e) => {
                    warn!("Skipping: {:#}", e);
                    None
                }
            }
        })
        .collect();
    progress_bar.finish_with_message("Done");

    let (files, hashes): (Vec<PathBuf>, Vec<PerceptualHash>) = hashed.into_iter().unzip();
    let groups = find_duplicate_groups(&hashes, threshold)?;

    if groups.is_empty() {
        println!("No duplicates among {} images", files.len());
        return Ok(());
    }

    for (n, group) in groups.iter().enumerate() {
        println!("Group {} ({} images):", n + 1, group.members.len());
        let first = &hashes[group.members[0]];
        for &member in &group.members {
            println!(
                "  {:>4}  {}",
                similarity(first, &hashes[member])?.to_string(),
                files[member].display()
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up configuration
    let mut config = load_config(cli.config.as_deref())?;

    // Initialize logger
    init_logger(cli.verbose, config.log_level);

    match cli.command {
        Commands::Crop {
            input,
            output,
            padding,
            background_threshold,
            alpha_threshold,
            quality,
        } => {
            // Override config with command line arguments
            if let Some(padding) = padding {
                config.crop.padding = padding;
            }
            if let Some(threshold) = background_threshold {
                config.crop.background_threshold = threshold;
            }
            if let Some(threshold) = alpha_threshold {
                config.crop.alpha_threshold = threshold;
            }
            config.validate()?;

            run_crop(&config, &input, &output, quality)
        }

        Commands::Hash {
            files,
            grid_size,
            hex,
        } => {
            config.grid_size = grid_size.unwrap_or(config.grid_size);
            config.validate()?;
            configure_threads(&config)?;

            run_hash(&files, config.grid_size, hex)
        }

        Commands::Compare {
            first,
            second,
            grid_size,
        } => {
            config.grid_size = grid_size.unwrap_or(config.grid_size);
            config.validate()?;

            run_compare(&first, &second, config.grid_size)
        }

        Commands::Dedupe {
            paths,
            threshold,
            grid_size,
            max_depth,
        } => {
            config.grid_size = grid_size.unwrap_or(config.grid_size);
            config.similarity_threshold = threshold.unwrap_or(config.similarity_threshold);
            config.validate()?;
            configure_threads(&config)?;

            info!("Starting duplicate scan...");
            run_dedupe(
                &paths,
                config.similarity_threshold,
                config.grid_size,
                max_depth,
            )
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Size rayon's global pool from the config (0 = one thread per CPU)
fn configure_threads(config: &Config) -> anyhow::Result<()> {
    let threads = match config.threads {
        0 => num_cpus::get(),
        n => n,
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to build thread pool")
}
