use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec::DEFAULT_JPEG_QUALITY;
use crate::error::{Error, Result};

/// Margin added around detected content, in pixels
pub const DEFAULT_PADDING: u32 = 20;

/// Channel value at or above which a pixel counts as white background
pub const DEFAULT_BACKGROUND_THRESHOLD: u8 = 250;

/// Alpha value at or below which a pixel counts as transparent
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 10;

/// Side length of the perceptual hash grid (8x8 = 64 bits)
pub const DEFAULT_GRID_SIZE: u32 = 8;

/// Largest grid the configuration accepts (64x64 = 4096 bits)
pub const MAX_GRID_SIZE: u32 = 64;

/// Parameters for the boundary detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    /// Pixels added on each side of the detected content box
    pub padding: u32,

    /// Channel values below this are foreground
    pub background_threshold: u8,

    /// Alpha values above this are opaque
    pub alpha_threshold: u8,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for cropping, hashing and duplicate detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Boundary detector parameters
    pub crop: CropOptions,

    /// Side length of the perceptual hash grid
    pub grid_size: u32,

    /// Minimum similarity (0-100) for two images to count as duplicates
    pub similarity_threshold: f64,

    /// JPEG quality used when re-encoding crops (1-100)
    pub jpeg_quality: u8,

    /// Number of threads to use for batch processing (0 = auto)
    pub threads: usize,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crop: CropOptions::default(),
            grid_size: DEFAULT_GRID_SIZE,
            similarity_threshold: 90.0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            threads: 0, // Auto
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(Error::Configuration(format!(
                "Grid size must be between 1 and {}",
                MAX_GRID_SIZE
            )));
        }

        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(Error::Configuration(
                "Similarity threshold must be between 0 and 100".to_string(),
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Configuration(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }
}
