//! Configuration for dataset generation

use crate::error::{GlyphMillError, Result};
use image::ImageFormat;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default canvas width in pixels
pub const DEFAULT_WIDTH: u32 = 160;
/// Default canvas height in pixels
pub const DEFAULT_HEIGHT: u32 = 160;
/// Number of distorted variants generated per (label, font) rendering
pub const DEFAULT_DISTORTION_COUNT: usize = 25;
/// Images between two progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 5000;
/// Width of the white frame drawn around distorted images
pub const DEFAULT_BORDER_WIDTH: u32 = 5;
/// Numerator of the font size; divided by the label's character count
pub const DEFAULT_FONT_SCALE: u32 = 80;
/// Name of the manifest written at the root of the output directory
pub const MANIFEST_FILE_NAME: &str = "labels-map.csv";
/// Run descriptor written next to the manifest
pub const DESCRIPTOR_FILE_NAME: &str = "dataset.json";
/// Subdirectory holding the per-label image folders
pub const IMAGE_DIR_NAME: &str = "images";

/// Image file format for generated rasters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Grayscale JPEG (`.jpg`)
    #[default]
    Jpeg,
    /// Grayscale PNG (`.png`), lossless
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Inclusive integer range a distortion parameter is drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamRange {
    pub min: u32,
    pub max: u32,
}

impl ParamRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draw an integer in `[min, max]` and return it as a float parameter
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..=self.max) as f32
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.min == 0 {
            return Err(GlyphMillError::invalid_config(format!(
                "{} range must be strictly positive, got [{}, {}]",
                name, self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(GlyphMillError::invalid_config(format!(
                "{} range is inverted: [{}, {}]",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    pub width: u32,
    pub height: u32,
    pub distortion_count: usize,
    /// Displacement magnitude range
    pub alpha: ParamRange,
    /// Gaussian smoothing standard deviation range
    pub sigma: ParamRange,
    pub progress_interval: u64,
    pub border_width: u32,
    pub font_scale: u32,
    pub format: OutputFormat,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            distortion_count: DEFAULT_DISTORTION_COUNT,
            alpha: ParamRange::new(30, 36),
            sigma: ParamRange::new(5, 6),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            border_width: DEFAULT_BORDER_WIDTH,
            font_scale: DEFAULT_FONT_SCALE,
            format: OutputFormat::Jpeg,
        }
    }
}

impl GeneratorConfig {
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_distortion_count(mut self, count: usize) -> Self {
        self.distortion_count = count;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Check every setting before anything touches the disk
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GlyphMillError::invalid_config(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        self.alpha.validate("alpha")?;
        self.sigma.validate("sigma")?;
        if self.progress_interval == 0 {
            return Err(GlyphMillError::invalid_config(
                "progress interval must be at least 1",
            ));
        }
        if self.border_width.saturating_mul(2) > self.width.min(self.height) {
            return Err(GlyphMillError::invalid_config(format!(
                "border width {} does not fit a {}x{} canvas",
                self.border_width, self.width, self.height
            )));
        }
        if self.font_scale == 0 {
            return Err(GlyphMillError::invalid_config("font scale must be at least 1"));
        }
        Ok(())
    }

    /// Images produced for every (label, font) pair: the base render plus its distortions
    pub fn images_per_rendering(&self) -> u64 {
        1 + self.distortion_count as u64
    }

    /// Default output directory, named after the canvas dimensions
    pub fn default_output_dir(&self) -> String {
        format!("image-data/{}x{}", self.width, self.height)
    }
}
