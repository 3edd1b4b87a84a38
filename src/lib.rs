//! GlyphMill - Synthetic glyph-image datasets for OCR training
//!
//! This crate renders every label of a label file with every font of a font
//! directory and augments each rendering with elastically distorted variants,
//! writing the images to disk together with a `label,path` manifest.
//!
//! # Features
//!
//! - **Elastic distortion**: Gaussian-smoothed random displacement fields with
//!   bilinear resampling
//! - **Reproducible runs**: a single seeded RNG drives every random draw
//! - **Deterministic layout**: one folder per label, files numbered by a
//!   global running counter
//! - **Manifest**: append-only `labels-map.csv` in generation order
//!
//! # Example
//!
//! ```no_run
//! use glyphmill::{DatasetGenerator, GeneratorConfig};
//!
//! let config = GeneratorConfig::default().with_distortion_count(5);
//! let mut generator = DatasetGenerator::new(config).with_seed(7);
//! let result = generator.generate("labels/tamil_small.txt", "fonts", "./output")?;
//! println!("{} images", result.total_images);
//! # Ok::<(), glyphmill::GlyphMillError>(())
//! ```

pub mod config;
pub mod distortion;
pub mod error;
pub mod field;
pub mod generator;
pub mod labels;
pub mod manifest;
pub mod render;

pub use config::{GeneratorConfig, OutputFormat, ParamRange};
pub use distortion::{draw_border, elastic_distort, DistortionParams, ElasticDistorter};
pub use error::{GlyphMillError, Result};
pub use generator::{DatasetGenerator, GenerationResult, ImageCounter};
pub use manifest::{read_manifest, ManifestEntry, ManifestWriter};
pub use render::{FontResource, GlyphRasterizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::GeneratorConfig;
    pub use crate::distortion::elastic_distort;
    pub use crate::error::Result;
    pub use crate::generator::DatasetGenerator;
}
