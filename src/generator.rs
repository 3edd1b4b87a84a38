//! Dataset generation driver

use crate::config::{GeneratorConfig, DESCRIPTOR_FILE_NAME, IMAGE_DIR_NAME};
use crate::distortion::{draw_border, ElasticDistorter};
use crate::error::{GlyphMillError, Result};
use crate::labels::{is_reserved_label_char, read_labels};
use crate::manifest::ManifestWriter;
use crate::render::{load_fonts, FontResource, GlyphRasterizer};
use image::GrayImage;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of a dataset run
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub num_labels: usize,
    pub num_fonts: usize,
    pub total_images: u64,
    pub generation_time: Duration,
}

impl GenerationResult {
    /// Print a summary of the generation
    pub fn print_summary(&self) {
        println!("✅ Finished generating {} images.", self.total_images);
        println!("  📁 Output: {}", self.output_dir.display());
        println!("  📄 Manifest: {}", self.manifest_path.display());
        println!("  🔤 Labels: {}", self.num_labels);
        println!("  🖋️  Fonts: {}", self.num_fonts);
        println!("  ⏱️  Time: {:.2}s", self.generation_time.as_secs_f64());
    }
}

/// Running image number shared by base and distorted images.
///
/// Starts at zero; the first image gets number 1.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageCounter {
    value: u64,
}

impl ImageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new value
    pub fn advance(&mut self) -> u64 {
        self.value += 1;
        self.value
    }

    /// Number of values handed out so far
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// `dataset.json` written next to the manifest after a successful run
#[derive(Debug, Serialize)]
struct DatasetDescriptor<'a> {
    generator: &'static str,
    version: &'static str,
    seed: Option<u64>,
    config: &'a GeneratorConfig,
    num_labels: usize,
    fonts: Vec<String>,
    total_images: u64,
    manifest: &'static str,
}

/// Synthesizes labeled glyph images: labels x fonts x (1 + distortions)
pub struct DatasetGenerator {
    config: GeneratorConfig,
    seed: Option<u64>,
    progress_bar: Option<ProgressBar>,
}

impl DatasetGenerator {
    /// Create a new generator
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            seed: Some(42),
            progress_bar: None,
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draw randomness from OS entropy instead of a fixed seed
    pub fn with_entropy(mut self) -> Self {
        self.seed = None;
        self
    }

    /// Enable progress bar
    pub fn with_progress(mut self) -> Self {
        self.progress_bar = Some(ProgressBar::new(0));
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Read labels and fonts from disk, then generate into `output_dir`.
    ///
    /// All inputs are validated before anything is written.
    pub fn generate(
        &mut self,
        label_file: impl AsRef<Path>,
        font_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<GenerationResult> {
        self.config.validate()?;
        let labels = read_labels(label_file)?;
        let fonts = load_fonts(font_dir)?;
        self.generate_from(&labels, &fonts, output_dir)
    }

    /// Generate from already loaded labels and fonts
    pub fn generate_from(
        &mut self,
        labels: &[String],
        fonts: &[FontResource],
        output_dir: impl AsRef<Path>,
    ) -> Result<GenerationResult> {
        self.config.validate()?;
        if fonts.is_empty() {
            return Err(GlyphMillError::invalid_config("at least one font is required"));
        }
        if let Some(bad) = labels
            .iter()
            .find(|l| l.is_empty() || l.contains(is_reserved_label_char))
        {
            return Err(GlyphMillError::label_file(format!(
                "label {:?} cannot be used as a file name",
                bad
            )));
        }

        let output_dir = output_dir.as_ref();
        let image_dir = output_dir.join(IMAGE_DIR_NAME);
        fs::create_dir_all(&image_dir).map_err(|e| {
            GlyphMillError::with_context(format!("creating {}", image_dir.display()), e)
        })?;

        info!(
            labels = labels.len(),
            fonts = fonts.len(),
            distortions = self.config.distortion_count,
            "generating glyph images into {}",
            output_dir.display()
        );

        let expected = (labels.len() * fonts.len()) as u64 * self.config.images_per_rendering();
        self.setup_progress(expected)?;

        let start = Instant::now();
        let mut manifest = ManifestWriter::create(output_dir)?;
        let mut counter = ImageCounter::new();
        let mut distorter = ElasticDistorter::from_config(&self.config, self.seed);
        let rasterizer = GlyphRasterizer::new(&self.config);
        let mut next_report = self.config.progress_interval;

        for (idx, label) in labels.iter().enumerate() {
            let label_dir = image_dir.join(format!("{}_{}", label, idx + 1));
            fs::create_dir_all(&label_dir).map_err(|e| {
                GlyphMillError::with_context(format!("creating {}", label_dir.display()), e)
            })?;

            for font in fonts {
                debug!(label = %label, font = %font.name(), "rendering");
                let base = rasterizer.render(label, font);
                self.write_image(&base, label, &label_dir, &mut counter, &mut manifest)?;

                for _ in 0..self.config.distortion_count {
                    let (mut distorted, params) = distorter.distort_random(&base)?;
                    draw_border(&mut distorted, self.config.border_width);
                    let path =
                        self.write_image(&distorted, label, &label_dir, &mut counter, &mut manifest)?;
                    debug!(alpha = params.alpha, sigma = params.sigma, path = %path.display(), "distorted");
                }

                if counter.value() >= next_report {
                    info!("{} images generated...", counter.value());
                    while next_report <= counter.value() {
                        next_report += self.config.progress_interval;
                    }
                }
            }
        }

        let manifest_path = manifest.path().to_path_buf();
        let rows = manifest.finish()?;
        debug_assert_eq!(rows, counter.value());

        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("✅ Image generation complete");
        }

        self.write_descriptor(output_dir, labels.len(), fonts, counter.value())?;

        let result = GenerationResult {
            output_dir: output_dir.to_path_buf(),
            manifest_path,
            num_labels: labels.len(),
            num_fonts: fonts.len(),
            total_images: counter.value(),
            generation_time: start.elapsed(),
        };
        info!("Finished generating {} images.", result.total_images);
        Ok(result)
    }

    /// Save one raster under the next counter value, then record it in the manifest
    fn write_image(
        &self,
        image: &GrayImage,
        label: &str,
        label_dir: &Path,
        counter: &mut ImageCounter,
        manifest: &mut ManifestWriter,
    ) -> Result<PathBuf> {
        let number = counter.advance();
        let path = label_dir.join(format!(
            "{}_{}.{}",
            label,
            number,
            self.config.format.extension()
        ));
        image
            .save_with_format(&path, self.config.format.image_format())
            .map_err(|e| GlyphMillError::with_context(format!("writing {}", path.display()), e))?;
        manifest.append(label, &path)?;

        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
        }
        Ok(path)
    }

    fn setup_progress(&self, total: u64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_length(total);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| GlyphMillError::with_context("progress bar template", e))?
                .progress_chars("#>-");
            pb.set_style(style);
        }
        Ok(())
    }

    fn write_descriptor(
        &self,
        output_dir: &Path,
        num_labels: usize,
        fonts: &[FontResource],
        total_images: u64,
    ) -> Result<()> {
        let descriptor = DatasetDescriptor {
            generator: "glyphmill",
            version: crate::VERSION,
            seed: self.seed,
            config: &self.config,
            num_labels,
            fonts: fonts.iter().map(|f| f.path.display().to_string()).collect(),
            total_images,
            manifest: crate::config::MANIFEST_FILE_NAME,
        };
        let content = serde_json::to_string_pretty(&descriptor)?;
        fs::write(output_dir.join(DESCRIPTOR_FILE_NAME), content)?;
        Ok(())
    }
}
