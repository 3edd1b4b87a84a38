//! GlyphMill - Command-line interface for glyph dataset generation

use clap::{Parser, ValueEnum};
use glyphmill::{DatasetGenerator, GeneratorConfig, OutputFormat, Result};
use std::path::PathBuf;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "glyphmill",
    about = "Synthesize elastically distorted glyph images for OCR training",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// File containing newline delimited labels
    #[arg(long, default_value = "labels/tamil_small.txt")]
    label_file: PathBuf,

    /// Directory of .ttf/.otf fonts to use
    #[arg(long, default_value = "fonts")]
    font_dir: PathBuf,

    /// Output directory for generated images and the label CSV file
    /// [default: image-data/<width>x<height>]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Distorted variants per font and label
    #[arg(short = 'd', long, default_value_t = glyphmill::config::DEFAULT_DISTORTION_COUNT)]
    distortions: usize,

    /// Image file format
    #[arg(short = 'f', long, value_enum, default_value = "jpeg")]
    format: CliFormat,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Show progress bar
    #[arg(short = 'p', long)]
    progress: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, ValueEnum, Clone, Copy)]
enum CliFormat {
    Jpeg,
    Png,
}

impl From<CliFormat> for OutputFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Jpeg => OutputFormat::Jpeg,
            CliFormat::Png => OutputFormat::Png,
        }
    }
}

fn log_directive(verbose: bool) -> Directive {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    Directive::from(level)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::builder()
        .with_default_directive(log_directive(cli.verbose))
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = GeneratorConfig::default()
        .with_distortion_count(cli.distortions)
        .with_format(cli.format.into());
    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(config.default_output_dir()));

    // Print configuration
    println!("🔧 Configuration:");
    println!("  Labels: {}", cli.label_file.display());
    println!("  Fonts: {}", cli.font_dir.display());
    println!("  Output: {}", output_dir.display());
    println!("  Distortions: {}", config.distortion_count);
    println!("  Seed: {}", cli.seed);
    println!();

    let mut generator = DatasetGenerator::new(config).with_seed(cli.seed);

    if cli.progress {
        generator = generator.with_progress();
    }

    let result = generator.generate(&cli.label_file, &cli.font_dir, &output_dir)?;

    println!();
    result.print_summary();

    Ok(())
}
