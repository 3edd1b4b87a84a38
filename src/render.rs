//! Font discovery and glyph rasterization

use crate::config::GeneratorConfig;
use crate::error::{GlyphMillError, Result};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, Rect, ScaleFont};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_text_mut;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions accepted as font faces
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// A parsed font face and the file it came from
pub struct FontResource {
    pub path: PathBuf,
    face: FontVec,
}

impl FontResource {
    /// Read and parse a font file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path)
            .map_err(|e| GlyphMillError::with_context(format!("reading font {}", path.display()), e))?;
        let face = FontVec::try_from_vec(bytes).map_err(|e| GlyphMillError::Font {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path, face })
    }

    pub fn face(&self) -> &FontVec {
        &self.face
    }

    /// Scale at which the face's em square is `size` pixels tall
    pub fn em_scale(&self, size: f32) -> PxScale {
        match self.face.units_per_em() {
            Some(units_per_em) => PxScale::from(size * self.face.height_unscaled() / units_per_em),
            None => PxScale::from(size),
        }
    }

    /// File name for logs
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource").field("path", &self.path).finish()
    }
}

fn is_font_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FONT_EXTENSIONS.iter().any(|f| ext.eq_ignore_ascii_case(f)))
            .unwrap_or(false)
}

/// List font files in `dir`, sorted by path so runs are reproducible
pub fn discover_fonts(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(GlyphMillError::NoFonts(dir.to_path_buf()));
    }
    let mut fonts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_font_file(&path) {
            fonts.push(path);
        }
    }
    fonts.sort();
    Ok(fonts)
}

/// Discover and parse every font in `dir`; an empty directory is an error
pub fn load_fonts(dir: impl AsRef<Path>) -> Result<Vec<FontResource>> {
    let dir = dir.as_ref();
    let paths = discover_fonts(dir)?;
    if paths.is_empty() {
        return Err(GlyphMillError::NoFonts(dir.to_path_buf()));
    }
    let fonts = paths
        .into_iter()
        .map(FontResource::load)
        .collect::<Result<Vec<_>>>()?;
    debug!(count = fonts.len(), dir = %dir.display(), "loaded fonts");
    Ok(fonts)
}

/// Renders labels as black glyphs centered on a white canvas
#[derive(Debug, Clone)]
pub struct GlyphRasterizer {
    width: u32,
    height: u32,
    font_scale: u32,
}

impl GlyphRasterizer {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            font_scale: config.font_scale,
        }
    }

    /// Pixel size for `label`: longer labels get smaller glyphs so they fit
    pub fn font_size(&self, label: &str) -> u32 {
        let chars = label.chars().count().max(1) as u32;
        (self.font_scale / chars).max(1)
    }

    /// Render `label` with `font` at an em size of [`font_size`](Self::font_size) pixels.
    ///
    /// The inked area is centered on the canvas. Glyphs missing from the face
    /// render as whatever the face provides for unknown characters, possibly
    /// nothing.
    pub fn render(&self, label: &str, font: &FontResource) -> GrayImage {
        let mut canvas = GrayImage::from_pixel(self.width, self.height, Luma([255u8]));
        let scale = font.em_scale(self.font_size(label) as f32);
        let Some(ink) = ink_bounds(scale, font.face(), label) else {
            return canvas;
        };
        let x = ((self.width as f32 - ink.width()) / 2.0 - ink.min.x).round() as i32;
        let y = ((self.height as f32 - ink.height()) / 2.0 - ink.min.y).round() as i32;
        draw_text_mut(&mut canvas, Luma([0u8]), x, y, scale, font.face(), label);
        canvas
    }
}

/// Pixel bounds of the ink `draw_text_mut` lays down for `text` drawn at the origin.
///
/// Follows imageproc's layout: pen starts on the ascent line, advances by
/// `h_advance` plus kerning, no shaping.
fn ink_bounds(scale: PxScale, face: &FontVec, text: &str) -> Option<Rect> {
    let font = face.as_scaled(scale);
    let mut pen = 0.0f32;
    let mut last: Option<GlyphId> = None;
    let mut bounds: Option<Rect> = None;

    for c in text.chars() {
        let id = font.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(pen, font.ascent()));
        pen += font.h_advance(id);
        if let Some(outlined) = font.outline_glyph(glyph) {
            if let Some(last) = last {
                pen += font.kern(id, last);
            }
            last = Some(id);
            let bb = outlined.px_bounds();
            bounds = Some(match bounds {
                Some(b) => Rect {
                    min: point(b.min.x.min(bb.min.x), b.min.y.min(bb.min.y)),
                    max: point(b.max.x.max(bb.max.x), b.max.y.max(bb.max.y)),
                },
                None => bb,
            });
        }
    }
    bounds
}
