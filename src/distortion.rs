//! Elastic distortion of grayscale rasters
//!
//! A distortion draws two fields of uniform noise, smooths them with a
//! Gaussian of standard deviation `sigma`, scales them by `alpha` and uses
//! the result as a per-pixel displacement. Every output pixel `(r, c)` is
//! resampled bilinearly from `(r + dy[r, c], c + dx[r, c])` in the input;
//! samples that land outside the raster are black.

use crate::config::{GeneratorConfig, ParamRange};
use crate::error::{GlyphMillError, Result};
use crate::field::{sample_bilinear, ScalarField};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Intensity used for samples taken outside the source raster
const OUTSIDE_FILL: f32 = 0.0;

/// Parameters of a single distortion call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionParams {
    pub alpha: f32,
    pub sigma: f32,
}

impl DistortionParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(GlyphMillError::invalid_config(format!(
                "alpha must be a positive number, got {}",
                self.alpha
            )));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(GlyphMillError::invalid_config(format!(
                "sigma must be a positive number, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// Displacement along columns (`dx`) and rows (`dy`), both shaped like the raster
#[derive(Debug, Clone)]
pub struct DisplacementField {
    pub dx: ScalarField,
    pub dy: ScalarField,
}

impl DisplacementField {
    /// Draw a fresh field; `dx` noise is drawn before `dy` noise
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        params: DistortionParams,
        rng: &mut R,
    ) -> Self {
        let dx = ScalarField::uniform_noise(width, height, rng)
            .gaussian_smooth(params.sigma)
            .scale(params.alpha);
        let dy = ScalarField::uniform_noise(width, height, rng)
            .gaussian_smooth(params.sigma)
            .scale(params.alpha);
        Self { dx, dy }
    }

    /// Largest displacement along either axis
    pub fn max_magnitude(&self) -> f32 {
        self.dx.max_abs().max(self.dy.max_abs())
    }

    /// Resample `image` along this field
    pub fn warp(&self, image: &GrayImage) -> Result<GrayImage> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        if self.dx.width() != width
            || self.dx.height() != height
            || self.dy.width() != width
            || self.dy.height() != height
        {
            return Err(GlyphMillError::invalid_raster(format!(
                "displacement field is {}x{} but raster is {}x{}",
                self.dx.width(),
                self.dx.height(),
                width,
                height
            )));
        }

        let pixels = image.as_raw();
        let mut out = GrayImage::new(image.width(), image.height());
        for (col, row, pixel) in out.enumerate_pixels_mut() {
            let (r, c) = (row as usize, col as usize);
            let src_row = r as f32 + self.dy.get(r, c);
            let src_col = c as f32 + self.dx.get(r, c);
            let value = sample_bilinear(pixels, width, height, src_row, src_col, OUTSIDE_FILL);
            *pixel = Luma([to_intensity(value)]);
        }
        Ok(out)
    }
}

/// Round and clamp an interpolated value to 8-bit storage
fn to_intensity(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Elastically distort `image` with randomness drawn from `rng`.
///
/// The output always has the input's dimensions. Empty rasters and
/// non-positive parameters are rejected.
pub fn elastic_distort<R: Rng + ?Sized>(
    image: &GrayImage,
    alpha: f32,
    sigma: f32,
    rng: &mut R,
) -> Result<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(GlyphMillError::invalid_raster(format!(
            "cannot distort an empty {}x{} raster",
            image.width(),
            image.height()
        )));
    }
    let params = DistortionParams { alpha, sigma };
    params.validate()?;

    let field = DisplacementField::random(
        image.width() as usize,
        image.height() as usize,
        params,
        rng,
    );
    field.warp(image)
}

/// Paint a white frame `width` pixels thick along the raster edge
pub fn draw_border(image: &mut GrayImage, width: u32) {
    let (w, h) = image.dimensions();
    for inset in 0..width {
        let inner_w = w.saturating_sub(2 * inset);
        let inner_h = h.saturating_sub(2 * inset);
        if inner_w == 0 || inner_h == 0 {
            break;
        }
        let rect = Rect::at(inset as i32, inset as i32).of_size(inner_w, inner_h);
        draw_hollow_rect_mut(image, rect, Luma([255u8]));
    }
}

/// Stateful distorter that draws parameters and noise from one seeded RNG
pub struct ElasticDistorter {
    alpha: ParamRange,
    sigma: ParamRange,
    rng: StdRng,
}

impl ElasticDistorter {
    /// Create a distorter; `None` seeds from OS entropy
    pub fn new(alpha: ParamRange, sigma: ParamRange, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { alpha, sigma, rng }
    }

    pub fn from_config(config: &GeneratorConfig, seed: Option<u64>) -> Self {
        Self::new(config.alpha, config.sigma, seed)
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Draw alpha and sigma from their configured ranges
    pub fn sample_params(&mut self) -> DistortionParams {
        DistortionParams {
            alpha: self.alpha.sample(&mut self.rng),
            sigma: self.sigma.sample(&mut self.rng),
        }
    }

    /// Distort with explicit parameters
    pub fn distort(&mut self, image: &GrayImage, params: DistortionParams) -> Result<GrayImage> {
        elastic_distort(image, params.alpha, params.sigma, &mut self.rng)
    }

    /// Distort with freshly sampled parameters
    pub fn distort_random(&mut self, image: &GrayImage) -> Result<(GrayImage, DistortionParams)> {
        let params = self.sample_params();
        let distorted = self.distort(image, params)?;
        Ok((distorted, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_rejects_empty_raster() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = GrayImage::new(0, 10);
        assert!(elastic_distort(&empty, 30.0, 5.0, &mut rng).is_err());
    }

    #[test]
    fn test_rejects_non_positive_params() {
        let mut rng = StdRng::seed_from_u64(0);
        let image = checkerboard(8, 8);
        assert!(elastic_distort(&image, 0.0, 5.0, &mut rng).is_err());
        assert!(elastic_distort(&image, 30.0, -1.0, &mut rng).is_err());
        assert!(elastic_distort(&image, f32::NAN, 5.0, &mut rng).is_err());
    }

    #[test]
    fn test_field_shape_mismatch_is_rejected() {
        let field = DisplacementField {
            dx: ScalarField::zeros(4, 4),
            dy: ScalarField::zeros(4, 4),
        };
        assert!(field.warp(&checkerboard(8, 8)).is_err());
    }

    #[test]
    fn test_zero_field_is_identity() {
        let image = checkerboard(12, 9);
        let field = DisplacementField {
            dx: ScalarField::zeros(12, 9),
            dy: ScalarField::zeros(12, 9),
        };
        assert_eq!(field.warp(&image).unwrap(), image);
    }

    #[test]
    fn test_uniform_shift_moves_content() {
        // Shift every sample one column to the right: output(c) = input(c + 1).
        let image = GrayImage::from_fn(4, 1, |x, _| Luma([(x * 10) as u8]));
        let field = DisplacementField {
            dx: ScalarField::from_vec(4, 1, vec![1.0; 4]).unwrap(),
            dy: ScalarField::zeros(4, 1),
        };
        let out = field.warp(&image).unwrap();
        assert_eq!(out.as_raw(), &vec![10, 20, 30, 0]);
    }

    #[test]
    fn test_border_is_white() {
        let mut image = GrayImage::new(20, 16);
        draw_border(&mut image, 5);
        for (x, y, pixel) in image.enumerate_pixels() {
            let on_border = x < 5 || y < 5 || x >= 15 || y >= 11;
            if on_border {
                assert_eq!(pixel.0[0], 255, "pixel ({}, {}) not white", x, y);
            } else {
                assert_eq!(pixel.0[0], 0, "pixel ({}, {}) painted", x, y);
            }
        }
    }

    #[test]
    fn test_distorter_samples_within_ranges() {
        let mut distorter = ElasticDistorter::new(ParamRange::new(30, 36), ParamRange::new(5, 6), Some(9));
        for _ in 0..100 {
            let params = distorter.sample_params();
            assert!((30.0..=36.0).contains(&params.alpha));
            assert!((5.0..=6.0).contains(&params.sigma));
        }
    }

    #[test]
    fn test_distorter_seed_reproducibility() {
        let image = checkerboard(32, 32);
        let mut a = ElasticDistorter::new(ParamRange::new(30, 36), ParamRange::new(5, 6), Some(11));
        let mut b = ElasticDistorter::new(ParamRange::new(30, 36), ParamRange::new(5, 6), Some(11));
        let (out_a, params_a) = a.distort_random(&image).unwrap();
        let (out_b, params_b) = b.distort_random(&image).unwrap();
        assert_eq!(params_a, params_b);
        assert_eq!(out_a, out_b);
    }
}
