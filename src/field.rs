//! Dense 2D scalar fields for displacement maps

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::f64::consts::{PI, SQRT_2};

/// Gaussian kernels are cut off at this many standard deviations
const KERNEL_TRUNCATE: f32 = 4.0;

/// Row-major `height x width` buffer of `f32` samples
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ScalarField {
    /// Field filled with zeros
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Field built from `data`; `None` if the length does not match the shape
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * height).then_some(Self { width, height, data })
    }

    /// Field of independent uniform samples in `[-1, 1)`
    pub fn uniform_noise<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let uniform = Uniform::new(-1.0f32, 1.0);
        let data = (0..width * height).map(|_| uniform.sample(rng)).collect();
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sample at integer coordinates
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Largest absolute sample, 0 for an empty field
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }

    /// Multiply every sample by `factor`
    pub fn scale(mut self, factor: f32) -> Self {
        self.data.iter_mut().for_each(|v| *v *= factor);
        self
    }

    /// Separable Gaussian smoothing with standard deviation `sigma`.
    ///
    /// Samples outside the field count as zero, so energy leaks out near the
    /// edges. A non-positive `sigma` leaves the field unchanged.
    pub fn gaussian_smooth(&self, sigma: f32) -> Self {
        if sigma <= 0.0 || self.data.is_empty() {
            return self.clone();
        }
        let kernel = gaussian_kernel(sigma, self.width.max(self.height));
        let rows_done = self.convolve_rows(&kernel);
        rows_done.convolve_cols(&kernel)
    }

    fn convolve_rows(&self, kernel: &[f32]) -> Self {
        let radius = (kernel.len() / 2) as isize;
        let mut out = Self::zeros(self.width, self.height);
        for row in 0..self.height {
            let line = &self.data[row * self.width..(row + 1) * self.width];
            for col in 0..self.width {
                let mut acc = 0.0f32;
                for (k, weight) in kernel.iter().enumerate() {
                    let src = col as isize + k as isize - radius;
                    if src >= 0 && (src as usize) < self.width {
                        acc += weight * line[src as usize];
                    }
                }
                out.data[row * self.width + col] = acc;
            }
        }
        out
    }

    fn convolve_cols(&self, kernel: &[f32]) -> Self {
        let radius = (kernel.len() / 2) as isize;
        let mut out = Self::zeros(self.width, self.height);
        for row in 0..self.height {
            for (k, weight) in kernel.iter().enumerate() {
                let src = row as isize + k as isize - radius;
                if src < 0 || src as usize >= self.height {
                    continue;
                }
                let src = src as usize * self.width;
                let dst = row * self.width;
                for col in 0..self.width {
                    out.data[dst + col] += weight * self.data[src + col];
                }
            }
        }
        out
    }
}

/// Normalized 1D Gaussian kernel, truncated at `4 * sigma`.
///
/// Taps further than `max_radius` from the center can never reach a sample
/// of a field whose larger side is `max_radius`, so they are left out. The
/// weights are still normalized over the full truncated kernel.
pub fn gaussian_kernel(sigma: f32, max_radius: usize) -> Vec<f32> {
    let full_radius = (KERNEL_TRUNCATE * sigma + 0.5) as usize;
    let radius = full_radius.min(max_radius) as isize;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    let weight = |x: f64| (-(x * x) / denom).exp();

    let mut kernel: Vec<f64> = (-radius..=radius).map(|x| weight(x as f64)).collect();
    let sum: f64 = if radius as usize == full_radius {
        kernel.iter().sum()
    } else {
        // Euler-Maclaurin: the discrete sum is the integral plus the endpoint half-weights.
        let r = full_radius as f64;
        let integral = sigma * (2.0 * PI).sqrt() * libm::erf(r / (sigma * SQRT_2));
        integral + weight(r)
    };
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel.into_iter().map(|w| w as f32).collect()
}

/// Bilinear sample of a `height x width` row-major image at `(row, col)`.
///
/// Coordinates outside `[0, height-1] x [0, width-1]` return `fill`; no
/// interpolation happens beyond the edges.
pub fn sample_bilinear(
    pixels: &[u8],
    width: usize,
    height: usize,
    row: f32,
    col: f32,
    fill: f32,
) -> f32 {
    const EDGE_TOLERANCE: f32 = 1e-3;

    let max_row = height as f32 - 1.0;
    let max_col = width as f32 - 1.0;
    if !(row >= -EDGE_TOLERANCE && row <= max_row + EDGE_TOLERANCE)
        || !(col >= -EDGE_TOLERANCE && col <= max_col + EDGE_TOLERANCE)
    {
        return fill;
    }
    let row = row.clamp(0.0, max_row);
    let col = col.clamp(0.0, max_col);

    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    let r1 = (r0 + 1).min(height - 1);
    let c1 = (c0 + 1).min(width - 1);
    let tr = row - r0 as f32;
    let tc = col - c0 as f32;

    let at = |r: usize, c: usize| pixels[r * width + c] as f32;
    let top = at(r0, c0) * (1.0 - tc) + at(r0, c1) * tc;
    let bottom = at(r1, c0) * (1.0 - tc) + at(r1, c1) * tc;
    top * (1.0 - tr) + bottom * tr
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(5.0, usize::MAX);
        assert_eq!(kernel.len(), 41);
        assert_relative_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        for i in 0..kernel.len() / 2 {
            assert_relative_eq!(kernel[i], kernel[kernel.len() - 1 - i]);
        }
        assert!(kernel[20] > kernel[19]);
    }

    #[test]
    fn test_clamped_kernel_keeps_weights() {
        let full = gaussian_kernel(5.0, usize::MAX);
        let clamped = gaussian_kernel(5.0, 10);
        assert_eq!(clamped.len(), 21);
        for (i, w) in clamped.iter().enumerate() {
            assert_relative_eq!(*w, full[i + 10], max_relative = 1e-4);
        }
    }

    #[test]
    fn test_huge_sigma_stays_bounded() {
        let kernel = gaussian_kernel(1e12, 8);
        assert_eq!(kernel.len(), 17);
        assert!(kernel.iter().all(|w| w.is_finite() && *w >= 0.0));

        let mut rng = StdRng::seed_from_u64(2);
        let noise = ScalarField::uniform_noise(8, 8, &mut rng);
        let smoothed = noise.gaussian_smooth(1e12);
        assert_eq!((smoothed.width(), smoothed.height()), (8, 8));
        assert!(smoothed.max_abs() < 1e-6);
    }

    #[test]
    fn test_uniform_noise_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = ScalarField::uniform_noise(32, 16, &mut rng);
        assert_eq!(field.as_slice().len(), 32 * 16);
        assert!(field.as_slice().iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn test_smoothing_constant_field_interior() {
        let field = ScalarField::from_vec(64, 64, vec![1.0; 64 * 64]).unwrap();
        let smoothed = field.gaussian_smooth(2.0);
        // Far from the border the kernel sees only ones.
        assert_relative_eq!(smoothed.get(32, 32), 1.0, epsilon = 1e-4);
        // Near the border the zero padding pulls the value down.
        assert!(smoothed.get(0, 0) < 0.5);
    }

    #[test]
    fn test_smoothing_shrinks_noise() {
        let mut rng = StdRng::seed_from_u64(3);
        let noise = ScalarField::uniform_noise(40, 40, &mut rng);
        let smoothed = noise.gaussian_smooth(5.0);
        assert_eq!(smoothed.width(), 40);
        assert_eq!(smoothed.height(), 40);
        assert!(smoothed.max_abs() < noise.max_abs());
    }

    #[test]
    fn test_bilinear_sampling() {
        // 2x2 image: [[0, 100], [200, 50]]
        let pixels = [0u8, 100, 200, 50];
        assert_relative_eq!(sample_bilinear(&pixels, 2, 2, 0.0, 0.0, 0.0), 0.0);
        assert_relative_eq!(sample_bilinear(&pixels, 2, 2, 0.0, 0.5, 0.0), 50.0);
        assert_relative_eq!(sample_bilinear(&pixels, 2, 2, 0.5, 0.0, 0.0), 100.0);
        assert_relative_eq!(sample_bilinear(&pixels, 2, 2, 0.5, 0.5, 0.0), 87.5);
        assert_relative_eq!(sample_bilinear(&pixels, 2, 2, 1.0, 1.0, 0.0), 50.0);
    }

    #[test]
    fn test_bilinear_outside_returns_fill() {
        let pixels = [255u8; 9];
        assert_eq!(sample_bilinear(&pixels, 3, 3, -0.5, 1.0, 0.0), 0.0);
        assert_eq!(sample_bilinear(&pixels, 3, 3, 1.0, 2.5, 0.0), 0.0);
        assert_eq!(sample_bilinear(&pixels, 3, 3, 3.0, 3.0, 7.0), 7.0);
        assert_eq!(sample_bilinear(&pixels, 3, 3, 2.0, 2.0, 0.0), 255.0);
    }
}
