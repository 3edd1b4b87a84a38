//! Property tests for the elastic distortion engine

use glyphmill::distortion::{draw_border, elastic_distort, DisplacementField, DistortionParams};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn glyph_like(width: u32, height: u32) -> GrayImage {
    // White canvas with a dark cross through the middle.
    GrayImage::from_fn(width, height, |x, y| {
        let near_x = (x as i32 - width as i32 / 2).abs() < 6;
        let near_y = (y as i32 - height as i32 / 2).abs() < 6;
        if near_x || near_y {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

#[test]
fn test_shape_preserved() {
    let mut rng = StdRng::seed_from_u64(42);
    for &(w, h) in &[(160, 160), (64, 32), (1, 1), (7, 19)] {
        let image = glyph_like(w, h);
        for &(alpha, sigma) in &[(30.0, 5.0), (36.0, 6.0), (0.5, 0.3), (200.0, 1.0)] {
            let out = elastic_distort(&image, alpha, sigma, &mut rng).unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }
}

#[test]
fn test_deterministic_under_seed() {
    let image = glyph_like(96, 96);
    let a = elastic_distort(&image, 34.0, 5.0, &mut StdRng::seed_from_u64(123)).unwrap();
    let b = elastic_distort(&image, 34.0, 5.0, &mut StdRng::seed_from_u64(123)).unwrap();
    assert_eq!(a, b);

    let c = elastic_distort(&image, 34.0, 5.0, &mut StdRng::seed_from_u64(124)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_small_alpha_approaches_identity() {
    let image = glyph_like(64, 64);
    let mut rng = StdRng::seed_from_u64(5);
    let out = elastic_distort(&image, 1e-4, 5.0, &mut rng).unwrap();
    assert_eq!(out, image);
}

#[test]
fn test_difference_grows_with_alpha() {
    let image = glyph_like(80, 80);
    let diff = |alpha: f32| -> u64 {
        let out = elastic_distort(&image, alpha, 4.0, &mut StdRng::seed_from_u64(9)).unwrap();
        out.as_raw()
            .iter()
            .zip(image.as_raw())
            .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs() as u64)
            .sum()
    };
    assert!(diff(0.01) < diff(10.0));
    assert!(diff(10.0) > 0);
}

#[test]
fn test_displacement_scales_with_alpha() {
    let params = |alpha| DistortionParams { alpha, sigma: 5.0 };
    let small = DisplacementField::random(50, 50, params(1.0), &mut StdRng::seed_from_u64(3));
    let large = DisplacementField::random(50, 50, params(30.0), &mut StdRng::seed_from_u64(3));
    approx::assert_relative_eq!(
        large.max_magnitude(),
        small.max_magnitude() * 30.0,
        max_relative = 1e-4
    );
}

#[test]
fn test_border_after_distortion_is_white() {
    let image = glyph_like(160, 160);
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..3 {
        let mut out = elastic_distort(&image, 36.0, 5.0, &mut rng).unwrap();
        draw_border(&mut out, 5);
        for (x, y, pixel) in out.enumerate_pixels() {
            if x < 5 || y < 5 || x >= 155 || y >= 155 {
                assert_eq!(pixel.0[0], 255, "border pixel ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn test_values_stay_in_input_range() {
    // Interpolating between 40 and 200 never leaves [0, 200].
    let image = GrayImage::from_fn(32, 32, |x, _| Luma([if x % 2 == 0 { 40 } else { 200 }]));
    let out = elastic_distort(&image, 12.0, 2.0, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(out.as_raw().iter().all(|&v| v <= 200));
}

#[test]
fn test_huge_sigma_is_bounded_and_near_identity() {
    // Smoothing that wide flattens the noise to nothing instead of allocating a giant kernel.
    let image = glyph_like(32, 32);
    let mut rng = StdRng::seed_from_u64(9);
    for sigma in [1e6, 1e12, f32::MAX] {
        let out = elastic_distort(&image, 30.0, sigma, &mut rng).unwrap();
        assert_eq!(out, image, "sigma {}", sigma);
    }
}
