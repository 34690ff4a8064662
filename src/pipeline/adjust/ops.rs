//! Per-pixel primitives shared by both adjustment pipelines.
//!
//! All operations work in place on an RGBA buffer, never touch alpha, and
//! clamp to the 8-bit range on write. Neighborhood operations (median,
//! convolution) read from a private copy of the source so rows can be
//! processed in parallel without observing partially-written state.

use image::RgbaImage;
use rayon::prelude::*;

use super::color::{hsl_to_rgb, rgb_to_hsl};

const BYTES_PER_PIXEL: usize = 4;

#[inline]
fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Per-channel linear transform: `v' = a*v + b` (alpha untouched).
pub fn linear(image: &mut RgbaImage, a: f32, b: f32) {
    let row_len = image.width() as usize * BYTES_PER_PIXEL;
    image
        .par_chunks_exact_mut(row_len)
        .for_each(|row| {
            for px in row.chunks_exact_mut(BYTES_PER_PIXEL) {
                px[0] = clamp_u8(a * px[0] as f32 + b);
                px[1] = clamp_u8(a * px[1] as f32 + b);
                px[2] = clamp_u8(a * px[2] as f32 + b);
            }
        });
}

/// Combined brightness/saturation/hue modulation in HSL space.
///
/// `brightness` multiplies lightness, `saturation` multiplies saturation,
/// `hue_degrees` rotates hue. Pass 1.0/1.0/0 for a no-op component.
pub fn modulate(image: &mut RgbaImage, brightness: f32, saturation: f32, hue_degrees: f32) {
    if brightness == 1.0 && saturation == 1.0 && hue_degrees == 0.0 {
        return;
    }

    let row_len = image.width() as usize * BYTES_PER_PIXEL;
    image
        .par_chunks_exact_mut(row_len)
        .for_each(|row| {
            for px in row.chunks_exact_mut(BYTES_PER_PIXEL) {
                let (h, s, l) = rgb_to_hsl(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                );
                let h = (h + hue_degrees).rem_euclid(360.0);
                let s = (s * saturation).clamp(0.0, 1.0);
                let l = (l * brightness).clamp(0.0, 1.0);
                let (r, g, b) = hsl_to_rgb(h, s, l);
                px[0] = clamp_u8(r * 255.0);
                px[1] = clamp_u8(g * 255.0);
                px[2] = clamp_u8(b * 255.0);
            }
        });
}

/// 3×3 channel recombination: each output channel is a weighted sum of the
/// input channels. Used for temperature/tint and color-grading matrices.
pub fn recomb(image: &mut RgbaImage, m: [[f32; 3]; 3]) {
    let row_len = image.width() as usize * BYTES_PER_PIXEL;
    image
        .par_chunks_exact_mut(row_len)
        .for_each(|row| {
            for px in row.chunks_exact_mut(BYTES_PER_PIXEL) {
                let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
                px[0] = clamp_u8(m[0][0] * r + m[0][1] * g + m[0][2] * b);
                px[1] = clamp_u8(m[1][0] * r + m[1][1] * g + m[1][2] * b);
                px[2] = clamp_u8(m[2][0] * r + m[2][1] * g + m[2][2] * b);
            }
        });
}

/// Median filter over a square window of `size` pixels per side.
///
/// `size` ≤ 1 is a no-op. Edges clamp to the image border.
pub fn median_filter(image: &mut RgbaImage, size: u32) {
    if size <= 1 {
        return;
    }

    let (w, h) = (image.width() as i64, image.height() as i64);
    let half = (size / 2) as i64;
    let src = image.clone();
    let row_len = image.width() as usize * BYTES_PER_PIXEL;

    image
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            let mut window: Vec<u8> = Vec::with_capacity((size * size) as usize);
            for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let x = x as i64;
                for c in 0..3 {
                    window.clear();
                    for dy in -half..=half {
                        let sy = (y + dy).clamp(0, h - 1) as u32;
                        for dx in -half..=half {
                            let sx = (x + dx).clamp(0, w - 1) as u32;
                            window.push(src.get_pixel(sx, sy)[c]);
                        }
                    }
                    window.sort_unstable();
                    px[c] = window[window.len() / 2];
                }
            }
        });
}

/// Gaussian blur with the given sigma.
pub fn gaussian_blur(image: &mut RgbaImage, sigma: f32) {
    if sigma <= 0.0 {
        return;
    }
    *image = image::imageops::blur(image, sigma);
}

/// Unsharp-mask sharpening with the given sigma.
pub fn sharpen(image: &mut RgbaImage, sigma: f32) {
    if sigma <= 0.0 {
        return;
    }
    *image = image::imageops::unsharpen(image, sigma, 0);
}

/// Midtone-contrast boost: wide-radius unsharp mask blended by `amount`.
///
/// `v' = v + (v - blur(v, 2.0)) * amount`
pub fn clarity_boost(image: &mut RgbaImage, amount: f32) {
    if amount <= 0.0 {
        return;
    }

    let blurred = image::imageops::blur(image, 2.0);
    let row_len = image.width() as usize * BYTES_PER_PIXEL;
    image
        .par_chunks_exact_mut(row_len)
        .zip(blurred.par_chunks_exact(row_len))
        .for_each(|(row, blurred_row)| {
            for (px, bpx) in row
                .chunks_exact_mut(BYTES_PER_PIXEL)
                .zip(blurred_row.chunks_exact(BYTES_PER_PIXEL))
            {
                for c in 0..3 {
                    let v = px[c] as f32;
                    px[c] = clamp_u8(v + (v - bpx[c] as f32) * amount);
                }
            }
        });
}

/// 3×3 convolution normalized by the kernel sum (1.0 when the sum is zero),
/// matching the semantics of the upstream convolve operator.
pub fn convolve3x3(image: &mut RgbaImage, kernel: [f32; 9]) {
    let sum: f32 = kernel.iter().sum();
    let scale = if sum == 0.0 { 1.0 } else { sum };

    let (w, h) = (image.width() as i64, image.height() as i64);
    let src = image.clone();
    let row_len = image.width() as usize * BYTES_PER_PIXEL;

    image
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let x = x as i64;
                for c in 0..3 {
                    let mut acc = 0.0f32;
                    for ky in 0..3i64 {
                        let sy = (y + ky - 1).clamp(0, h - 1) as u32;
                        for kx in 0..3i64 {
                            let sx = (x + kx - 1).clamp(0, w - 1) as u32;
                            acc += kernel[(ky * 3 + kx) as usize]
                                * src.get_pixel(sx, sy)[c] as f32;
                        }
                    }
                    px[c] = clamp_u8(acc / scale);
                }
            }
        });
}
