//! Isophote-following inpainting in the spirit of Bertalmio, Bertozzi and
//! Sapiro, "Navier-Stokes, Fluid Dynamics, and Image and Video Inpainting"
//! (2001).
//!
//! The hole is seeded with a fast-marching fill, then relaxed with an
//! anisotropic diffusion that smooths along isophotes (perpendicular to the
//! image gradient) and barely across them, so edges entering the hole are
//! continued instead of blurred out.

use crate::inpainting::domain::mask::Mask;

use super::telea;

const ITERATIONS_PER_PIXEL: usize = 8;
const MAX_ITERATIONS: usize = 200;

/// Weight given to neighbours lying across an isophote.
const CROSS_WEIGHT: f32 = 0.05;

/// Below this luminance gradient the neighbourhood is treated as flat and
/// diffused isotropically.
const FLAT_GRADIENT: f32 = 1.0;

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Fills the masked pixels of packed `data` in place.
pub fn inpaint(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    mask: &Mask,
    radius: f64,
) {
    telea::inpaint(data, width, height, channels, mask, radius);

    let hole: Vec<(usize, usize)> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| mask.get(x, y))
        .collect();
    if hole.is_empty() {
        return;
    }

    let iterations = (radius.ceil().max(1.0) as usize * ITERATIONS_PER_PIXEL).min(MAX_ITERATIONS);
    let mut pixels: Vec<f32> = data.iter().map(|&v| f32::from(v)).collect();

    for _ in 0..iterations {
        for &(x, y) in &hole {
            relax_pixel(&mut pixels, width, height, channels, x, y);
        }
    }

    for (dst, &src) in data.iter_mut().zip(pixels.iter()) {
        *dst = src.round().clamp(0.0, 255.0) as u8;
    }
}

/// One Gauss-Seidel step of isophote-aligned smoothing at `(x, y)`.
fn relax_pixel(
    pixels: &mut [f32],
    width: usize,
    height: usize,
    channels: usize,
    x: usize,
    y: usize,
) {
    let at = |px: usize, py: usize| (py * width + px) * channels;
    let clamp_x = |v: isize| v.clamp(0, width as isize - 1) as usize;
    let clamp_y = |v: isize| v.clamp(0, height as isize - 1) as usize;
    let luminance = |p: &[f32], i: usize| p[i..i + channels].iter().sum::<f32>() / channels as f32;

    let (xi, yi) = (x as isize, y as isize);
    let gx = (luminance(pixels, at(clamp_x(xi + 1), y))
        - luminance(pixels, at(clamp_x(xi - 1), y)))
        * 0.5;
    let gy = (luminance(pixels, at(x, clamp_y(yi + 1)))
        - luminance(pixels, at(x, clamp_y(yi - 1))))
        * 0.5;
    let magnitude = (gx * gx + gy * gy).sqrt();

    // Unit isophote direction: perpendicular to the gradient.
    let isophote = if magnitude > FLAT_GRADIENT {
        Some((-gy / magnitude, gx / magnitude))
    } else {
        None
    };

    let mut acc = [0.0f32; 4];
    let mut total = 0.0f32;
    for (dx, dy) in NEIGHBORS {
        let nx = xi + dx;
        let ny = yi + dy;
        if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
            continue;
        }
        let (ox, oy) = (dx as f32, dy as f32);
        let len2 = ox * ox + oy * oy;
        let w = match isophote {
            Some((ix, iy)) => {
                let along = (ox * ix + oy * iy).powi(2) / len2;
                (CROSS_WEIGHT + along) / len2.sqrt()
            }
            None => 1.0 / len2.sqrt(),
        };
        let i = at(nx as usize, ny as usize);
        for (c, slot) in acc.iter_mut().enumerate().take(channels) {
            *slot += w * pixels[i + c];
        }
        total += w;
    }

    if total > 0.0 {
        let i = at(x, y);
        for (c, slot) in acc.iter().enumerate().take(channels) {
            pixels[i + c] = slot / total;
        }
    }
}
