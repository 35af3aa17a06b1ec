//! Fast-marching inpainting after A. Telea, "An Image Inpainting Technique
//! Based on the Fast Marching Method" (2004).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::inpainting::domain::mask::Mask;

const KNOWN: u8 = 0;
const BAND: u8 = 1;
const INSIDE: u8 = 2;

const FAR: f32 = 1.0e6;

/// Min-heap entry keyed on arrival time.
#[derive(Clone, Copy)]
struct Narrow {
    t: f32,
    idx: usize,
}

impl PartialEq for Narrow {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Narrow {}

impl PartialOrd for Narrow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Narrow {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .t
            .total_cmp(&self.t)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Grid geometry shared by the marching and sampling steps.
#[derive(Clone, Copy)]
struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    fn offset(&self, idx: usize, dx: isize, dy: isize) -> Option<usize> {
        let x = (idx % self.width) as isize + dx;
        let y = (idx / self.width) as isize + dy;
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }
}

/// Fills the masked pixels of packed `data` in place.
pub fn inpaint(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    mask: &Mask,
    radius: f64,
) {
    let grid = Grid { width, height };
    let n = width * height;
    let mut flags = vec![KNOWN; n];
    let mut dist = vec![0.0f32; n];
    let mut heap = BinaryHeap::new();

    for (idx, flag) in flags.iter_mut().enumerate() {
        if mask.get(idx % width, idx / width) {
            *flag = INSIDE;
            dist[idx] = FAR;
        }
    }

    // Initial narrow band: known pixels touching the mask.
    for idx in 0..n {
        if flags[idx] != KNOWN {
            continue;
        }
        let touches_mask = neighbors4(grid, idx).any(|nb| flags[nb] == INSIDE);
        if touches_mask {
            flags[idx] = BAND;
            heap.push(Narrow { t: 0.0, idx });
        }
    }

    let mut pixels: Vec<f32> = data.iter().map(|&v| f32::from(v)).collect();

    while let Some(Narrow { idx, .. }) = heap.pop() {
        if flags[idx] == KNOWN {
            continue;
        }
        flags[idx] = KNOWN;

        for nb in neighbors4(grid, idx) {
            if flags[nb] == KNOWN {
                continue;
            }
            let t = arrival_time(grid, &flags, &dist, nb);
            dist[nb] = dist[nb].min(t);

            if flags[nb] == INSIDE {
                flags[nb] = BAND;
                fill_pixel(grid, channels, &flags, &dist, &mut pixels, nb, radius);
            }
            heap.push(Narrow { t: dist[nb], idx: nb });
        }
    }

    for (dst, &src) in data.iter_mut().zip(pixels.iter()) {
        *dst = src.round().clamp(0.0, 255.0) as u8;
    }
}

fn neighbors4(grid: Grid, idx: usize) -> impl Iterator<Item = usize> {
    [(0, -1), (-1, 0), (1, 0), (0, 1)]
        .into_iter()
        .filter_map(move |(dx, dy)| grid.offset(idx, dx, dy))
}

/// Solves the eikonal equation |∇T| = 1 at `idx` from its four quadrants.
fn arrival_time(grid: Grid, flags: &[u8], dist: &[f32], idx: usize) -> f32 {
    let up = grid.offset(idx, 0, -1);
    let down = grid.offset(idx, 0, 1);
    let left = grid.offset(idx, -1, 0);
    let right = grid.offset(idx, 1, 0);

    [(up, left), (down, left), (up, right), (down, right)]
        .into_iter()
        .map(|(a, b)| solve(flags, dist, a, b))
        .fold(FAR, f32::min)
}

fn solve(flags: &[u8], dist: &[f32], a: Option<usize>, b: Option<usize>) -> f32 {
    let sample = |p: Option<usize>| p.map(|i| (dist[i], flags[i] != INSIDE));
    match (sample(a), sample(b)) {
        (Some((t1, true)), Some((t2, true))) => {
            let diff = t1 - t2;
            if diff.abs() >= 1.0 {
                1.0 + t1.min(t2)
            } else {
                (t1 + t2 + (2.0 - diff * diff).sqrt()) * 0.5
            }
        }
        (Some((t1, true)), _) => 1.0 + t1,
        (_, Some((t2, true))) => 1.0 + t2,
        _ => FAR,
    }
}

/// Distance-field gradient at `idx`, using only non-inside neighbours.
fn gradient(grid: Grid, flags: &[u8], dist: &[f32], idx: usize) -> (f32, f32) {
    let axis = |lo: Option<usize>, hi: Option<usize>| {
        let known = |p: Option<usize>| p.filter(|&i| flags[i] != INSIDE);
        match (known(lo), known(hi)) {
            (Some(l), Some(h)) => (dist[h] - dist[l]) * 0.5,
            (None, Some(h)) => dist[h] - dist[idx],
            (Some(l), None) => dist[idx] - dist[l],
            (None, None) => 0.0,
        }
    };
    (
        axis(grid.offset(idx, -1, 0), grid.offset(idx, 1, 0)),
        axis(grid.offset(idx, 0, -1), grid.offset(idx, 0, 1)),
    )
}

/// Weighted average of already-known pixels within `radius` of `idx`.
fn fill_pixel(
    grid: Grid,
    channels: usize,
    flags: &[u8],
    dist: &[f32],
    pixels: &mut [f32],
    idx: usize,
    radius: f64,
) {
    let (gx, gy) = gradient(grid, flags, dist, idx);
    let reach = radius.ceil().max(1.0) as isize;
    let r2 = (radius * radius) as f32;

    let mut acc = [0.0f32; 4];
    let mut total = 0.0f32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if dx == 0 && dy == 0 {
                continue;
            }
            let d2 = (dx * dx + dy * dy) as f32;
            if d2 > r2 {
                continue;
            }
            let Some(q) = grid.offset(idx, dx, dy) else {
                continue;
            };
            if flags[q] == INSIDE {
                continue;
            }
            // r points from the sample towards the pixel being filled
            let (rx, ry) = (-dx as f32, -dy as f32);
            let mut dir = rx * gx + ry * gy;
            if dir.abs() <= 0.01 {
                dir = 1.0e-6;
            }
            let dst = 1.0 / d2;
            let lev = 1.0 / (1.0 + (dist[q] - dist[idx]).abs());
            let w = (dir * dst * lev).abs();

            for (c, slot) in acc.iter_mut().enumerate().take(channels) {
                *slot += w * pixels[q * channels + c];
            }
            total += w;
        }
    }

    if total <= 0.0 {
        fill_from_neighbors(grid, channels, flags, pixels, idx);
        return;
    }
    for (c, slot) in acc.iter().enumerate().take(channels) {
        pixels[idx * channels + c] = slot / total;
    }
}

/// Plain mean of the 8-neighbourhood, for radii too small to reach any
/// known sample.
fn fill_from_neighbors(
    grid: Grid,
    channels: usize,
    flags: &[u8],
    pixels: &mut [f32],
    idx: usize,
) {
    let mut acc = [0.0f32; 4];
    let mut count = 0.0f32;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let Some(q) = grid.offset(idx, dx, dy) else {
                continue;
            };
            if q == idx || flags[q] == INSIDE {
                continue;
            }
            for (c, slot) in acc.iter_mut().enumerate().take(channels) {
                *slot += pixels[q * channels + c];
            }
            count += 1.0;
        }
    }
    if count > 0.0 {
        for (c, slot) in acc.iter().enumerate().take(channels) {
            pixels[idx * channels + c] = slot / count;
        }
    }
}
