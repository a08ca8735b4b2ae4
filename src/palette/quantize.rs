//! Lloyd's k-means over RGB pixels with k-means++ seeding.
//!
//! The RNG is seeded from [`QuantizeOptions::seed`], so identical pixels and
//! options always produce identical centers and labels.

use super::types::Pixel;
use crate::error::PaletteError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

type Point = [f64; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeOptions {
    pub seed: u64,
    pub max_iterations: usize,
    /// Convergence threshold, relative to the mean per-channel variance.
    pub tolerance: f64,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Cluster centers plus the cluster index of every input pixel.
///
/// `centers[i]` is the mean of all pixels with `labels[k] == i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantization {
    pub centers: Vec<Point>,
    pub labels: Vec<usize>,
}

impl Quantization {
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centers.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Partition `pixels` into `n_colors` clusters.
pub fn quantize(
    pixels: &[Pixel],
    n_colors: usize,
    options: &QuantizeOptions,
) -> Result<Quantization, PaletteError> {
    if pixels.is_empty() {
        return Err(PaletteError::EmptyImage);
    }
    if n_colors == 0 {
        return Err(PaletteError::InvalidColorCount);
    }

    let distinct = pixels.iter().copied().collect::<HashSet<Pixel>>().len();
    if n_colors > distinct {
        return Err(PaletteError::NotEnoughColors {
            requested: n_colors,
            distinct,
        });
    }

    let points: Vec<Point> = pixels
        .iter()
        .map(|&[r, g, b]| [f64::from(r), f64::from(g), f64::from(b)])
        .collect();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut centers = plus_plus_init(&points, n_colors, &mut rng);
    let mut labels = vec![usize::MAX; points.len()];
    let threshold = options.tolerance * mean_variance(&points);

    for iteration in 0..options.max_iterations.max(1) {
        let changed = assign_labels(&points, &centers, &mut labels);
        fill_empty_clusters(&points, &centers, &mut labels, n_colors);

        let next = cluster_means(&points, &labels, n_colors);
        let shift: f64 = centers
            .iter()
            .zip(&next)
            .map(|(old, new)| squared_distance(old, new))
            .sum();
        centers = next;

        if changed == 0 || shift <= threshold {
            tracing::debug!(iteration, shift, "k-means converged");
            break;
        }
    }

    Ok(Quantization { centers, labels })
}

/// k-means++: the first center is uniform, every next one is drawn with
/// probability proportional to its squared distance from the chosen set.
fn plus_plus_init(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.random_range(0..points.len())]);

    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = nearest.iter().sum();
        let target = rng.random::<f64>() * total;

        let mut cumulative = 0.0;
        let mut chosen = None;
        for (idx, &d) in nearest.iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            cumulative += d;
            chosen = Some(idx);
            if cumulative > target {
                break;
            }
        }

        // With at least `k` distinct points some point is always off the chosen set.
        let Some(idx) = chosen else { break };
        let center = points[idx];
        for (p, d) in points.iter().zip(nearest.iter_mut()) {
            *d = d.min(squared_distance(p, &center));
        }
        centers.push(center);
    }

    centers
}

/// Returns how many labels changed. Ties go to the lowest center index.
fn assign_labels(points: &[Point], centers: &[Point], labels: &mut [usize]) -> usize {
    let mut changed = 0;
    for (point, label) in points.iter().zip(labels.iter_mut()) {
        let best = nearest_center(point, centers);
        if *label != best {
            *label = best;
            changed += 1;
        }
    }
    changed
}

fn nearest_center(point: &Point, centers: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (idx, center) in centers.iter().enumerate() {
        let d = squared_distance(point, center);
        if d < best_distance {
            best_distance = d;
            best = idx;
        }
    }
    best
}

/// Re-seed each empty cluster with the point farthest from its own center,
/// taken from a cluster that can spare one.
fn fill_empty_clusters(points: &[Point], centers: &[Point], labels: &mut [usize], k: usize) {
    let mut sizes = vec![0usize; k];
    for &label in labels.iter() {
        sizes[label] += 1;
    }

    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }

        let mut farthest = None;
        let mut farthest_distance = -1.0;
        for (idx, point) in points.iter().enumerate() {
            let label = labels[idx];
            if sizes[label] < 2 {
                continue;
            }
            let d = squared_distance(point, &centers[label]);
            if d > farthest_distance {
                farthest_distance = d;
                farthest = Some(idx);
            }
        }

        if let Some(idx) = farthest {
            sizes[labels[idx]] -= 1;
            labels[idx] = empty;
            sizes[empty] = 1;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn cluster_means(points: &[Point], labels: &[usize], k: usize) -> Vec<Point> {
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        for channel in 0..3 {
            sums[label][channel] += point[channel];
        }
        counts[label] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count == 0 {
                sum
            } else {
                let n = count as f64;
                [sum[0] / n, sum[1] / n, sum[2] / n]
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn mean_variance(points: &[Point]) -> f64 {
    let n = points.len() as f64;
    let mut variance = 0.0;
    for channel in 0..3 {
        let mean = points.iter().map(|p| p[channel]).sum::<f64>() / n;
        variance += points.iter().map(|p| (p[channel] - mean).powi(2)).sum::<f64>() / n;
    }
    variance / 3.0
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}
