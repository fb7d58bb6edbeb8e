// Gaussian kernel helpers
//
// Both curve builders smooth with the same truncated Gaussian: the density
// estimator in seconds around each event interval, the aggregator in slices
// along the normalized time axis.

/// Unnormalized Gaussian weight `exp(-d² / 2σ²)`
pub fn gaussian(distance: f64, sigma: f64) -> f64 {
    let sigma = sigma.max(f64::EPSILON);
    (-(distance * distance) / (2.0 * sigma * sigma)).exp()
}

/// Distance from `t` to `[start, end]` (0 inside the interval)
pub fn distance_to_interval(t: f64, start: f64, end: f64) -> f64 {
    if t < start {
        start - t
    } else if t > end {
        t - end
    } else {
        0.0
    }
}

/// Smooth a series with a truncated Gaussian
///
/// The kernel is cut at `cutoff_sigmas × sigma` samples. Near the edges the
/// kernel is truncated (no wraparound) and renormalized over the samples that
/// exist, so a constant series stays constant.
pub fn smooth_series(values: &[f64], sigma: f64, cutoff_sigmas: f64) -> Vec<f64> {
    if values.is_empty() || !(sigma > 0.0) {
        return values.to_vec();
    }

    let last = values.len() - 1;
    // No offset can exceed the series length
    let radius = ((cutoff_sigmas.max(0.0) * sigma).floor() as usize).min(last);
    let weights: Vec<f64> = (0..=radius).map(|k| gaussian(k as f64, sigma)).collect();

    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(last);
            let (mut acc, mut norm) = (0.0, 0.0);
            for (j, value) in values.iter().enumerate().take(hi + 1).skip(lo) {
                let w = weights[i.abs_diff(j)];
                acc += w * value;
                norm += w;
            }
            if norm > 0.0 {
                acc / norm
            } else {
                0.0
            }
        })
        .collect()
}
