//! Energy reductions over sample slices.

/// Sum of squares.
pub(crate) fn energy(samples: &[f64]) -> f64 {
    samples.iter().map(|&s| s * s).sum()
}

/// Sum of squared differences `decoded - original`.
pub(crate) fn error_energy(original: &[f64], decoded: &[f64]) -> f64 {
    original
        .iter()
        .zip(decoded)
        .map(|(&o, &d)| {
            let delta = d - o;
            delta * delta
        })
        .sum()
}

/// Sum of squared midpoints `(decoded + original) / 2`.
pub(crate) fn midpoint_energy(original: &[f64], decoded: &[f64]) -> f64 {
    original
        .iter()
        .zip(decoded)
        .map(|(&o, &d)| {
            let mid = (d + o) * 0.5;
            mid * mid
        })
        .sum()
}

/// Root mean square from an energy and a sample count; zero for no samples.
pub(crate) fn rms(energy: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (energy / count as f64).sqrt()
}

/// Signal-to-noise ratio in decibels.
///
/// Silence compared against silence is `+inf`. Otherwise the ratio follows
/// IEEE semantics: zero noise gives `+inf`, zero signal gives `-inf`.
pub(crate) fn snr_db(signal_energy: f64, noise_energy: f64) -> f64 {
    if signal_energy == 0.0 && noise_energy == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (signal_energy / noise_energy).log10()
}

/// Relative error of one frame: `sqrt(error energy / midpoint energy)`.
///
/// A frame with no error is `0` even when both frames are silent.
pub(crate) fn relative_error(original: &[f64], decoded: &[f64]) -> f64 {
    let delta = error_energy(original, decoded);
    if delta == 0.0 {
        return 0.0;
    }
    (delta / midpoint_energy(original, decoded)).sqrt()
}
