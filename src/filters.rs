use std::f64::consts::PI;

use crate::{avg_power, iter::Iter, line_code::LineCode};

/// Transmit pulse shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseShape {
    Rectangular,
    RaisedCosine,
    RootRaisedCosine,
}

/// Tolerance for the removable singularities of the closed-form impulses.
const SINGULARITY_EPS: f64 = 1e-10;

#[inline]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < SINGULARITY_EPS {
        1f64
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Raised-cosine impulse response at `t` symbol periods from the peak.
///
/// The removable singularities at `t = 0` and `t = ±1/(2α)` take their
/// analytic limits.
pub fn raised_cosine_impulse(t: f64, rolloff: f64) -> f64 {
    if t.abs() < SINGULARITY_EPS {
        return 1f64;
    }
    let denominator = 1f64 - (2f64 * rolloff * t).powi(2);
    if denominator.abs() < SINGULARITY_EPS {
        return PI / 4f64 * sinc(1f64 / (2f64 * rolloff));
    }
    sinc(t) * (PI * rolloff * t).cos() / denominator
}

/// Root-raised-cosine impulse response at `t` symbol periods from the peak.
///
/// The singularity at `t = ±1/(4α)` takes its analytic limit. The center
/// value is 1.0, matching the raised-cosine peak rather than the textbook
/// `1 − α + 4α/π`.
pub fn root_raised_cosine_impulse(t: f64, rolloff: f64) -> f64 {
    if t.abs() < SINGULARITY_EPS {
        return 1f64;
    }
    if rolloff > 0f64 && (t.abs() - 1f64 / (4f64 * rolloff)).abs() < SINGULARITY_EPS {
        let sin_term = (1f64 + 2f64 / PI) * (PI / (4f64 * rolloff)).sin();
        let cos_term = (1f64 - 2f64 / PI) * (PI / (4f64 * rolloff)).cos();
        return rolloff / 2f64.sqrt() * (sin_term + cos_term);
    }
    let numerator =
        (PI * t * (1f64 - rolloff)).sin() + 4f64 * rolloff * t * (PI * t * (1f64 + rolloff)).cos();
    let denominator = PI * t * (1f64 - (4f64 * rolloff * t).powi(2));
    numerator / denominator
}

/// FIR taps spanning six symbol periods (`6·sps + 1` samples).
///
/// RC/RRC taps are energy-normalized with a `√sps` gain so symbol energy
/// survives the upsampling. Rectangular reduces to a one-symbol boxcar,
/// which is only used for response analysis (the shaping path holds
/// levels directly).
pub fn pulse_taps(shape: PulseShape, sps: usize, rolloff: f64) -> Vec<f64> {
    let impulse: fn(f64, f64) -> f64 = match shape {
        PulseShape::Rectangular => return vec![1f64; sps.max(1)],
        PulseShape::RaisedCosine => raised_cosine_impulse,
        PulseShape::RootRaisedCosine => root_raised_cosine_impulse,
    };

    let length = 6 * sps + 1;
    let center = (length / 2) as isize;
    let taps: Vec<f64> = (0..length)
        .map(|i| impulse((i as isize - center) as f64 / sps as f64, rolloff))
        .collect();

    let energy: f64 = taps.iter().map(|&h_i| h_i * h_i).sum();
    let norm = (energy / sps as f64).sqrt();
    taps.into_iter().scale(1f64 / norm).collect()
}

/// Upsamples and shapes a one-sample-per-symbol baseband signal.
pub fn shape(signal: &[f64], pulse: PulseShape, sps: usize, rolloff: f64) -> Vec<f64> {
    if signal.is_empty() || sps == 0 {
        return signal.to_vec();
    }
    match pulse {
        PulseShape::Rectangular => hold(signal, sps),
        _ => {
            let upsampled = zero_insert(signal, sps);
            convolve_trimmed(&upsampled, &pulse_taps(pulse, sps, rolloff))
        }
    }
}

/// Receive-side filtering matched to the transmit shaping.
///
/// Ternary codes get a causal exponential smoother so the zero level
/// survives; rectangular shaping gets a half-symbol moving average; RC/RRC
/// get the time-reversed transmit taps.
pub fn receive(
    signal: &[f64],
    pulse: PulseShape,
    sps: usize,
    rolloff: f64,
    code: LineCode,
) -> Vec<f64> {
    if sps == 0 || signal.len() < sps {
        return signal.to_vec();
    }
    if code.is_ternary() {
        smooth_exponential(signal, 0.8)
    } else if pulse == PulseShape::Rectangular {
        moving_average(signal, sps / 2)
    } else {
        matched(signal, pulse, sps, rolloff)
    }
}

/// Convolution with the time-reversed transmit taps.
pub fn matched(signal: &[f64], pulse: PulseShape, sps: usize, rolloff: f64) -> Vec<f64> {
    let mut taps = pulse_taps(pulse, sps, rolloff);
    taps.reverse();
    convolve_trimmed(signal, &taps)
}

/// Alternative transmit path: linear interpolation between symbol centers
/// instead of zero insertion, then exact mean-square energy compensation
/// against the unfiltered symbols.
pub fn shape_interpolating(symbols: &[f64], sps: usize, rolloff: f64) -> Vec<f64> {
    if symbols.is_empty() || sps == 0 {
        return symbols.to_vec();
    }
    let upsampled = upsample_interpolating(symbols, sps);
    let filtered = convolve_trimmed(&upsampled, &pulse_taps(PulseShape::RaisedCosine, sps, rolloff));
    compensate_energy(filtered, symbols)
}

/// Zero-order hold: each level repeated for a full symbol period.
fn hold(signal: &[f64], sps: usize) -> Vec<f64> {
    signal
        .iter()
        .flat_map(|&level| std::iter::repeat_n(level, sps))
        .collect()
}

fn zero_insert(signal: &[f64], sps: usize) -> Vec<f64> {
    signal
        .iter()
        .flat_map(|&level| std::iter::once(level).chain(std::iter::repeat_n(0f64, sps - 1)))
        .collect()
}

/// Full convolution trimmed back to the input length, discarding the
/// leading `taps.len()/2` samples of group delay.
fn convolve_trimmed(signal: &[f64], taps: &[f64]) -> Vec<f64> {
    signal
        .iter()
        .copied()
        .convolve(taps.to_vec())
        .skip(taps.len() / 2)
        .take(signal.len())
        .collect()
}

fn upsample_interpolating(symbols: &[f64], sps: usize) -> Vec<f64> {
    let mid = sps / 2;
    let mut upsampled = vec![0f64; symbols.len() * sps];
    for (i, &symbol) in symbols.iter().enumerate() {
        let base = i * sps;
        upsampled[base + mid] = symbol;
        if i + 1 < symbols.len() {
            let slope = (symbols[i + 1] - symbol) / sps as f64;
            for j in 0..sps {
                if j != mid {
                    upsampled[base + j] = symbol + slope * (j as f64 - mid as f64);
                }
            }
        }
    }
    upsampled
}

fn compensate_energy(filtered: Vec<f64>, original: &[f64]) -> Vec<f64> {
    let filtered_power = avg_power(&filtered);
    if filtered_power == 0f64 {
        return filtered;
    }
    let factor = (avg_power(original) / filtered_power).sqrt();
    filtered.into_iter().scale(factor).collect()
}

/// First-order IIR smoother, `y[i] = α·x[i] + (1−α)·y[i−1]`.
pub fn smooth_exponential(signal: &[f64], alpha: f64) -> Vec<f64> {
    let mut filtered = Vec::with_capacity(signal.len());
    let mut prev = 0f64;
    for &sample in signal {
        prev = alpha * sample + (1f64 - alpha) * prev;
        filtered.push(prev);
    }
    filtered
}

/// Symmetric moving average over `width/2` samples on each side,
/// clamped at the signal edges.
///
/// The symmetric window keeps the sign of held levels intact right up to
/// the symbol boundaries, so a sampling instant near an edge still
/// decodes correctly.
pub fn moving_average(signal: &[f64], width: usize) -> Vec<f64> {
    if width < 2 {
        return signal.to_vec();
    }
    let half = width / 2;
    (0..signal.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = std::cmp::min(signal.len(), i + half + 1);
            signal[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.1)]
    #[case(0.35)]
    #[case(0.5)]
    #[case(0.99)]
    fn center_tap_is_unity(#[case] rolloff: f64) {
        assert_eq!(raised_cosine_impulse(0f64, rolloff), 1f64);
        assert_eq!(root_raised_cosine_impulse(0f64, rolloff), 1f64);
    }

    #[rstest]
    #[case(0.1)]
    #[case(0.35)]
    #[case(0.5)]
    fn singularities_take_finite_limits(#[case] rolloff: f64) {
        let rc = raised_cosine_impulse(1f64 / (2f64 * rolloff), rolloff);
        let rrc = root_raised_cosine_impulse(1f64 / (4f64 * rolloff), rolloff);
        assert!(rc.is_finite());
        assert!(rrc.is_finite());
    }

    #[rstest]
    #[case(PulseShape::RaisedCosine)]
    #[case(PulseShape::RootRaisedCosine)]
    fn taps_are_normalized_and_symmetric(#[case] pulse: PulseShape) {
        let sps = 8;
        let taps = pulse_taps(pulse, sps, 0.35);

        assert_eq!(taps.len(), 6 * sps + 1);
        let energy: f64 = taps.iter().map(|&h| h * h).sum();
        assert_approx_eq!(energy, sps as f64, 1e-9);
        for (i, &h_i) in taps.iter().enumerate() {
            assert_approx_eq!(h_i, taps[taps.len() - 1 - i], 1e-9);
        }
    }

    #[test]
    fn rectangular_shape_holds_levels() {
        let shaped = shape(&[1f64, -1f64], PulseShape::Rectangular, 4, 0.35);
        assert_eq!(
            shaped,
            vec![1f64, 1f64, 1f64, 1f64, -1f64, -1f64, -1f64, -1f64]
        );
    }

    #[rstest]
    #[case(PulseShape::RaisedCosine)]
    #[case(PulseShape::RootRaisedCosine)]
    fn shaped_length_matches_upsampling(#[case] pulse: PulseShape) {
        let symbols = crate::line_code::encode(&crate::random_bits(50), LineCode::Nrz);
        let shaped = shape(&symbols, pulse, 8, 0.35);
        assert_eq!(shaped.len(), symbols.len() * 8);
    }

    #[test]
    fn raised_cosine_peaks_at_symbol_centers() {
        // An isolated symbol surrounded by zeros reproduces the impulse
        // peak at its own sampling instant.
        let mut symbols = vec![0f64; 15];
        symbols[7] = 1f64;
        let sps = 8;
        let shaped = shape(&symbols, PulseShape::RaisedCosine, sps, 0.35);

        let peak = shaped
            .iter()
            .map(|s| s.abs())
            .fold(f64::NEG_INFINITY, f64::max);
        assert_approx_eq!(shaped[7 * sps].abs(), peak, 1e-9);
    }

    #[test]
    fn interpolating_path_preserves_energy() {
        let symbols = crate::line_code::encode(&crate::random_bits(100), LineCode::Nrz);
        let shaped = shape_interpolating(&symbols, 8, 0.35);

        assert_eq!(shaped.len(), symbols.len() * 8);
        assert_approx_eq!(avg_power(&shaped), avg_power(&symbols), 1e-9);
    }

    #[test]
    fn short_input_passes_through_receive() {
        let stub = [0.5f64, -0.5f64];
        let out = receive(&stub, PulseShape::RaisedCosine, 8, 0.35, LineCode::Nrz);
        assert_eq!(out, stub);
    }

    #[test]
    fn exponential_smoother_tracks_dc() {
        let signal = vec![1f64; 64];
        let smoothed = smooth_exponential(&signal, 0.8);
        assert_approx_eq!(smoothed[0], 0.8);
        assert_approx_eq!(*smoothed.last().unwrap(), 1f64, 1e-9);
    }

    #[test]
    fn moving_average_flattens_constant() {
        let signal = vec![0.8f64; 32];
        for &sample in &moving_average(&signal, 4) {
            assert_approx_eq!(sample, 0.8);
        }
    }
}
