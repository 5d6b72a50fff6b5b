use crate::{Bit, iter::Iter, line_code::LineCode};

/// Iteration cap for the two-cluster threshold search.
const MAX_ITERATIONS: usize = 10;
/// Center movement below which the search stops early.
const CONVERGENCE_EPS: f64 = 1e-6;

/// Decision threshold between the two amplitude clusters of a signal.
///
/// Two centers seeded at the quartile positions of the amplitude range are
/// refined by 2-means iterations; the threshold is the midpoint of the
/// final centers.
pub fn adaptive_threshold(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0f64;
    }

    let min = samples.iter().copied().fold(f64::MAX, f64::min);
    let max = samples.iter().copied().fold(f64::MIN, f64::max);
    let range = max - min;

    let mut low = min + 0.25 * range;
    let mut high = min + 0.75 * range;

    for _ in 0..MAX_ITERATIONS {
        let mut low_sum = 0f64;
        let mut low_count = 0usize;
        let mut high_sum = 0f64;
        let mut high_count = 0usize;

        for &sample in samples {
            if (sample - low).abs() <= (sample - high).abs() {
                low_sum += sample;
                low_count += 1;
            } else {
                high_sum += sample;
                high_count += 1;
            }
        }

        // An emptied cluster keeps its center.
        let new_low = if low_count > 0 {
            low_sum / low_count as f64
        } else {
            low
        };
        let new_high = if high_count > 0 {
            high_sum / high_count as f64
        } else {
            high
        };

        let converged =
            (new_low - low).abs() < CONVERGENCE_EPS && (new_high - high).abs() < CONVERGENCE_EPS;
        low = new_low;
        high = new_high;
        if converged {
            break;
        }
    }

    let threshold = (low + high) / 2f64;
    tracing::debug!(threshold, low_center = low, high_center = high, "adaptive threshold");
    threshold
}

/// Converts recovered symbol-rate samples back into bits.
pub fn decode(signal: &[f64], code: LineCode) -> Vec<Bit> {
    match code {
        LineCode::Manchester => decode_manchester(signal),
        LineCode::Ami | LineCode::Hdb3 => decode_ami(signal),
        LineCode::Nrz => {
            let threshold = adaptive_threshold(signal);
            signal.iter().map(|&s| s > threshold).collect()
        }
    }
}

/// Ternary decision: the threshold is found over sample magnitudes,
/// separating the zero level from the ±1 marks.
fn decode_ami(signal: &[f64]) -> Vec<Bit> {
    let magnitudes: Vec<f64> = signal.iter().map(|s| s.abs()).collect();
    let threshold = adaptive_threshold(&magnitudes);
    magnitudes.iter().map(|&m| m > threshold).collect()
}

/// Pairs consecutive half-bit symbols: (high, low) → 1, (low, high) → 0.
/// An ambiguous pair holds the previous decision; an odd symbol count is
/// padded with one low symbol before pairing.
fn decode_manchester(signal: &[f64]) -> Vec<Bit> {
    let threshold = adaptive_threshold(signal);
    let mut previous = false;
    signal
        .iter()
        .map(|&s| s > threshold)
        .whole_chunks(2)
        .map(|pair| {
            let bit = match (pair[0], pair[1]) {
                (true, false) => true,
                (false, true) => false,
                _ => previous,
            };
            previous = bit;
            bit
        })
        .collect()
}
