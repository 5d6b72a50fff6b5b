use crate::iter::Iter;

/// Recovers symbol-rate samples from a matched-filtered signal.
///
/// The sampling instant is the intra-symbol offset with the widest eye
/// opening; the signal is then downsampled to one sample per symbol.
/// Inputs shorter than one symbol period pass through unchanged.
pub fn recover(signal: &[f64], sps: usize) -> Vec<f64> {
    if sps == 0 || signal.len() < sps {
        return signal.to_vec();
    }

    let offset = optimal_sampling_offset(signal, sps);
    let num_symbols = signal.len() / sps;

    tracing::debug!(
        signal_len = signal.len(),
        samples_per_symbol = sps,
        num_symbols,
        offset,
        "clock recovery"
    );

    signal
        .iter()
        .copied()
        .skip(offset)
        .take_every(sps)
        .take(num_symbols)
        .collect()
}

/// Eye-opening search over every candidate sampling offset.
///
/// A center sample only counts when its sign matches the samples one
/// symbol before and after it (a stable bipolar run, not a transition
/// edge). Offsets where both a positive and a negative level were seen
/// compete on `min_high − max_low`; with no usable offset the middle of
/// the symbol period wins by default.
pub fn optimal_sampling_offset(signal: &[f64], sps: usize) -> usize {
    let window = 3 * sps;
    let mut best_offset = sps / 2;
    let mut max_opening = 0f64;

    for offset in 0..sps {
        let mut min_high = f64::MAX;
        let mut max_low = f64::MIN;
        let mut valid = 0usize;

        let mut i = offset;
        while i + window < signal.len() {
            let center = signal[i + sps];
            let prev = signal[i];
            let next = signal[i + 2 * sps];
            i += sps;

            if center.signum() != prev.signum() || center.signum() != next.signum() {
                continue;
            }
            if center > 0f64 && center < min_high {
                min_high = center;
            }
            if center < 0f64 && center > max_low {
                max_low = center;
            }
            valid += 1;
        }

        if valid > 0 && min_high < f64::MAX && max_low > f64::MIN {
            let opening = min_high - max_low;
            if opening > max_opening {
                max_opening = opening;
                best_offset = offset;
            }
        }
    }

    best_offset
}
