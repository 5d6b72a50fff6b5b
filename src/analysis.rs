use itertools::Itertools;
use num_complex::Complex;
use realfft::RealFftPlanner;

use crate::{avg_power, db, iter::Iter};

/// Qualitative signal-quality buckets derived from the eye metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Excellent,
    Good,
    Average,
    Poor,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Quality::Excellent => "Excellent",
            Quality::Good => "Good",
            Quality::Average => "Average",
            Quality::Poor => "Poor",
        };
        write!(f, "{label}")
    }
}

/// Eye-diagram metrics of a matched-filtered signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMetrics {
    pub max_opening: f64,
    pub min_opening: f64,
    pub best_offset: usize,
    pub min_high: f64,
    pub max_low: f64,
    /// Mean zero-crossing deviation from the symbol center, as a fraction
    /// of the symbol period.
    pub jitter: f64,
    /// Distance from the closest level to the zero decision threshold.
    pub noise_margin: f64,
}

impl EyeMetrics {
    pub fn quality_score(&self) -> f64 {
        self.max_opening * (1f64 - self.jitter)
    }

    pub fn quality(&self) -> Quality {
        let score = self.quality_score();
        if score > 0.8 {
            Quality::Excellent
        } else if score > 0.6 {
            Quality::Good
        } else if score > 0.4 {
            Quality::Average
        } else {
            Quality::Poor
        }
    }
}

/// Min/max/mean statistics of a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Distribution {
    pub fn dynamic_range(&self) -> f64 {
        self.max - self.min
    }
}

/// SNR actually realized by the channel, from the clean and noisy copies
/// of the same signal. Returns +∞ when the noise term is exactly zero.
pub fn effective_snr(clean: &[f64], noisy: &[f64]) -> f64 {
    let noise: Vec<f64> = clean
        .iter()
        .zip(noisy.iter())
        .map(|(&c_i, &n_i)| n_i - c_i)
        .collect();
    let noise_power = avg_power(&noise);
    if noise_power == 0f64 {
        return f64::INFINITY;
    }
    db(avg_power(clean) / noise_power)
}

/// Folds the signal at the symbol rate and measures the eye.
///
/// High samples are those above zero. Offsets where only one level was
/// seen contribute a zero opening.
pub fn eye_pattern(signal: &[f64], sps: usize) -> EyeMetrics {
    if sps == 0 || signal.len() < sps {
        return EyeMetrics {
            max_opening: 0f64,
            min_opening: 0f64,
            best_offset: 0,
            min_high: 0f64,
            max_low: 0f64,
            jitter: 0f64,
            noise_margin: 0f64,
        };
    }

    let mut max_opening = 0f64;
    let mut min_opening = f64::MAX;
    let mut best_offset = 0usize;
    let mut best_min_high = 0f64;
    let mut best_max_low = 0f64;

    for offset in 0..sps {
        let mut min_high = f64::MAX;
        let mut max_low = -f64::MAX;

        for sample in signal.iter().copied().skip(offset).take_every(sps) {
            if sample > 0f64 {
                min_high = min_high.min(sample);
            } else {
                max_low = max_low.max(sample);
            }
        }

        let opening = if min_high < f64::MAX && max_low > -f64::MAX {
            min_high - max_low
        } else {
            0f64
        };
        if opening > max_opening {
            max_opening = opening;
            best_offset = offset;
            best_min_high = min_high;
            best_max_low = max_low;
        }
        min_opening = min_opening.min(opening);
    }

    let jitter = eye_jitter(signal, sps);
    EyeMetrics {
        max_opening,
        min_opening,
        best_offset,
        min_high: best_min_high,
        max_low: best_max_low,
        jitter,
        noise_margin: (best_min_high - 0f64).min(0f64 - best_max_low),
    }
}

/// Average deviation of zero crossings from the symbol's temporal center,
/// normalized by the symbol period.
fn eye_jitter(signal: &[f64], sps: usize) -> f64 {
    let mut total_variation = 0f64;
    let mut transitions = 0usize;

    for symbol in signal[sps.min(signal.len())..].chunks(sps) {
        for (i, (&a, &b)) in symbol.iter().tuple_windows().enumerate() {
            if a * b < 0f64 {
                let crossing = i as f64 + a.abs() / (a.abs() + b.abs());
                total_variation += (crossing - sps as f64 / 2f64).abs();
                transitions += 1;
            }
        }
    }

    if transitions > 0 {
        total_variation / (transitions * sps) as f64
    } else {
        0f64
    }
}

/// Noise margin via a two-cluster partition of the signal around its mean.
///
/// A single classification pass splits the samples, the midpoint of the
/// cluster means becomes the decision threshold, and the margin is the gap
/// between the levels closest to it.
pub fn noise_margin(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0f64;
    }
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;

    let mut high_sum = 0f64;
    let mut high_count = 0usize;
    let mut low_sum = 0f64;
    let mut low_count = 0usize;
    for &sample in signal {
        if sample > mean {
            high_sum += sample;
            high_count += 1;
        } else {
            low_sum += sample;
            low_count += 1;
        }
    }

    let mean_high = if high_count > 0 {
        high_sum / high_count as f64
    } else {
        1f64
    };
    let mean_low = if low_count > 0 {
        low_sum / low_count as f64
    } else {
        -1f64
    };
    let threshold = (mean_high + mean_low) / 2f64;

    let mut min_high_level = f64::MAX;
    let mut max_low_level = -f64::MAX;
    for &sample in signal {
        if sample > threshold {
            min_high_level = min_high_level.min(sample);
        } else {
            max_low_level = max_low_level.max(sample);
        }
    }
    if min_high_level == f64::MAX || max_low_level == -f64::MAX {
        return 0f64;
    }

    let margin = min_high_level - max_low_level;
    tracing::debug!(threshold, mean_high, mean_low, margin, "noise margin");
    margin
}

/// Per-sample statistics of a signal.
pub fn distribution(signal: &[f64]) -> Distribution {
    if signal.is_empty() {
        return Distribution {
            min: 0f64,
            max: 0f64,
            mean: 0f64,
            std_dev: 0f64,
        };
    }
    let min = signal.iter().copied().fold(f64::MAX, f64::min);
    let max = signal.iter().copied().fold(-f64::MAX, f64::max);
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    let variance = signal
        .iter()
        .map(|&s| (s - mean) * (s - mean))
        .sum::<f64>()
        / signal.len() as f64;

    Distribution {
        min,
        max,
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Amplitude histogram as (bin center, count) pairs.
pub fn histogram(signal: &[f64], bins: usize) -> Vec<(f64, usize)> {
    if signal.is_empty() || bins == 0 {
        return Vec::new();
    }
    let stats = distribution(signal);
    let width = stats.dynamic_range() / bins as f64;

    let mut counts = vec![0usize; bins];
    for &sample in signal {
        let bin = if width > 0f64 {
            (((sample - stats.min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (stats.min + (i as f64 + 0.5) * width, count))
        .collect()
}

/// Magnitude response of an FIR tap vector on `n` points from DC to
/// Nyquist. Taps beyond `2n` samples are ignored.
pub fn frequency_response(taps: &[f64], n: usize) -> Vec<f64> {
    let fft_len = 2 * n;
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_len);

    let mut input = fft.make_input_vec();
    let mut output: Vec<Complex<f64>> = fft.make_output_vec();
    for (slot, &h_i) in input.iter_mut().zip(taps.iter()) {
        *slot = h_i;
    }
    fft.process(&mut input, &mut output).unwrap();

    output.iter().take(n).map(|bin| bin.norm()).collect()
}

/// Normalized −3 dB bandwidth of a magnitude response (1.0 = Nyquist).
pub fn occupied_bandwidth(response: &[f64]) -> f64 {
    if response.is_empty() {
        return 1f64;
    }
    let cutoff = response[0] / 2f64.sqrt();
    for (i, &magnitude) in response.iter().enumerate() {
        if magnitude < cutoff {
            return i as f64 / response.len() as f64;
        }
    }
    1f64
}
