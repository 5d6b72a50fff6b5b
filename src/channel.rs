use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{avg_power, iter::Iter, undb};

/// Channel impairment models.
///
/// `Rician` is carried as a selector but fades exactly as `Rayleigh`: one
/// uniform block-fading factor, no line-of-sight component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseModel {
    Awgn,
    Rayleigh,
    Rician,
}

/// Above this SNR the channel passes the signal through unmodified,
/// whatever the noise model.
pub const NOISELESS_SNR_DB: f64 = 50.0;

/// Runs a signal through the channel at the requested SNR.
pub fn transmit<R: Rng>(signal: &[f64], model: NoiseModel, snr_db: f64, rng: &mut R) -> Vec<f64> {
    if snr_db > NOISELESS_SNR_DB || signal.is_empty() {
        return signal.to_vec();
    }
    match model {
        NoiseModel::Awgn => awgn(signal, snr_db, rng),
        NoiseModel::Rayleigh | NoiseModel::Rician => {
            // Flat block fading: a single factor for the whole sequence.
            let fading = rng.random_range(0.5..1f64);
            let faded: Vec<f64> = signal.iter().copied().scale(fading).collect();
            awgn(&faded, snr_db, rng)
        }
    }
}

/// Adds zero-mean Gaussian noise scaled to the signal's own power.
pub fn awgn<R: Rng>(signal: &[f64], snr_db: f64, rng: &mut R) -> Vec<f64> {
    let noise_power = avg_power(signal) / undb(snr_db);
    let normal = Normal::new(0f64, noise_power.sqrt()).unwrap();
    signal
        .iter()
        .zip(normal.sample_iter(rng))
        .map(|(&sample, noise)| sample + noise)
        .collect()
}
