use rand::Rng;

pub mod analysis;
pub mod chain;
pub mod channel;
pub mod clock_recovery;
pub mod decoder;
pub mod filters;
pub mod iter;
pub mod line_code;
pub mod modulation;

pub use crate::{
    analysis::{EyeMetrics, Quality},
    chain::{SimulationConfig, SimulationReport, Simulator},
    channel::NoiseModel,
    filters::PulseShape,
    line_code::LineCode,
    modulation::Modulation,
};

pub type Bit = bool;

#[inline]
pub fn db(x: f64) -> f64 {
    10f64 * x.log10()
}

#[inline]
pub fn undb(x: f64) -> f64 {
    10f64.powf(x / 10f64)
}

#[inline]
pub fn linspace(start: f64, stop: f64, num: usize) -> impl Iterator<Item = f64> {
    let step = (stop - start) / ((num - 1) as f64);
    (0..num).map(move |i| start + step * (i as f64))
}

#[inline]
pub fn bit_to_nrz(bit: Bit) -> f64 {
    if bit {
        1_f64
    } else {
        -1_f64
    }
}

pub fn random_bits(num_bits: usize) -> Vec<Bit> {
    let mut rng = rand::rng();
    (0..num_bits).map(|_| rng.random::<Bit>()).collect()
}

/// Calculates the power per sample.
#[inline]
pub fn avg_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0f64;
    }
    signal.iter().map(|&sample| sample * sample).sum::<f64>() / signal.len() as f64
}

/// Bit error rate over the shorter of the two sequences.
///
/// An empty sequence counts as maximal error.
#[inline]
pub fn ber(tx: &[Bit], rx: &[Bit]) -> f64 {
    let len: usize = std::cmp::min(tx.len(), rx.len());
    if len == 0 {
        return 1f64;
    }
    let errors: usize = tx
        .iter()
        .zip(rx.iter())
        .map(|(&ti, &ri)| if ti == ri { 0 } else { 1 })
        .sum();
    (errors as f64) / (len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ber_bounds() {
        let bits: Vec<Bit> = random_bits(256);
        let flipped: Vec<Bit> = bits.iter().map(|&b| !b).collect();

        assert_eq!(ber(&bits, &bits), 0f64);
        assert_eq!(ber(&bits, &flipped), 1f64);
        assert_eq!(ber(&[], &bits), 1f64);
    }

    #[test]
    fn ber_truncates_to_shorter() {
        let bits: Vec<Bit> = random_bits(100);
        assert_eq!(ber(&bits, &bits[..50]), 0f64);
    }

    #[test]
    fn db_round_trip() {
        assert_approx_eq::assert_approx_eq!(undb(db(2f64)), 2f64);
        assert_approx_eq::assert_approx_eq!(db(10f64), 10f64);
    }

    #[test]
    fn linspace_hits_both_endpoints() {
        let points: Vec<f64> = linspace(0f64, 1f64, 5).collect();
        assert_eq!(points, vec![0f64, 0.25, 0.5, 0.75, 1f64]);
    }
}
