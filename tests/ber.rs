use average::Mean;
use rayon::prelude::*;

use transsendilo::{Modulation, SimulationConfig, Simulator};

/// One simulator per trial: the instance owns its RNG and cached input, so
/// parallel trials stay independent.
fn trial_bers(config: SimulationConfig, trials: usize, seed: u64) -> Vec<f64> {
    (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut sim = Simulator::with_seed(seed + trial as u64);
            sim.run(&config).ber
        })
        .collect()
}

#[test]
fn deep_noise_floods_the_decoder() {
    let trials = std::cmp::max(20, 2 * num_cpus::get());
    let config = SimulationConfig {
        sequence_length: 32,
        snr_db: -5f64,
        ..Default::default()
    };

    let mean: Mean = trial_bers(config, trials, 1000).into_iter().collect();
    assert!(mean.mean() > 0.1, "mean ber {}", mean.mean());
}

#[test]
fn quiet_channel_never_errors() {
    let config = SimulationConfig {
        sequence_length: 64,
        snr_db: 50f64,
        ..Default::default()
    };

    for ber in trial_bers(config, 16, 2000) {
        assert_eq!(ber, 0f64);
    }
}

#[test]
fn ber_curve_degrades_with_noise_for_every_scheme() {
    for modulation in [Modulation::Ask, Modulation::Psk, Modulation::Fsk] {
        let mut sim = Simulator::with_seed(3000);
        let curve = sim.run_performance_test(modulation, 256);

        assert_eq!(curve.len(), 8);
        for &(_, ber) in &curve {
            assert!((0f64..=1f64).contains(&ber));
        }

        let worst = curve[0].1;
        let best = curve[curve.len() - 1].1;
        assert!(
            worst > best,
            "{modulation:?}: ber at -3 dB ({worst}) vs 30 dB ({best})"
        );
    }
}

#[test]
fn averaged_ber_falls_monotonically_enough() {
    // Re-run the low/high ends of the sweep many times; averaging has to
    // separate them cleanly even though single trials are noisy.
    let noisy_config = SimulationConfig {
        sequence_length: 128,
        snr_db: 0f64,
        ..Default::default()
    };
    let quiet_config = SimulationConfig {
        sequence_length: 128,
        snr_db: 20f64,
        ..Default::default()
    };

    let noisy: Mean = trial_bers(noisy_config, 32, 4000).into_iter().collect();
    let quiet: Mean = trial_bers(quiet_config, 32, 5000).into_iter().collect();
    assert!(
        noisy.mean() > quiet.mean(),
        "ber at 0 dB ({}) vs 20 dB ({})",
        noisy.mean(),
        quiet.mean()
    );
}
