/// Carrier mapping schemes.
///
/// `Qpsk` and `Qam` are carried as selectors but map through the PSK path;
/// no constellation beyond the binary one is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Ask,
    Fsk,
    Psk,
    Qpsk,
    Qam,
}

/// Samples with magnitude below this band count as the ternary zero level.
const ZERO_BAND: f64 = 0.1;
/// Fraction of near-zero samples above which the input is taken as ternary.
const TERNARY_FRACTION: f64 = 0.1;

const ASK_LEVEL: f64 = 0.8;
const FSK_LEVEL: f64 = 0.7;
const PSK_LEVEL: f64 = 1.0;

/// Maps a shaped baseband signal onto the transmit amplitude alphabet.
pub fn modulate(signal: &[f64], scheme: Modulation) -> Vec<f64> {
    match scheme {
        Modulation::Ask => modulate_ask(signal),
        Modulation::Fsk => level_map(signal, FSK_LEVEL),
        Modulation::Psk | Modulation::Qpsk | Modulation::Qam => level_map(signal, PSK_LEVEL),
    }
}

/// Inverse mapping back toward baseband.
///
/// The simplified schemes defer every decision to the decoder, so this
/// stage is a pass-through boundary.
pub fn demodulate(signal: &[f64], _scheme: Modulation) -> Vec<f64> {
    signal.to_vec()
}

fn modulate_ask(signal: &[f64]) -> Vec<f64> {
    let near_zero = signal.iter().filter(|s| s.abs() < ZERO_BAND).count();
    let ternary = near_zero as f64 > TERNARY_FRACTION * signal.len() as f64;
    if ternary {
        signal
            .iter()
            .map(|&s| {
                if s.abs() < ZERO_BAND {
                    0f64
                } else {
                    s.signum() * ASK_LEVEL
                }
            })
            .collect()
    } else {
        level_map(signal, ASK_LEVEL)
    }
}

fn level_map(signal: &[f64], level: f64) -> Vec<f64> {
    signal.iter().map(|&s| s.signum() * level).collect()
}
