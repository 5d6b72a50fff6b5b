use crate::{Bit, bit_to_nrz};

/// Baseband line codes.
///
/// `Hdb3` is carried as a separate selector but encodes and decodes as AMI:
/// the zero-substitution rules of real HDB3 are not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCode {
    Nrz,
    Manchester,
    Ami,
    Hdb3,
}

impl LineCode {
    /// Baseband symbols emitted per input bit.
    pub fn samples_per_bit(&self) -> usize {
        match self {
            LineCode::Manchester => 2,
            _ => 1,
        }
    }

    /// Codes with the three-level {−1, 0, +1} alphabet.
    pub fn is_ternary(&self) -> bool {
        matches!(self, LineCode::Ami | LineCode::Hdb3)
    }
}

pub fn encode(bits: &[Bit], code: LineCode) -> Vec<f64> {
    match code {
        LineCode::Nrz => encode_nrz(bits.iter().copied()).collect(),
        LineCode::Manchester => encode_manchester(bits.iter().copied()).collect(),
        LineCode::Ami => encode_ami(bits.iter().copied()).collect(),
        LineCode::Hdb3 => encode_hdb3(bits.iter().copied()).collect(),
    }
}

pub fn encode_nrz<I: Iterator<Item = Bit>>(bits: I) -> impl Iterator<Item = f64> {
    bits.map(bit_to_nrz)
}

/// Two symbols per bit: 1 → (+1, −1), 0 → (−1, +1).
pub fn encode_manchester<I: Iterator<Item = Bit>>(bits: I) -> impl Iterator<Item = f64> {
    bits.flat_map(|bit| {
        if bit {
            [1f64, -1f64]
        } else {
            [-1f64, 1f64]
        }
    })
}

/// Marks alternate polarity on every transmitted one, starting positive.
pub fn encode_ami<I: Iterator<Item = Bit>>(bits: I) -> impl Iterator<Item = f64> {
    bits.scan(1f64, |polarity, bit| {
        Some(if bit {
            let level = *polarity;
            *polarity = -*polarity;
            level
        } else {
            0f64
        })
    })
}

/// HDB3 without zero substitution, i.e. plain AMI.
pub fn encode_hdb3<I: Iterator<Item = Bit>>(bits: I) -> impl Iterator<Item = f64> {
    encode_ami(bits)
}
