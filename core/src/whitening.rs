//! Information-bit whitening
//!
//! Framed payload bits are XORed with a fixed pseudorandom mask before LDPC
//! encoding, so short or mostly-zero payloads still produce a busy codeword.
//! The mask is the output of a 15-bit PRBS generator (`x^15 + x^14 + 1`),
//! one bit per register step, starting from the configured seed. Applying
//! the same mask twice restores the original bits.

use crate::error::{AudioModemError, Result};

/// Default generator seed.
pub const DEFAULT_WHITENING_SEED: u16 = 0x5A5A;

/// Period of the 15-bit maximal-length sequence.
pub const WHITENING_PERIOD: usize = (1 << 15) - 1;

const STATE_MASK: u16 = 0x7FFF;

/// Seeded PRBS15 whitening mask generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Whitening {
    seed: u16,
}

impl Default for Whitening {
    fn default() -> Self {
        Self {
            seed: DEFAULT_WHITENING_SEED,
        }
    }
}

impl Whitening {
    /// The seed loads the 15-bit register. It must be nonzero in those bits.
    pub fn new(seed: u16) -> Result<Self> {
        if seed & STATE_MASK == 0 {
            return Err(AudioModemError::InvalidConfig(format!(
                "whitening seed {:#06x} leaves the 15-bit register empty",
                seed
            )));
        }
        Ok(Self {
            seed: seed & STATE_MASK,
        })
    }

    pub fn seed(&self) -> u16 {
        self.seed
    }

    /// First `len` mask bits, one `u8` per bit.
    pub fn sequence(&self, len: usize) -> Vec<u8> {
        let mut state = self.seed;
        let mut bits = Vec::with_capacity(len);
        for _ in 0..len {
            // Feedback from taps 15 and 14
            let bit = ((state >> 14) ^ (state >> 13)) & 1;
            state = ((state << 1) | bit) & STATE_MASK;
            bits.push(bit as u8);
        }
        bits
    }

    /// XOR the mask into `bits` in place. Whitening and de-whitening are the
    /// same operation.
    pub fn apply(&self, bits: &mut [u8]) {
        let mask = self.sequence(bits.len());
        xor_mask(bits, &mask);
    }
}

/// XOR `mask` into the leading bits of `bits`. Bits past the end of a short
/// mask are left unchanged.
pub fn xor_mask(bits: &mut [u8], mask: &[u8]) {
    for (bit, &m) in bits.iter_mut().zip(mask) {
        *bit ^= m & 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_twice_restores_bits() {
        let whitening = Whitening::default();
        let original: Vec<u8> = (0..512).map(|i| ((i * 7) % 3 == 0) as u8).collect();

        let mut bits = original.clone();
        whitening.apply(&mut bits);
        assert_ne!(bits, original);
        whitening.apply(&mut bits);
        assert_eq!(bits, original);
    }

    #[test]
    fn test_sequence_is_maximal_length() {
        let seq = Whitening::default().sequence(2 * WHITENING_PERIOD);
        let (first, second) = seq.split_at(WHITENING_PERIOD);
        assert_eq!(first, second);

        // An m-sequence of degree 15 holds 2^14 ones and 2^14 - 1 zeros
        let ones = first.iter().filter(|&&b| b == 1).count();
        assert_eq!(ones, 1 << 14);
    }

    #[test]
    fn test_sequence_is_deterministic_per_seed() {
        let a = Whitening::new(0x1234).unwrap();
        assert_eq!(a.sequence(256), a.sequence(256));

        let b = Whitening::new(0x4321).unwrap();
        assert_ne!(a.sequence(256), b.sequence(256));
        assert!(a.sequence(256).iter().all(|&bit| bit <= 1));
    }

    #[test]
    fn test_seed_uses_low_fifteen_bits() {
        assert!(matches!(
            Whitening::new(0),
            Err(AudioModemError::InvalidConfig(_))
        ));
        assert!(Whitening::new(0x8000).is_err());
        assert_eq!(Whitening::new(0xFFFF).unwrap(), Whitening::new(0x7FFF).unwrap());
        assert_eq!(Whitening::default().seed(), DEFAULT_WHITENING_SEED);
    }

    #[test]
    fn test_xor_mask_short_mask() {
        let mut bits = vec![1, 1, 0, 0, 1];
        xor_mask(&mut bits, &[1, 0, 1]);
        assert_eq!(bits, vec![0, 1, 1, 0, 1]);
    }
}
