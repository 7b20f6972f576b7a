//! Bit and symbol packing helpers shared by the coder and the modulator.
//!
//! Bits are carried as one `u8` per bit holding 0 or 1. Every grouping in
//! this module is big-endian: the first bit consumed is the most significant.

use crate::error::{AudioModemError, Result};

/// Check that every element is 0 or 1.
pub fn validate_bits(bits: &[u8]) -> Result<()> {
    match bits.iter().position(|&b| b > 1) {
        Some(index) => Err(AudioModemError::InvalidBit {
            index,
            value: bits[index],
        }),
        None => Ok(()),
    }
}

/// Number of symbols needed to carry `bit_count` bits, `bits_per_symbol` at a time.
///
/// # Panics
///
/// Panics if `bits_per_symbol` is zero.
pub fn symbol_count(bit_count: usize, bits_per_symbol: u32) -> usize {
    assert!(bits_per_symbol > 0, "bits per symbol must be positive");
    bit_count.div_ceil(bits_per_symbol as usize)
}

/// Group bits into symbols of `bits_per_symbol` bits each, MSB first.
///
/// The final group is padded on the right with zero bits when the bit count
/// is not a multiple of `bits_per_symbol`.
///
/// # Panics
///
/// Panics if `bits_per_symbol` is zero.
pub fn bits_to_symbols(bits: &[u8], bits_per_symbol: u32) -> Vec<u32> {
    assert!(bits_per_symbol > 0, "bits per symbol must be positive");
    let width = bits_per_symbol as usize;
    bits.chunks(width)
        .map(|group| {
            let value = group
                .iter()
                .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit & 1));
            // Right-pad a short trailing group with zeros
            value << (width - group.len())
        })
        .collect()
}

/// Expand symbols back into bits, `bits_per_symbol` bits per symbol, MSB first.
pub fn symbols_to_bits(symbols: &[u32], bits_per_symbol: u32) -> Vec<u8> {
    let mut bits = Vec::with_capacity(symbols.len() * bits_per_symbol as usize);
    for &symbol in symbols {
        for shift in (0..bits_per_symbol).rev() {
            bits.push(((symbol >> shift) & 1) as u8);
        }
    }
    bits
}

/// Unpack bytes into bits, most significant bit of each byte first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first. A short final byte is zero-filled.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|group| {
            let value = group.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1));
            value << (8 - group.len())
        })
        .collect()
}

/// Build a `capacity`-bit frame: the payload bits followed by zero fill.
pub fn frame_bits(payload: &[u8], capacity: usize) -> Result<Vec<u8>> {
    let bits = payload.len() * 8;
    if bits > capacity {
        return Err(AudioModemError::PayloadTooLarge { bits, capacity });
    }

    let mut frame = bytes_to_bits(payload);
    frame.resize(capacity, 0);
    Ok(frame)
}
