use crate::bits::{self, validate_bits};
use crate::error::{AudioModemError, Result};
use crate::hop::{Hopping, ModTable};
use crate::pulse::{FrequencyPlan, PulseBank};
use crate::window::Window;

// Hopped FSK
//
// Every symbol interval transmits exactly one precomputed pulse. The pulse
// for symbol value d at symbol index t is bank[table[d][t % hop_factor]],
// so the tone that stands for a given value changes from slot to slot and
// only repeats after a full hop period.
//
// Two presets ship with the crate:
// - minimal: 1 bit/symbol, 160-sample pulses on DFT bins 69..73 at
//   44.1 kHz (19.0-19.8 kHz), hop period 2, textbook Hann window
// - extended: 1 bit/symbol, 128-sample pulses spread over 17-20 kHz,
//   hop factor 63 with a stride-16 hop pattern, attenuated periodic Hann,
//   cosine + sine pulse bank

/// Allowed distance between `sample_rate / symbol_rate` and an integer.
pub const SYMBOL_RATE_TOLERANCE: f64 = 1e-3;

/// Largest supported symbol width.
pub const MAX_BITS_PER_SYMBOL: u32 = 16;

/// Stride of the extended preset's hop pattern.
pub const EXTENDED_HOP_PATTERN: usize = 16;

/// Hopped-FSK waveform parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FskParams {
    pub bits_per_symbol: u32,
    pub sample_rate_hz: f64,
    pub symbol_rate_hz: f64,
    /// Symbol intervals before the hop pattern repeats.
    pub hop_factor: usize,
    pub frequencies: FrequencyPlan,
    pub window: Window,
    pub hopping: Hopping,
    /// Build a sine pulse alongside every cosine pulse.
    pub quadrature: bool,
}

impl FskParams {
    /// Binary FSK on four DFT bins with a two-slot hop period.
    pub fn minimal() -> Self {
        Self {
            bits_per_symbol: 1,
            sample_rate_hz: crate::SAMPLE_RATE,
            symbol_rate_hz: crate::SAMPLE_RATE / 160.0,
            hop_factor: 2,
            frequencies: FrequencyPlan::Bins { base_bin: 69 },
            window: Window::Hann,
            hopping: Hopping::Blocked,
            quadrature: false,
        }
    }

    /// Binary FSK hopping over 126 tones across 3 kHz of the near-ultrasonic band.
    pub fn extended() -> Self {
        Self {
            bits_per_symbol: 1,
            sample_rate_hz: crate::SAMPLE_RATE,
            symbol_rate_hz: crate::SAMPLE_RATE / 128.0,
            hop_factor: 63,
            frequencies: FrequencyPlan::Band {
                center_hz: 18500.0,
                bandwidth_hz: 3000.0,
            },
            window: Window::attenuated_periodic_hann(),
            hopping: Hopping::Strided {
                pattern: EXTENDED_HOP_PATTERN,
            },
            quadrature: true,
        }
    }

    /// Q = 2^bits_per_symbol.
    pub fn mod_order(&self) -> usize {
        1usize << self.bits_per_symbol
    }

    pub fn pulse_count(&self) -> usize {
        self.mod_order() * self.hop_factor
    }

    /// Samples per pulse, `sample_rate / symbol_rate`, which must be an integer.
    pub fn samples_per_pulse(&self) -> Result<usize> {
        if !(self.symbol_rate_hz > 0.0) || !self.symbol_rate_hz.is_finite() {
            return Err(AudioModemError::InvalidConfig(format!(
                "symbol rate must be positive, got {}",
                self.symbol_rate_hz
            )));
        }
        let exact = self.sample_rate_hz / self.symbol_rate_hz;
        let rounded = exact.round();
        if (rounded - exact).abs() >= SYMBOL_RATE_TOLERANCE || rounded < 1.0 {
            return Err(AudioModemError::InvalidConfig(format!(
                "symbol rate {} Hz does not divide sample rate {} Hz",
                self.symbol_rate_hz, self.sample_rate_hz
            )));
        }
        Ok(rounded as usize)
    }

    fn validate(&self) -> Result<()> {
        if self.bits_per_symbol == 0 || self.bits_per_symbol > MAX_BITS_PER_SYMBOL {
            return Err(AudioModemError::InvalidConfig(format!(
                "bits per symbol must be in 1..={}, got {}",
                MAX_BITS_PER_SYMBOL, self.bits_per_symbol
            )));
        }
        if self.hop_factor == 0 {
            return Err(AudioModemError::InvalidConfig(
                "hop factor must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FskParams {
    fn default() -> Self {
        Self::minimal()
    }
}

/// Hopped-FSK modulator: bits or symbols in, back-to-back pulses out.
///
/// The pulse bank and mod table are built once in [`FskModulator::new`];
/// modulation only reads them, so `&self` calls may run concurrently.
#[derive(Debug, Clone)]
pub struct FskModulator {
    params: FskParams,
    samples_per_pulse: usize,
    bank: PulseBank,
    table: ModTable,
}

impl FskModulator {
    pub fn new(params: FskParams) -> Result<Self> {
        params.validate()?;
        let samples_per_pulse = params.samples_per_pulse()?;

        let bank = PulseBank::builder(params.sample_rate_hz, samples_per_pulse)
            .window(params.window)
            .quadrature(params.quadrature)
            .build(&params.frequencies, params.pulse_count())?;
        let table = params.hopping.build(params.mod_order(), params.hop_factor)?;

        log::debug!(
            "FSK modulator ready: {} bits/symbol, {} samples/pulse, hop factor {}",
            params.bits_per_symbol,
            samples_per_pulse,
            params.hop_factor
        );

        Ok(Self {
            params,
            samples_per_pulse,
            bank,
            table,
        })
    }

    pub fn params(&self) -> &FskParams {
        &self.params
    }

    pub fn samples_per_pulse(&self) -> usize {
        self.samples_per_pulse
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.params.bits_per_symbol
    }

    pub fn sample_rate(&self) -> f64 {
        self.params.sample_rate_hz
    }

    pub fn mod_order(&self) -> usize {
        self.table.mod_order()
    }

    pub fn hop_factor(&self) -> usize {
        self.table.hop_factor()
    }

    pub fn pulse_bank(&self) -> &PulseBank {
        &self.bank
    }

    pub fn mod_table(&self) -> &ModTable {
        &self.table
    }

    /// Pulse-bank index for symbol value `d` in symbol interval `t`.
    pub fn hop_index(&self, d: u32, t: usize) -> Result<usize> {
        self.table.pulse_index(d, t)
    }

    pub fn bits_to_symbols(&self, bits: &[u8]) -> Vec<u32> {
        bits::bits_to_symbols(bits, self.params.bits_per_symbol)
    }

    pub fn symbols_to_bits(&self, symbols: &[u32]) -> Vec<u8> {
        bits::symbols_to_bits(symbols, self.params.bits_per_symbol)
    }

    /// Number of output samples for `bit_count` input bits.
    pub fn output_len(&self, bit_count: usize) -> usize {
        bits::symbol_count(bit_count, self.params.bits_per_symbol) * self.samples_per_pulse
    }

    /// Modulate pre-grouped symbols, one pulse per symbol.
    pub fn modulate_symbols(&self, symbols: &[u32]) -> Result<Vec<f32>> {
        // Resolve every pulse before writing so a bad symbol yields no output
        let indices = symbols
            .iter()
            .enumerate()
            .map(|(t, &d)| self.hop_index(d, t))
            .collect::<Result<Vec<usize>>>()?;

        let mut samples = Vec::with_capacity(indices.len() * self.samples_per_pulse);
        for idx in indices {
            let pulse = self.bank.pulse(idx).ok_or_else(|| {
                AudioModemError::InvalidConfig(format!("pulse {} missing from bank", idx))
            })?;
            samples.extend_from_slice(pulse);
        }
        Ok(samples)
    }

    /// Group bits into symbols (MSB first, zero-padded) and modulate them.
    pub fn modulate(&self, bits: &[u8]) -> Result<Vec<f32>> {
        validate_bits(bits)?;
        let symbols = self.bits_to_symbols(bits);
        let samples = self.modulate_symbols(&symbols)?;
        log::trace!("Modulated {} bits into {} samples", bits.len(), samples.len());
        Ok(samples)
    }
}
