use crate::fsk::FskParams;
use crate::CIRCULANT_SIZE;

/// End-to-end transmitter configuration: LDPC code plus waveform.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModemConfig {
    /// Circulant size Z of the rate-1/2 QC-IRA code (N = 32 Z, K = 16 Z).
    pub circulant_size: usize,
    pub fsk: FskParams,
    /// PRBS seed for whitening the framed payload bits. `None` sends them as is.
    pub whitening_seed: Option<u16>,
}

impl ModemConfig {
    /// LDPC(1024, 512) over the minimal hopped-FSK waveform.
    pub fn minimal() -> Self {
        Self {
            circulant_size: CIRCULANT_SIZE,
            fsk: FskParams::minimal(),
            whitening_seed: None,
        }
    }

    /// LDPC(1024, 512) over the extended wideband hopped-FSK waveform.
    pub fn extended() -> Self {
        Self {
            circulant_size: CIRCULANT_SIZE,
            fsk: FskParams::extended(),
            whitening_seed: None,
        }
    }

    /// Same configuration with payload whitening enabled.
    pub fn with_whitening(self, seed: u16) -> Self {
        Self {
            whitening_seed: Some(seed),
            ..self
        }
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self::minimal()
    }
}
