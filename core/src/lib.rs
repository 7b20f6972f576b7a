//! Acoustic transmitter for low-bandwidth data over a speaker/microphone link
//!
//! Uses a rate-1/2 QC-IRA LDPC code and near-ultrasonic hopped FSK

pub mod bits;
pub mod config;
pub mod encoder;
pub mod error;
pub mod fec;
pub mod fsk;
pub mod hop;
pub mod parity;
pub mod pulse;
pub mod whitening;
pub mod window;

pub use config::ModemConfig;
pub use encoder::Encoder;
pub use error::{AudioModemError, Result};
pub use fec::LdpcEncoder;
pub use fsk::{FskModulator, FskParams};
pub use hop::{Hopping, ModTable};
pub use parity::{QcIraCode, QcIraFamily};
pub use pulse::{FrequencyPlan, PulseBank};
pub use whitening::Whitening;
pub use window::Window;

// Audio configuration
pub const SAMPLE_RATE: f64 = 44100.0;

// FEC configuration
pub const CIRCULANT_SIZE: usize = 32;
pub const CODEWORD_BITS: usize = 32 * CIRCULANT_SIZE; // 1024
pub const INFO_BITS: usize = 16 * CIRCULANT_SIZE; // 512

// Frame configuration
pub const MAX_PAYLOAD_SIZE: usize = INFO_BITS / 8; // 64 bytes
