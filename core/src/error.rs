use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioModemError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input size: expected {expected}, got {actual}")]
    InvalidInputSize { expected: usize, actual: usize },

    #[error("Invalid bit value {value} at index {index} (must be 0 or 1)")]
    InvalidBit { index: usize, value: u8 },

    #[error("Symbol {symbol} out of range for modulation order {mod_order}")]
    SymbolOutOfRange { symbol: u32, mod_order: u32 },

    #[error("Payload too large: {bits} bits (frame capacity {capacity})")]
    PayloadTooLarge { bits: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, AudioModemError>;
