use std::f64::consts::PI;

/// Gain of the attenuated periodic Hann window used by the band-plan preset.
pub const ATTENUATED_HANN_GAIN: f64 = 0.95;

/// Pulse window.
///
/// `Hann` and `PeriodicHann` are not interchangeable: a receiver must use
/// the same window as the transmitter's pulse bank.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Window {
    #[default]
    /// Textbook symmetric Hann: `0.5 - 0.5 cos(2πn / (P - 1))`.
    Hann,
    /// Periodic Hann scaled by `gain`: `gain * (0.5 - 0.5 cos(2πn / P))`.
    PeriodicHann { gain: f64 },
    /// No window.
    Rectangular,
}

impl Window {
    pub fn attenuated_periodic_hann() -> Self {
        Window::PeriodicHann {
            gain: ATTENUATED_HANN_GAIN,
        }
    }

    /// Sample the window at `len` points.
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        match *self {
            Window::Hann => {
                if len <= 1 {
                    return vec![1.0; len];
                }
                let denom = (len - 1) as f64;
                (0..len)
                    .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
                    .collect()
            }
            Window::PeriodicHann { gain } => {
                let denom = len as f64;
                (0..len)
                    .map(|n| gain * (0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos()))
                    .collect()
            }
            Window::Rectangular => vec![1.0; len],
        }
    }
}
