use crate::error::{AudioModemError, Result};
use crate::window::Window;
use std::f64::consts::PI;

/// Below this energy a pulse is treated as silent and left unnormalized.
const MIN_PULSE_ENERGY: f64 = 1e-12;

/// Placement of the tones in a pulse bank.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FrequencyPlan {
    /// Consecutive DFT bins `base_bin, base_bin + 1, ...` relative to the
    /// pulse length (bin spacing = sample_rate / samples_per_pulse).
    Bins { base_bin: usize },
    /// Tones spread linearly over `bandwidth_hz` around `center_hz`, spaced
    /// `bandwidth_hz / count`, the first one at the lower band edge.
    Band { center_hz: f64, bandwidth_hz: f64 },
}

impl FrequencyPlan {
    /// Tone frequencies in cycles per sample, one per pulse.
    fn tones(&self, sample_rate: f64, samples_per_pulse: usize, count: usize) -> Result<Vec<f64>> {
        match *self {
            FrequencyPlan::Bins { base_bin } => {
                let nyquist_bin = samples_per_pulse / 2;
                if base_bin >= nyquist_bin {
                    return Err(AudioModemError::InvalidConfig(format!(
                        "base bin {} out of range [0, {}) for {}-sample pulses",
                        base_bin, nyquist_bin, samples_per_pulse
                    )));
                }
                if base_bin + count > nyquist_bin {
                    return Err(AudioModemError::InvalidConfig(format!(
                        "occupied band exceeds Nyquist: bins {}..{} past {}",
                        base_bin,
                        base_bin + count,
                        nyquist_bin
                    )));
                }
                let len = samples_per_pulse as f64;
                Ok((base_bin..base_bin + count).map(|bin| bin as f64 / len).collect())
            }
            FrequencyPlan::Band {
                center_hz,
                bandwidth_hz,
            } => {
                if !(bandwidth_hz > 0.0) || !center_hz.is_finite() {
                    return Err(AudioModemError::InvalidConfig(format!(
                        "invalid band: center {} Hz, bandwidth {} Hz",
                        center_hz, bandwidth_hz
                    )));
                }
                let low = center_hz - bandwidth_hz / 2.0;
                let high = center_hz + bandwidth_hz / 2.0;
                if low < 0.0 {
                    return Err(AudioModemError::InvalidConfig(format!(
                        "band lower edge {} Hz is negative",
                        low
                    )));
                }
                if high > sample_rate / 2.0 {
                    return Err(AudioModemError::InvalidConfig(format!(
                        "occupied band exceeds Nyquist: upper edge {} Hz past {} Hz",
                        high,
                        sample_rate / 2.0
                    )));
                }
                let spacing = bandwidth_hz / count as f64;
                Ok((0..count)
                    .map(|k| (low + k as f64 * spacing) / sample_rate)
                    .collect())
            }
        }
    }
}

/// Bank of unit-energy windowed tone pulses.
///
/// Each tone has a cosine pulse and, for quadrature banks, a matching sine
/// pulse. Pulses are built once and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseBank {
    sample_rate: f64,
    samples_per_pulse: usize,
    tones: Vec<f64>,
    cos: Vec<Vec<f32>>,
    sin: Option<Vec<Vec<f32>>>,
}

impl PulseBank {
    pub fn builder(sample_rate: f64, samples_per_pulse: usize) -> PulseBankBuilder {
        PulseBankBuilder {
            sample_rate,
            samples_per_pulse,
            window: Window::Hann,
            quadrature: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cos.is_empty()
    }

    pub fn samples_per_pulse(&self) -> usize {
        self.samples_per_pulse
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Tone frequency of pulse `index` in Hz.
    pub fn tone_hz(&self, index: usize) -> Option<f64> {
        self.tones.get(index).map(|cps| cps * self.sample_rate)
    }

    pub fn pulse(&self, index: usize) -> Option<&[f32]> {
        self.cos.get(index).map(Vec::as_slice)
    }

    /// Quadrature (sine) pulse, present only for quadrature banks.
    pub fn quadrature_pulse(&self, index: usize) -> Option<&[f32]> {
        self.sin.as_ref()?.get(index).map(Vec::as_slice)
    }

    pub fn has_quadrature(&self) -> bool {
        self.sin.is_some()
    }
}

pub struct PulseBankBuilder {
    sample_rate: f64,
    samples_per_pulse: usize,
    window: Window,
    quadrature: bool,
}

impl PulseBankBuilder {
    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Also build a sine pulse per tone.
    pub fn quadrature(mut self, enabled: bool) -> Self {
        self.quadrature = enabled;
        self
    }

    /// Build `count` pulses placed by `plan`.
    pub fn build(self, plan: &FrequencyPlan, count: usize) -> Result<PulseBank> {
        if !(self.sample_rate > 0.0) || !self.sample_rate.is_finite() {
            return Err(AudioModemError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.samples_per_pulse == 0 {
            return Err(AudioModemError::InvalidConfig(
                "pulse length must be positive".to_string(),
            ));
        }
        if count == 0 {
            return Err(AudioModemError::InvalidConfig(
                "pulse bank needs at least one pulse".to_string(),
            ));
        }

        let tones = plan.tones(self.sample_rate, self.samples_per_pulse, count)?;
        let window = self.window.coefficients(self.samples_per_pulse);

        let cos: Vec<Vec<f32>> = tones
            .iter()
            .map(|&cps| windowed_tone(&window, cps, f64::cos))
            .collect();
        let sin: Option<Vec<Vec<f32>>> = self.quadrature.then(|| {
            tones
                .iter()
                .map(|&cps| windowed_tone(&window, cps, f64::sin))
                .collect()
        });

        log::debug!(
            "Built pulse bank: {} pulses x {} samples, {:.1}-{:.1} Hz, quadrature={}",
            count,
            self.samples_per_pulse,
            tones[0] * self.sample_rate,
            tones[count - 1] * self.sample_rate,
            self.quadrature
        );

        Ok(PulseBank {
            sample_rate: self.sample_rate,
            samples_per_pulse: self.samples_per_pulse,
            tones,
            cos,
            sin,
        })
    }
}

/// Window a sinusoid at `cycles_per_sample` and scale it to unit energy.
fn windowed_tone(window: &[f64], cycles_per_sample: f64, osc: fn(f64) -> f64) -> Vec<f32> {
    let mut pulse: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(n, &w)| w * osc(2.0 * PI * cycles_per_sample * n as f64))
        .collect();

    let energy: f64 = pulse.iter().map(|v| v * v).sum();
    if energy > MIN_PULSE_ENERGY {
        let gain = 1.0 / energy.sqrt();
        for v in pulse.iter_mut() {
            *v *= gain;
        }
    }
    pulse.into_iter().map(|v| v as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(pulse: &[f32]) -> f64 {
        pulse.iter().map(|&v| (v as f64) * (v as f64)).sum()
    }

    #[test]
    fn test_bin_bank_unit_energy() {
        let bank = PulseBank::builder(44100.0, 160)
            .build(&FrequencyPlan::Bins { base_bin: 69 }, 4)
            .unwrap();
        assert_eq!(bank.len(), 4);
        for k in 0..bank.len() {
            let pulse = bank.pulse(k).unwrap();
            assert_eq!(pulse.len(), 160);
            assert!((energy(pulse) - 1.0).abs() < 1e-5);
        }
        assert!(!bank.has_quadrature());
    }

    #[test]
    fn test_bin_frequencies() {
        let bank = PulseBank::builder(44100.0, 160)
            .build(&FrequencyPlan::Bins { base_bin: 69 }, 4)
            .unwrap();
        // 69 * 44100 / 160
        assert!((bank.tone_hz(0).unwrap() - 19018.125).abs() < 1e-6);
        assert!((bank.tone_hz(3).unwrap() - 19845.0).abs() < 1e-6);
        assert!(bank.tone_hz(4).is_none());
    }

    #[test]
    fn test_nyquist_boundary_for_bins() {
        let builder = || PulseBank::builder(44100.0, 160);
        // 69 + 4 = 73 <= 80
        assert!(builder().build(&FrequencyPlan::Bins { base_bin: 69 }, 4).is_ok());
        // 76 + 4 = 80 fills the band exactly
        assert!(builder().build(&FrequencyPlan::Bins { base_bin: 76 }, 4).is_ok());
        // 78 + 4 = 82 > 80
        assert!(matches!(
            builder().build(&FrequencyPlan::Bins { base_bin: 78 }, 4),
            Err(AudioModemError::InvalidConfig(_))
        ));
        // Base bin itself past P/2
        assert!(builder().build(&FrequencyPlan::Bins { base_bin: 80 }, 1).is_err());
    }

    #[test]
    fn test_band_plan_spacing() {
        let bank = PulseBank::builder(44100.0, 128)
            .window(Window::attenuated_periodic_hann())
            .quadrature(true)
            .build(
                &FrequencyPlan::Band {
                    center_hz: 18500.0,
                    bandwidth_hz: 3000.0,
                },
                126,
            )
            .unwrap();
        assert_eq!(bank.len(), 126);
        let spacing = 3000.0 / 126.0;
        assert!((bank.tone_hz(0).unwrap() - 17000.0).abs() < 1e-6);
        assert!((bank.tone_hz(1).unwrap() - (17000.0 + spacing)).abs() < 1e-6);
        assert!(bank.tone_hz(125).unwrap() < 20000.0);
    }

    #[test]
    fn test_quadrature_pulses_unit_energy() {
        let bank = PulseBank::builder(44100.0, 128)
            .window(Window::attenuated_periodic_hann())
            .quadrature(true)
            .build(
                &FrequencyPlan::Band {
                    center_hz: 18500.0,
                    bandwidth_hz: 3000.0,
                },
                16,
            )
            .unwrap();
        for k in 0..bank.len() {
            assert!((energy(bank.pulse(k).unwrap()) - 1.0).abs() < 1e-5);
            assert!((energy(bank.quadrature_pulse(k).unwrap()) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_band_beyond_nyquist_rejected() {
        let result = PulseBank::builder(44100.0, 128).build(
            &FrequencyPlan::Band {
                center_hz: 21500.0,
                bandwidth_hz: 3000.0,
            },
            8,
        );
        assert!(matches!(result, Err(AudioModemError::InvalidConfig(_))));

        let negative = PulseBank::builder(44100.0, 128).build(
            &FrequencyPlan::Band {
                center_hz: 1000.0,
                bandwidth_hz: 3000.0,
            },
            8,
        );
        assert!(negative.is_err());
    }

    #[test]
    fn test_zero_energy_pulse_kept() {
        // A sine at DC is identically zero and must not be scaled
        let bank = PulseBank::builder(8000.0, 32)
            .window(Window::Rectangular)
            .quadrature(true)
            .build(&FrequencyPlan::Bins { base_bin: 0 }, 2)
            .unwrap();
        let silent = bank.quadrature_pulse(0).unwrap();
        assert!(silent.iter().all(|v| v.is_finite() && v.abs() < 1e-6));
        assert!((energy(bank.pulse(0).unwrap()) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_builder_parameters() {
        let plan = FrequencyPlan::Bins { base_bin: 1 };
        assert!(PulseBank::builder(44100.0, 0).build(&plan, 1).is_err());
        assert!(PulseBank::builder(0.0, 160).build(&plan, 1).is_err());
        assert!(PulseBank::builder(44100.0, 160).build(&plan, 0).is_err());
    }

    #[test]
    fn test_pulse_bank_deterministic() {
        let build = || {
            PulseBank::builder(44100.0, 160)
                .build(&FrequencyPlan::Bins { base_bin: 69 }, 4)
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}
