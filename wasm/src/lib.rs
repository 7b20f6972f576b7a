use hopwave_core::{Encoder, ModemConfig};
use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

/// Browser-side transmitter. Returned buffers are mono at `sampleRate()`
/// and can be copied straight into an `AudioBuffer` for playback.
#[wasm_bindgen]
pub struct WasmEncoder {
    inner: Encoder,
}

#[wasm_bindgen]
impl WasmEncoder {
    /// Encoder using the minimal hopped-FSK waveform
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmEncoder, JsValue> {
        Self::with_config(&ModemConfig::minimal())
    }

    /// Encoder using the extended wideband hopped-FSK waveform
    #[wasm_bindgen(js_name = newExtended)]
    pub fn new_extended() -> Result<WasmEncoder, JsValue> {
        Self::with_config(&ModemConfig::extended())
    }

    /// Encode up to `infoBits() / 8` bytes into one coded frame
    #[wasm_bindgen(js_name = encodePayload)]
    pub fn encode_payload(&self, data: &[u8]) -> Result<Float32Array, JsValue> {
        let samples = self.inner.encode_payload(data).map_err(to_js)?;
        Ok(Float32Array::from(samples.as_slice()))
    }

    /// Coded all-zero frame
    #[wasm_bindgen(js_name = encodeZeroFrame)]
    pub fn encode_zero_frame(&self) -> Result<Float32Array, JsValue> {
        let samples = self.inner.encode_zero_frame().map_err(to_js)?;
        Ok(Float32Array::from(samples.as_slice()))
    }

    #[wasm_bindgen(js_name = sampleRate)]
    pub fn sample_rate(&self) -> f64 {
        self.inner.sample_rate()
    }

    #[wasm_bindgen(js_name = infoBits)]
    pub fn info_bits(&self) -> usize {
        self.inner.info_bits()
    }

    #[wasm_bindgen(js_name = frameSamples)]
    pub fn frame_samples(&self) -> usize {
        self.inner.frame_samples()
    }
}

impl WasmEncoder {
    fn with_config(config: &ModemConfig) -> Result<WasmEncoder, JsValue> {
        Encoder::new(config)
            .map(|encoder| WasmEncoder { inner: encoder })
            .map_err(to_js)
    }
}

fn to_js(err: hopwave_core::AudioModemError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
