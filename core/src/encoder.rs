use crate::bits::frame_bits;
use crate::config::ModemConfig;
use crate::error::Result;
use crate::fec::LdpcEncoder;
use crate::fsk::FskModulator;
use crate::whitening::{xor_mask, Whitening};

/// LDPC-coded hopped-FSK transmitter.
///
/// Turns K information bits into an N-bit systematic codeword and modulates
/// the codeword into a mono sample buffer at the configured sample rate.
/// Framed payloads are whitened before coding when a seed is configured.
/// Playback and repetition are left to the caller.
#[derive(Debug, Clone)]
pub struct Encoder {
    ldpc: LdpcEncoder,
    fsk: FskModulator,
    mask: Option<Vec<u8>>,
}

impl Encoder {
    pub fn new(config: &ModemConfig) -> Result<Self> {
        let ldpc = LdpcEncoder::new(config.circulant_size)?;
        let mask = match config.whitening_seed {
            Some(seed) => Some(Whitening::new(seed)?.sequence(ldpc.info_len())),
            None => None,
        };
        Ok(Self {
            ldpc,
            fsk: FskModulator::new(config.fsk.clone())?,
            mask,
        })
    }

    pub fn ldpc(&self) -> &LdpcEncoder {
        &self.ldpc
    }

    pub fn modulator(&self) -> &FskModulator {
        &self.fsk
    }

    pub fn sample_rate(&self) -> f64 {
        self.fsk.sample_rate()
    }

    /// K-bit whitening mask applied to framed payloads, if enabled.
    pub fn whitening_mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    /// Information bits carried per frame (K).
    pub fn info_bits(&self) -> usize {
        self.ldpc.info_len()
    }

    /// Samples in one coded frame.
    pub fn frame_samples(&self) -> usize {
        self.fsk.output_len(self.ldpc.codeword_len())
    }

    /// Encode exactly K information bits and modulate the codeword.
    pub fn encode_bits(&self, info: &[u8]) -> Result<Vec<f32>> {
        let codeword = self.ldpc.encode(info)?;
        self.fsk.modulate(&codeword)
    }

    /// Frame `payload` into K bits (MSB first, zero fill), whiten and encode it.
    pub fn encode_payload(&self, payload: &[u8]) -> Result<Vec<f32>> {
        let info = self.frame_payload(payload)?;
        self.encode_bits(&info)
    }

    /// The K information bits `encode_payload` hands to the LDPC encoder.
    pub fn frame_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut info = frame_bits(payload, self.ldpc.info_len())?;
        if let Some(mask) = &self.mask {
            xor_mask(&mut info, mask);
        }
        Ok(info)
    }

    /// Frame carrying only zero information bits. Never whitened.
    pub fn encode_zero_frame(&self) -> Result<Vec<f32>> {
        self.encode_bits(&vec![0u8; self.ldpc.info_len()])
    }

    /// Modulate `payload` framed to K bits without LDPC protection.
    pub fn encode_uncoded(&self, payload: &[u8]) -> Result<Vec<f32>> {
        let info = self.frame_payload(payload)?;
        self.fsk.modulate(&info)
    }
}
