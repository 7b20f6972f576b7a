use crate::bits::validate_bits;
use crate::error::{AudioModemError, Result};
use crate::parity::{QcIraCode, QcIraFamily};

/// Systematic QC-IRA LDPC encoder.
///
/// Produces codewords `[u | p]` where the parity `p` comes from the
/// accumulate-and-rotate recurrence over the dual-diagonal parity part:
///
/// - `s = Hu · u`
/// - `p[0] = rotr(s[0], ROTS[0])`
/// - `p[i] = rotr(s[i] ^ p[i-1], ROTS[i])` for `i >= 1`
///
/// where `rotr` by `r` maps input position `k - r (mod Z)` to output `k`.
/// Encoding uses only call-local buffers, so one encoder can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct LdpcEncoder {
    code: QcIraCode,
}

impl LdpcEncoder {
    /// Encoder for the rate-1/2 family at the given circulant size.
    pub fn new(circulant_size: usize) -> Result<Self> {
        Self::with_family(QcIraFamily::RATE_1_2, circulant_size)
    }

    pub fn with_family(family: QcIraFamily, circulant_size: usize) -> Result<Self> {
        Ok(Self {
            code: QcIraCode::new(family, circulant_size)?,
        })
    }

    pub fn code(&self) -> &QcIraCode {
        &self.code
    }

    /// K
    pub fn info_len(&self) -> usize {
        self.code.info_len()
    }

    /// N
    pub fn codeword_len(&self) -> usize {
        self.code.codeword_len()
    }

    /// Encode exactly K information bits into an N-bit codeword.
    pub fn encode(&self, info: &[u8]) -> Result<Vec<u8>> {
        let k = self.code.info_len();
        if info.len() != k {
            return Err(AudioModemError::InvalidInputSize {
                expected: k,
                actual: info.len(),
            });
        }
        validate_bits(info)?;

        let syndrome = self.info_syndrome(info);
        let parity = self.accumulate(&syndrome);

        let mut codeword = Vec::with_capacity(self.code.codeword_len());
        codeword.extend_from_slice(info);
        codeword.extend_from_slice(&parity);
        log::trace!("LDPC encoded {} info bits into {} code bits", k, codeword.len());
        Ok(codeword)
    }

    fn info_syndrome(&self, info: &[u8]) -> Vec<u8> {
        self.code
            .hu_rows()
            .iter()
            .map(|cols| cols.iter().fold(0u8, |acc, &c| acc ^ info[c]))
            .collect()
    }

    fn accumulate(&self, syndrome: &[u8]) -> Vec<u8> {
        let z = self.code.circulant_size();
        let mut parity = syndrome.to_vec();

        for (i, &rot) in self.code.family().rotations.iter().enumerate() {
            let (done, rest) = parity.split_at_mut(i * z);
            let block = &mut rest[..z];
            if i > 0 {
                let prev = &done[(i - 1) * z..];
                for (p, &q) in block.iter_mut().zip(prev) {
                    *p ^= q;
                }
            }
            block.rotate_right(rot % z);
        }
        parity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_bits(rng: &mut StdRng, len: usize) -> Vec<u8> {
        (0..len).map(|_| rng.gen_range(0..=1u8)).collect()
    }

    #[test]
    fn test_encode_zero_vector() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let codeword = encoder.encode(&[0u8; 512]).unwrap();
        assert_eq!(codeword.len(), 1024);
        assert!(codeword.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_is_systematic() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let info = random_bits(&mut rng, 512);
        let codeword = encoder.encode(&info).unwrap();
        assert_eq!(codeword.len(), 1024);
        assert_eq!(&codeword[..512], &info[..]);
    }

    #[test]
    fn test_encoded_codewords_satisfy_parity_checks() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let info = random_bits(&mut rng, 512);
            let codeword = encoder.encode(&info).unwrap();
            assert!(encoder.code().is_codeword(&codeword).unwrap());
        }
    }

    #[test]
    fn test_single_info_bit_parity() {
        // A lone information bit must still produce a valid, non-trivial codeword
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut info = vec![0u8; 512];
        info[100] = 1;
        let codeword = encoder.encode(&info).unwrap();
        assert!(codeword[512..].iter().any(|&b| b == 1));
        assert!(encoder.code().is_codeword(&codeword).unwrap());
    }

    #[test]
    fn test_first_parity_block_is_rotated_syndrome() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let info = random_bits(&mut rng, 512);
        let codeword = encoder.encode(&info).unwrap();

        let syndrome = encoder.info_syndrome(&info);
        // ROTS[0] = 1: output position k takes input position k - 1
        for k in 0..32 {
            assert_eq!(codeword[512 + k], syndrome[(k + 31) % 32]);
        }
    }

    #[test]
    fn test_encode_deterministic() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let info = random_bits(&mut rng, 512);
        let first = encoder.encode(&info).unwrap();
        let second = encoder.encode(&info).unwrap();
        assert_eq!(first, second);

        // Previous calls leave no state behind
        let zeros = encoder.encode(&[0u8; 512]).unwrap();
        assert!(zeros.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_length_validation() {
        let encoder = LdpcEncoder::new(32).unwrap();
        assert_eq!(
            encoder.encode(&[0u8; 511]),
            Err(AudioModemError::InvalidInputSize {
                expected: 512,
                actual: 511
            })
        );
        assert!(encoder.encode(&[0u8; 513]).is_err());
    }

    #[test]
    fn test_encode_rejects_non_binary_values() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut info = vec![0u8; 512];
        info[10] = 3;
        assert_eq!(
            encoder.encode(&info),
            Err(AudioModemError::InvalidBit { index: 10, value: 3 })
        );
    }

    #[test]
    fn test_small_circulant_codewords_valid() {
        // Rotation amounts larger than Z wrap around
        let encoder = LdpcEncoder::new(4).unwrap();
        assert_eq!(encoder.info_len(), 64);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let info = random_bits(&mut rng, 64);
            let codeword = encoder.encode(&info).unwrap();
            assert!(encoder.code().is_codeword(&codeword).unwrap());
        }
    }

    #[test]
    fn test_encoder_shared_across_threads() {
        let encoder = LdpcEncoder::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let inputs: Vec<Vec<u8>> = (0..4).map(|_| random_bits(&mut rng, 512)).collect();
        let expected: Vec<Vec<u8>> = inputs.iter().map(|u| encoder.encode(u).unwrap()).collect();

        let shared = &encoder;
        std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|u| scope.spawn(move || shared.encode(u).unwrap()))
                .collect();
            for (handle, want) in handles.into_iter().zip(&expected) {
                assert_eq!(&handle.join().unwrap(), want);
            }
        });
    }
}
