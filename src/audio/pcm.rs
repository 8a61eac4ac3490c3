//! Little-endian 16-bit PCM reassembly across chunk boundaries.

/// Turns a byte stream into `i16` samples, carrying an odd trailing byte over
/// to the next push so chunking never splits a sample.
#[derive(Debug, Default)]
pub struct PcmAssembler {
    pending: Option<u8>,
    samples: Vec<i16>,
}

impl PcmAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `bytes` (plus any carried byte) into samples.
    ///
    /// The returned slice is only valid until the next call.
    pub fn push(&mut self, bytes: &[u8]) -> &[i16] {
        self.samples.clear();

        let mut rest = bytes;
        if let Some(low) = self.pending.take() {
            match rest.split_first() {
                Some((&high, tail)) => {
                    self.samples.push(i16::from_le_bytes([low, high]));
                    rest = tail;
                }
                None => {
                    self.pending = Some(low);
                    return &self.samples;
                }
            }
        }

        let mut pairs = rest.chunks_exact(2);
        self.samples
            .extend(pairs.by_ref().map(|pair| i16::from_le_bytes([pair[0], pair[1]])));
        self.pending = pairs.remainder().first().copied();

        &self.samples
    }

    /// Whether a half sample is waiting for its second byte.
    pub fn has_pending_byte(&self) -> bool {
        self.pending.is_some()
    }
}

/// Convert i16 samples to f32 normalized to [-1.0, 1.0].
pub fn samples_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&sample| sample as f32 / 32768.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_bytes_convert_directly() {
        let mut pcm = PcmAssembler::new();
        let bytes = [0x01, 0x00, 0xff, 0x7f, 0x00, 0x80];
        assert_eq!(pcm.push(&bytes), &[1, i16::MAX, i16::MIN]);
        assert!(!pcm.has_pending_byte());
    }

    #[test]
    fn test_odd_byte_is_carried_over() {
        let mut pcm = PcmAssembler::new();
        assert_eq!(pcm.push(&[0x01, 0x00, 0x34]), &[1]);
        assert!(pcm.has_pending_byte());
        assert_eq!(pcm.push(&[0x12, 0x02, 0x00]), &[0x1234, 2]);
        assert!(!pcm.has_pending_byte());
    }

    #[test]
    fn test_single_byte_pushes() {
        let mut pcm = PcmAssembler::new();
        assert!(pcm.push(&[0x10]).is_empty());
        assert!(pcm.push(&[]).is_empty());
        assert!(pcm.has_pending_byte());
        assert_eq!(pcm.push(&[0x00]), &[0x10]);
    }

    #[test]
    fn test_chunking_does_not_change_samples() {
        let bytes: Vec<u8> = (0..10_001u32).map(|i| (i * 31 % 251) as u8).collect();

        let mut whole = PcmAssembler::new();
        let expected = whole.push(&bytes).to_vec();

        for chunk_size in [1usize, 3, 7, 4096] {
            let mut pcm = PcmAssembler::new();
            let mut actual = Vec::new();
            for chunk in bytes.chunks(chunk_size) {
                actual.extend_from_slice(pcm.push(chunk));
            }
            assert_eq!(actual, expected, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_samples_to_f32_range() {
        let converted = samples_to_f32(&[0, 16384, -16384, -32768]);
        assert_eq!(converted[0], 0.0);
        assert!((converted[1] - 0.5).abs() < 0.01);
        assert!((converted[2] + 0.5).abs() < 0.01);
        assert_eq!(converted[3], -1.0);
    }

    #[test]
    fn test_samples_to_f32_empty() {
        assert!(samples_to_f32(&[]).is_empty());
    }
}
