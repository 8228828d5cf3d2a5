//! Deterministic feature-hashing encoder.
//!
//! Needs no model files. Words and their character trigrams are hashed into
//! a fixed number of signed buckets, so texts sharing vocabulary (or word
//! stems) land close together. Used for tests, benchmarks and offline builds.

use super::traits::QueryEncoder;
use crate::error::EmbeddingError;
use crate::text::word_tokens;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing encoder with a fixed output dimension.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    /// Creates an encoder producing vectors of length `dimension` (min 1).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl QueryEncoder for HashingEncoder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in word_tokens(text) {
            self.add_feature(&mut vector, &token, 1.0);

            let padded: Vec<char> = format!("#{}#", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &trigram, TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let encoder = HashingEncoder::new(64);
        let a = encoder.encode("Soto ayam kuning").unwrap();
        let b = encoder.encode("soto  AYAM kuning").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_words_are_closer() {
        let encoder = HashingEncoder::new(256);
        let query = encoder.encode("chicken soup").unwrap();
        let near = encoder.encode("hearty chicken soup with noodles").unwrap();
        let far = encoder.encode("iced lemon tea").unwrap();
        assert!(cosine(&query, &near) > cosine(&query, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let encoder = HashingEncoder::new(8);
        assert!(encoder.encode("  ").unwrap().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_batch_matches_single() {
        let encoder = HashingEncoder::default();
        let batch = encoder.encode_batch(&["es teh", "kopi"]).unwrap();
        assert_eq!(batch[1], encoder.encode("kopi").unwrap());
    }
}
