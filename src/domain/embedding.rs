/// Dimension of the hashed bag-of-words vectors used by the document store.
pub const EMBEDDING_DIMENSIONS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Crude text vectorization: each word is hashed into one of
    /// `EMBEDDING_DIMENSIONS` buckets and the bucket counts are normalized
    /// to unit length. Good enough for the store's keyword-ish similarity
    /// search; not a semantic embedding.
    pub fn from_text(text: &str) -> Self {
        let mut values = vec![0.0f32; EMBEDDING_DIMENSIONS];
        for word in text.split_whitespace() {
            let bucket = hash_word(&word.to_lowercase()) as usize % EMBEDDING_DIMENSIONS;
            values[bucket] += 1.0;
        }

        let magnitude: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut values {
                *value /= magnitude;
            }
        }

        Self { values }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }

        let dot_product: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();

        let magnitude_a: f32 = self.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let magnitude_b: f32 = other.values.iter().map(|x| x * x).sum::<f32>().sqrt();

        if magnitude_a == 0.0 || magnitude_b == 0.0 {
            return 0.0;
        }

        dot_product / (magnitude_a * magnitude_b)
    }
}

/// FNV-1a, kept inline so bucket assignment is deterministic across runs.
fn hash_word(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
