//! Seeded mini-batch iteration over in-memory tensors.

use candle_core::Tensor;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Mini-batch iterator over pre-loaded tensors. Reshuffles indices each epoch.
pub struct BatchIterator {
    inputs: Tensor,
    labels: Tensor,
    indices: Vec<usize>,
    batch_size: usize,
    pos: usize,
}

impl BatchIterator {
    /// `rows` must equal the first dimension of both tensors.
    pub fn new(inputs: Tensor, labels: Tensor, rows: usize, batch_size: usize) -> Self {
        Self {
            inputs,
            labels,
            indices: (0..rows).collect(),
            batch_size: batch_size.max(1),
            pos: 0,
        }
    }

    /// Reshuffle for a new epoch using a seeded RNG derived from base seed + epoch.
    pub fn reshuffle(&mut self, seed: u64, epoch: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(epoch as u64));
        self.indices.shuffle(&mut rng);
        self.pos = 0;
    }

    /// Returns the next mini-batch, or `None` once the epoch is exhausted.
    pub fn next_batch(&mut self) -> candle_core::Result<Option<(Tensor, Tensor)>> {
        let n = self.indices.len();
        if self.pos >= n {
            return Ok(None);
        }

        let end = (self.pos + self.batch_size).min(n);
        let batch_idx: Vec<u32> = self.indices[self.pos..end]
            .iter()
            .map(|&i| i as u32)
            .collect();
        self.pos = end;

        let idx_tensor = Tensor::new(batch_idx.as_slice(), self.inputs.device())?;
        let batch_inputs = self.inputs.index_select(&idx_tensor, 0)?;
        let batch_labels = self.labels.index_select(&idx_tensor, 0)?;
        Ok(Some((batch_inputs, batch_labels)))
    }
}
