//! Amplitude envelope extraction.
//!
//! Reduces one channel of PCM samples to a fixed number of bars. Each bar is
//! the mean absolute amplitude of one contiguous block of samples, and the
//! whole sequence is scaled so the loudest bar is exactly 1.0. Samples past
//! `blocks * block_size` do not contribute.

use serde::Serialize;

use crate::error::EnvelopeError;

/// Normalized bar heights for one track, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope {
    values: Vec<f32>,
}

impl Envelope {
    /// Extract the envelope of `samples` using `blocks` bars.
    ///
    /// Fails when `blocks` is zero or when there are fewer samples than bars,
    /// since a block would then be empty. A silent input yields all zeros.
    pub fn extract(samples: &[f32], blocks: usize) -> Result<Self, EnvelopeError> {
        let values = block_means(samples, blocks)?;
        Ok(Self {
            values: normalize(values),
        })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

/// Mean absolute amplitude of each of `blocks` equal blocks.
pub fn block_means(samples: &[f32], blocks: usize) -> Result<Vec<f32>, EnvelopeError> {
    if blocks == 0 {
        return Err(EnvelopeError::ZeroBlocks);
    }
    if samples.len() < blocks {
        return Err(EnvelopeError::TooFewSamples {
            samples: samples.len(),
            blocks,
        });
    }

    let block_size = samples.len() / blocks;
    Ok(samples
        .chunks_exact(block_size)
        .take(blocks)
        .map(|block| block.iter().map(|s| s.abs()).sum::<f32>() / block_size as f32)
        .collect())
}

/// Scale so the maximum is 1.0; an all-zero sequence stays all zero.
pub fn normalize(mut values: Vec<f32>) -> Vec<f32> {
    let max = values.iter().copied().fold(0.0_f32, f32::max);
    if max > 0.0 {
        // max / max is exactly 1.0
        for v in &mut values {
            *v /= max;
        }
    } else {
        values.iter_mut().for_each(|v| *v = 0.0);
    }
    values
}
