//! Feed-forward tag classifier.
//!
//! Maps an embedding vector to a distribution over the tagset: two hidden
//! dense layers with ReLU activations and a softmax output, trained with
//! categorical cross-entropy.

use candle_core::{Result, Tensor, D};
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Two-hidden-layer dense classifier over tag classes.
pub struct TagClassifier {
    fc1: Linear,
    fc2: Linear,
    output: Linear,
}

impl TagClassifier {
    /// Builds the classifier layers under the given variable builder.
    pub fn new(
        vb: VarBuilder,
        input_dim: usize,
        hidden_dim: usize,
        num_tags: usize,
    ) -> Result<Self> {
        Ok(Self {
            fc1: linear(input_dim, hidden_dim, vb.pp("fc1"))?,
            fc2: linear(hidden_dim, hidden_dim, vb.pp("fc2"))?,
            output: linear(hidden_dim, num_tags, vb.pp("output"))?,
        })
    }

    /// Class indices for a batch of feature rows, by softmax arg-max.
    pub fn predict(&self, features: &Tensor) -> Result<Vec<u32>> {
        let logits = self.forward(features)?;
        let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;
        probabilities.argmax(D::Minus1)?.to_vec1::<u32>()
    }
}

impl Module for TagClassifier {
    /// Produces unnormalized logits of shape `[batch, num_tags]`.
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = self.fc1.forward(xs)?.relu()?;
        let xs = self.fc2.forward(&xs)?.relu()?;
        self.output.forward(&xs)
    }
}
