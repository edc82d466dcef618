//! Word-embedding training on sentence sequences.
//!
//! A small word2vec-style model: an embedding table and a softmax output
//! layer trained with cross-entropy over (center, context) pairs drawn
//! from a sliding window. Skip-gram predicts each context word from the
//! center word; CBOW is trained on the same pairs reversed (the
//! sum-of-context variant decomposes into per-context-word updates).

use std::collections::HashMap;

use anyhow::{bail, Context as _};
use candle_core::{DType, Device, Tensor};
use candle_nn::{embedding, linear, loss, Module, Optimizer, VarBuilder, VarMap, SGD};

/// Which training objective to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingAlgorithm {
    /// Predict context words from the center word.
    #[default]
    SkipGram,
    /// Predict the center word from context words.
    Cbow,
}

/// Hyperparameters for embedding training.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Training objective.
    pub algorithm: EmbeddingAlgorithm,
    /// Embedding vector dimension.
    pub dim: usize,
    /// Context window radius on each side of the center word.
    pub window: usize,
    /// Minimum corpus frequency for a word to enter the vocabulary.
    pub min_count: usize,
    /// Passes over the pair set.
    pub epochs: usize,
    /// SGD learning rate.
    pub learning_rate: f64,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Shuffle seed.
    pub seed: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            algorithm: EmbeddingAlgorithm::SkipGram,
            dim: 100,
            window: 5,
            min_count: 1,
            epochs: 5,
            learning_rate: 0.05,
            batch_size: 64,
            seed: 1,
        }
    }
}

/// Trained word vectors: a fixed vocabulary and one vector per word.
#[derive(Debug, Clone)]
pub struct WordVectors {
    index: HashMap<String, usize>,
    matrix: Vec<Vec<f32>>,
    dim: usize,
}

impl WordVectors {
    /// The vector for a form, or `None` if out of vocabulary.
    pub fn get(&self, form: &str) -> Option<&[f32]> {
        self.index.get(form).map(|&i| self.matrix[i].as_slice())
    }

    /// Returns `true` if the form is in the vocabulary.
    pub fn contains(&self, form: &str) -> bool {
        self.index.contains_key(form)
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    /// Returns `true` if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// Trains word vectors over sentence sequences.
///
/// # Errors
///
/// Fails when no word satisfies `min_count` or no (center, context) pair
/// fits in any sentence; both indicate an unusable corpus rather than a
/// recoverable condition.
pub fn train_embeddings(
    sentences: &[Vec<String>],
    config: &EmbeddingConfig,
) -> anyhow::Result<WordVectors> {
    let (index, words) = build_vocabulary(sentences, config.min_count);
    if index.is_empty() {
        bail!("embedding vocabulary is empty (min_count = {})", config.min_count);
    }

    let mut pairs = collect_pairs(sentences, &index, config);
    if pairs.is_empty() {
        bail!("no context pairs found; sentences too short for window = {}", config.window);
    }

    let device = Device::Cpu;
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let vocab_size = words.len();
    let table = embedding(vocab_size, config.dim, vb.pp("embeddings"))
        .context("failed to build embedding table")?;
    let output = linear(config.dim, vocab_size, vb.pp("output"))
        .context("failed to build output layer")?;
    let mut sgd = SGD::new(varmap.all_vars(), config.learning_rate)?;

    let mut rng = oorandom::Rand64::new(config.seed as u128);
    for epoch in 0..config.epochs {
        // Fisher-Yates
        for i in (1..pairs.len()).rev() {
            let j = rng.rand_range(0..(i as u64 + 1)) as usize;
            pairs.swap(i, j);
        }

        let mut epoch_loss = 0.0f64;
        let mut batches = 0usize;
        for batch in pairs.chunks(config.batch_size) {
            let inputs: Vec<u32> = batch.iter().map(|&(input, _)| input).collect();
            let targets: Vec<u32> = batch.iter().map(|&(_, target)| target).collect();
            let inputs = Tensor::from_vec(inputs, batch.len(), &device)?;
            let targets = Tensor::from_vec(targets, batch.len(), &device)?;

            let hidden = table.forward(&inputs)?;
            let logits = output.forward(&hidden)?;
            let loss = loss::cross_entropy(&logits, &targets)?;
            sgd.backward_step(&loss)?;

            epoch_loss += loss.to_scalar::<f32>()? as f64;
            batches += 1;
        }

        println!(
            "Embedding epoch {}/{} - mean loss: {:.4}",
            epoch + 1,
            config.epochs,
            epoch_loss / batches as f64
        );
    }

    let matrix = table.embeddings().to_vec2::<f32>()?;
    Ok(WordVectors {
        index,
        matrix,
        dim: config.dim,
    })
}

/// Vocabulary in first-seen order, filtered by minimum frequency.
fn build_vocabulary(
    sentences: &[Vec<String>],
    min_count: usize,
) -> (HashMap<String, usize>, Vec<String>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for sentence in sentences {
        for form in sentence {
            let count = counts.entry(form.as_str()).or_insert(0);
            if *count == 0 {
                order.push(form.as_str());
            }
            *count += 1;
        }
    }

    let mut index = HashMap::new();
    let mut words = Vec::new();
    for form in order {
        if counts[form] >= min_count {
            index.insert(form.to_string(), words.len());
            words.push(form.to_string());
        }
    }
    (index, words)
}

/// All in-window (input, target) id pairs under the configured objective.
fn collect_pairs(
    sentences: &[Vec<String>],
    index: &HashMap<String, usize>,
    config: &EmbeddingConfig,
) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    for sentence in sentences {
        let ids: Vec<Option<u32>> = sentence
            .iter()
            .map(|form| index.get(form).map(|&i| i as u32))
            .collect();
        for (center_pos, center) in ids.iter().enumerate() {
            let Some(center) = *center else { continue };
            let start = center_pos.saturating_sub(config.window);
            let end = (center_pos + config.window + 1).min(ids.len());
            for (context_pos, context) in ids.iter().enumerate().take(end).skip(start) {
                if context_pos == center_pos {
                    continue;
                }
                let Some(context) = *context else { continue };
                match config.algorithm {
                    EmbeddingAlgorithm::SkipGram => pairs.push((center, context)),
                    EmbeddingAlgorithm::Cbow => pairs.push((context, center)),
                }
            }
        }
    }
    pairs
}
