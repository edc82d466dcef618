//! Training loop for the embedding-based neural tagger.

use anyhow::{bail, Context as _};
use candle_core::{DType, Device, Tensor};
use candle_nn::{loss, Module, Optimizer, VarBuilder, VarMap, SGD};

use sintagma_core::corpus::{Corpus, TaggedWord};

use crate::data::{build_dataset, Dataset, TagVocab};
use crate::embedding::WordVectors;
use crate::model::TagClassifier;

/// Hyperparameters for classifier training.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Passes over the training pairs.
    pub epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// SGD learning rate.
    pub learning_rate: f64,
    /// Fraction of pairs held out for evaluation, fixed before training.
    pub heldout_fraction: f64,
    /// Width of the two hidden layers.
    pub hidden_dim: usize,
    /// Shuffle and split seed.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            learning_rate: 0.05,
            heldout_fraction: 0.15,
            hidden_dim: 100,
            seed: 1,
        }
    }
}

/// Held-out loss and accuracy after training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    /// Mean cross-entropy loss on the held-out pairs.
    pub loss: f64,
    /// Fraction of held-out pairs tagged correctly.
    pub accuracy: f64,
}

/// A trained embedding-based tagger.
///
/// Holds the classifier and the fixed tag-index table built at training
/// time; inference-side embeddings are supplied by the caller, since
/// tagging a new domain uses a separate embedding model trained on that
/// domain's sentences.
pub struct NeuralTagger {
    classifier: TagClassifier,
    tags: TagVocab,
    device: Device,
    // Keeps the trained weights alive alongside the classifier.
    _varmap: VarMap,
}

impl NeuralTagger {
    /// Trains the classifier on (embedding, tag) pairs from the corpus.
    ///
    /// A `heldout_fraction` slice of the pairs is split off before any
    /// optimization and used for the final report.
    ///
    /// # Errors
    ///
    /// Fails when no tagged word of the corpus is in the embedding
    /// vocabulary, or when the split leaves the training side empty.
    pub fn train(
        corpus: &Corpus,
        vectors: &WordVectors,
        config: &TrainConfig,
    ) -> anyhow::Result<(Self, EvalReport)> {
        let tags = TagVocab::from_corpus(corpus);
        if tags.is_empty() {
            bail!("training corpus has no tags");
        }
        let dataset = build_dataset(corpus, vectors, &tags);
        if dataset.is_empty() {
            bail!("training set is empty: no tagged word is in the embedding vocabulary");
        }

        let (train, heldout) = split_dataset(&dataset, config.heldout_fraction, config.seed);
        if train.is_empty() {
            bail!("training partition is empty after the held-out split");
        }

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let classifier = TagClassifier::new(vb, dataset.dim, config.hidden_dim, tags.len())
            .context("failed to build classifier")?;
        let mut sgd = SGD::new(varmap.all_vars(), config.learning_rate)?;

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut rng = oorandom::Rand64::new(config.seed as u128);
        for epoch in 0..config.epochs {
            // Fisher-Yates
            for i in (1..order.len()).rev() {
                let j = rng.rand_range(0..(i as u64 + 1)) as usize;
                order.swap(i, j);
            }

            let mut epoch_loss = 0.0f64;
            let mut batches = 0usize;
            for batch in order.chunks(config.batch_size) {
                let (features, labels) = gather_batch(&train, batch, &device)?;
                let logits = classifier.forward(&features)?;
                let loss = loss::cross_entropy(&logits, &labels)?;
                sgd.backward_step(&loss)?;
                epoch_loss += loss.to_scalar::<f32>()? as f64;
                batches += 1;
            }

            if (epoch + 1) % 10 == 0 || epoch + 1 == config.epochs {
                println!(
                    "Epoch {}/{} - mean loss: {:.4}",
                    epoch + 1,
                    config.epochs,
                    epoch_loss / batches as f64
                );
            }
        }

        let tagger = Self {
            classifier,
            tags,
            device,
            _varmap: varmap,
        };
        let report = tagger.evaluate(&heldout)?;
        Ok((tagger, report))
    }

    /// Held-out loss and accuracy.
    fn evaluate(&self, heldout: &Dataset) -> anyhow::Result<EvalReport> {
        if heldout.is_empty() {
            // A degenerate split (tiny corpus) leaves nothing to report on.
            return Ok(EvalReport { loss: 0.0, accuracy: 0.0 });
        }
        let indices: Vec<usize> = (0..heldout.len()).collect();
        let (features, labels) = gather_batch(heldout, &indices, &self.device)?;
        let logits = self.classifier.forward(&features)?;
        let loss = loss::cross_entropy(&logits, &labels)?.to_scalar::<f32>()? as f64;

        let predicted = self.classifier.predict(&features)?;
        let correct = predicted
            .iter()
            .zip(heldout.labels.iter())
            .filter(|(a, b)| a == b)
            .count();
        Ok(EvalReport {
            loss,
            accuracy: correct as f64 / heldout.len() as f64,
        })
    }

    /// Tags a word sequence using inference-domain embeddings.
    ///
    /// Words absent from `vectors` are dropped silently, so the output can
    /// be shorter than the input; callers must tolerate the mismatch.
    pub fn tag(
        &self,
        words: &[String],
        vectors: &WordVectors,
    ) -> anyhow::Result<Vec<TaggedWord>> {
        let mut kept: Vec<&String> = Vec::new();
        let mut features: Vec<f32> = Vec::new();
        for word in words {
            if let Some(vector) = vectors.get(word) {
                kept.push(word);
                features.extend_from_slice(vector);
            }
        }
        if kept.is_empty() {
            return Ok(Vec::new());
        }

        let features =
            Tensor::from_vec(features, (kept.len(), vectors.dim()), &self.device)?;
        let classes = self.classifier.predict(&features)?;

        let mut tagged = Vec::with_capacity(kept.len());
        for (word, class) in kept.iter().zip(classes.iter()) {
            let tag = self
                .tags
                .tag(*class as usize)
                .context("predicted class outside the tag table")?;
            tagged.push(TaggedWord::new((*word).clone(), tag));
        }
        Ok(tagged)
    }

    /// The fixed tag table built at training time.
    pub fn tag_vocab(&self) -> &TagVocab {
        &self.tags
    }
}

/// Seeded split of a dataset into train and held-out partitions.
fn split_dataset(dataset: &Dataset, heldout_fraction: f64, seed: u64) -> (Dataset, Dataset) {
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    let mut rng = oorandom::Rand64::new(seed as u128);
    for i in (1..indices.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        indices.swap(i, j);
    }
    let n_heldout = (dataset.len() as f64 * heldout_fraction) as usize;

    let mut partitions = [
        Dataset { features: Vec::new(), labels: Vec::new(), dim: dataset.dim },
        Dataset { features: Vec::new(), labels: Vec::new(), dim: dataset.dim },
    ];
    for (rank, &row) in indices.iter().enumerate() {
        let part = &mut partitions[usize::from(rank >= n_heldout)];
        part.features
            .extend_from_slice(&dataset.features[row * dataset.dim..(row + 1) * dataset.dim]);
        part.labels.push(dataset.labels[row]);
    }
    let [heldout, train] = partitions;
    (train, heldout)
}

/// Gathers dataset rows into device tensors.
fn gather_batch(
    dataset: &Dataset,
    rows: &[usize],
    device: &Device,
) -> candle_core::Result<(Tensor, Tensor)> {
    let mut features = Vec::with_capacity(rows.len() * dataset.dim);
    let mut labels = Vec::with_capacity(rows.len());
    for &row in rows {
        features.extend_from_slice(&dataset.features[row * dataset.dim..(row + 1) * dataset.dim]);
        labels.push(dataset.labels[row]);
    }
    let features = Tensor::from_vec(features, (rows.len(), dataset.dim), device)?;
    let labels = Tensor::from_vec(labels, rows.len(), device)?;
    Ok((features, labels))
}

/// Entry point for the `train` binary: trains the neural tagger on a
/// two-column tagged corpus file and prints the held-out report.
pub fn run_training() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: train <tagged-corpus.tsv>")?;
    if !std::path::Path::new(&path).exists() {
        bail!("training corpus not found: {path}");
    }

    let file = std::fs::File::open(&path)?;
    let corpus = sintagma_core::corpus::tagged::read_tagged(std::io::BufReader::new(file))?;
    println!("Loaded {} training sentences", corpus.len());

    let embedding_config = crate::embedding::EmbeddingConfig::default();
    let vectors = crate::embedding::train_embeddings(&corpus.forms(), &embedding_config)?;
    println!("Trained {}-word embedding vocabulary", vectors.len());

    let (_tagger, report) = NeuralTagger::train(&corpus, &vectors, &TrainConfig::default())?;
    println!(
        "Held-out evaluation - Loss: {:.4} - Accuracy: {:.2}%",
        report.loss,
        100.0 * report.accuracy
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{train_embeddings, EmbeddingConfig};

    fn corpus() -> Corpus {
        let mut sentences = Vec::new();
        for _ in 0..10 {
            sentences.push(vec![
                TaggedWord::new("the", "DT"),
                TaggedWord::new("dog", "NN"),
                TaggedWord::new("barks", "VBZ"),
            ]);
            sentences.push(vec![
                TaggedWord::new("a", "DT"),
                TaggedWord::new("cat", "NN"),
                TaggedWord::new("sleeps", "VBZ"),
            ]);
        }
        Corpus::from_sentences(sentences)
    }

    fn quick_train() -> (NeuralTagger, WordVectors) {
        let corpus = corpus();
        let embedding_config = EmbeddingConfig {
            dim: 8,
            epochs: 2,
            ..EmbeddingConfig::default()
        };
        let vectors = train_embeddings(&corpus.forms(), &embedding_config).unwrap();
        let config = TrainConfig {
            epochs: 5,
            hidden_dim: 16,
            ..TrainConfig::default()
        };
        let (tagger, _) = NeuralTagger::train(&corpus, &vectors, &config).unwrap();
        (tagger, vectors)
    }

    #[test]
    fn output_never_exceeds_input_length() {
        let (tagger, vectors) = quick_train();
        let words: Vec<String> =
            ["the", "zebra", "dog"].iter().map(|w| w.to_string()).collect();
        let tagged = tagger.tag(&words, &vectors).unwrap();
        assert!(tagged.len() <= words.len());
        // "zebra" is out of vocabulary and silently dropped.
        assert_eq!(tagged.len(), 2);
    }

    #[test]
    fn fully_in_vocabulary_input_keeps_its_length() {
        let (tagger, vectors) = quick_train();
        let words: Vec<String> =
            ["the", "dog", "barks"].iter().map(|w| w.to_string()).collect();
        let tagged = tagger.tag(&words, &vectors).unwrap();
        assert_eq!(tagged.len(), words.len());
        for word in &tagged {
            assert!(tagger.tag_vocab().index_of(&word.tag).is_some());
        }
    }

    #[test]
    fn empty_training_set_is_fatal() {
        let corpus = corpus();
        let embedding_config = EmbeddingConfig {
            dim: 8,
            epochs: 1,
            ..EmbeddingConfig::default()
        };
        // Embeddings from a disjoint vocabulary: every corpus word is OOV.
        let other: Vec<Vec<String>> =
            vec![vec!["x".to_string(), "y".to_string(), "z".to_string()]];
        let vectors = train_embeddings(&other, &embedding_config).unwrap();
        assert!(NeuralTagger::train(&corpus, &vectors, &TrainConfig::default()).is_err());
    }

    #[test]
    fn all_oov_inference_yields_empty_output() {
        let (tagger, vectors) = quick_train();
        let words = vec!["zebra".to_string(), "quagga".to_string()];
        assert!(tagger.tag(&words, &vectors).unwrap().is_empty());
    }
}
