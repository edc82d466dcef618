//! # Sintagma Trainer
//!
//! Training for the embedding-based neural tagger: word2vec-style
//! embeddings over sentence sequences, a feed-forward classifier from
//! embedding vectors to tag classes, and the batched training loop with a
//! held-out evaluation report.

pub mod data;
pub mod embedding;
pub mod model;
pub mod trainer;

pub use data::{build_dataset, Dataset, TagVocab};
pub use embedding::{train_embeddings, EmbeddingAlgorithm, EmbeddingConfig, WordVectors};
pub use model::TagClassifier;
pub use trainer::{run_training, EvalReport, NeuralTagger, TrainConfig};
