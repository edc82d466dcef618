//! Dataset assembly for the neural tagger: a fixed tag-index table and
//! (embedding vector, tag index) training pairs.

use std::collections::HashMap;

use sintagma_core::corpus::Corpus;

use crate::embedding::WordVectors;

/// Fixed tag-index table built once from the training corpus.
///
/// Indices follow first-seen order in the corpus, so the table is
/// deterministic and stays valid for the lifetime of a trained model.
#[derive(Debug, Clone)]
pub struct TagVocab {
    tags: Vec<String>,
    index: HashMap<String, usize>,
}

impl TagVocab {
    /// Builds the table from every tag occurring in the corpus.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let tags = corpus.tagset();
        let index = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), i))
            .collect();
        Self { tags, index }
    }

    /// Index of a tag, if present.
    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.index.get(tag).copied()
    }

    /// Tag string for a class index, if in range.
    pub fn tag(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(String::as_str)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no tags were observed.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Flat training dataset: row-major feature matrix plus class indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Row-major `len x dim` embedding vectors.
    pub features: Vec<f32>,
    /// One class index per row.
    pub labels: Vec<u32>,
    /// Feature dimension.
    pub dim: usize,
}

impl Dataset {
    /// Number of examples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the dataset holds no examples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Builds (embedding vector, tag index) pairs for every tagged word whose
/// form is in the embedding vocabulary.
///
/// Vocabulary misses are skipped silently; they are expected when the
/// embedding model was trained with a frequency cutoff. An entirely empty
/// result is the caller's fatal condition, checked at training time.
pub fn build_dataset(corpus: &Corpus, vectors: &WordVectors, tags: &TagVocab) -> Dataset {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for word in corpus.tagged_words() {
        let (Some(vector), Some(label)) = (vectors.get(&word.form), tags.index_of(&word.tag))
        else {
            continue;
        };
        features.extend_from_slice(vector);
        labels.push(label as u32);
    }
    Dataset {
        features,
        labels,
        dim: vectors.dim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{train_embeddings, EmbeddingConfig};
    use sintagma_core::corpus::TaggedWord;

    fn corpus() -> Corpus {
        Corpus::from_sentences(vec![
            vec![TaggedWord::new("the", "DT"), TaggedWord::new("dog", "NN")],
            vec![TaggedWord::new("a", "DT"), TaggedWord::new("cat", "NN")],
        ])
    }

    fn tiny_config() -> EmbeddingConfig {
        EmbeddingConfig {
            dim: 8,
            epochs: 1,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn tag_vocab_is_first_seen_and_stable() {
        let vocab = TagVocab::from_corpus(&corpus());
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of("DT"), Some(0));
        assert_eq!(vocab.index_of("NN"), Some(1));
        assert_eq!(vocab.tag(1), Some("NN"));
        assert_eq!(vocab.index_of("VB"), None);
    }

    #[test]
    fn dataset_covers_in_vocabulary_words() {
        let corpus = corpus();
        let vectors = train_embeddings(&corpus.forms(), &tiny_config()).unwrap();
        let tags = TagVocab::from_corpus(&corpus);
        let dataset = build_dataset(&corpus, &vectors, &tags);
        // min_count = 1: every word is in vocabulary, nothing skipped.
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.features.len(), 4 * dataset.dim);
    }

    #[test]
    fn out_of_vocabulary_words_are_skipped() {
        let train_corpus = corpus();
        let vectors = train_embeddings(&train_corpus.forms(), &tiny_config()).unwrap();
        let tags = TagVocab::from_corpus(&train_corpus);
        let extended = Corpus::from_sentences(vec![vec![
            TaggedWord::new("the", "DT"),
            TaggedWord::new("zebra", "NN"),
        ]]);
        let dataset = build_dataset(&extended, &vectors, &tags);
        assert_eq!(dataset.len(), 1);
    }
}
