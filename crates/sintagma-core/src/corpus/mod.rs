//! # Corpus Data Model
//!
//! Normalized in-memory representation of tagged corpora: sentences of
//! `(form, tag)` pairs, loaded once and immutable thereafter. Adapters for
//! the concrete file formats live in the [`conll`] and [`tagged`] submodules.

pub mod conll;
pub mod tagged;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single token paired with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedWord {
    /// Surface form, exactly as it appeared in the corpus.
    pub form: String,
    /// Tag label drawn from the corpus tagset.
    pub tag: String,
}

impl TaggedWord {
    /// Creates a new tagged word.
    pub fn new(form: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for TaggedWord {
    /// Renders the literal pair form used by the tagged output files,
    /// e.g. `('dog', 'NN')`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', '{}')", self.form, self.tag)
    }
}

/// An ordered collection of tagged sentences.
///
/// Token order within a sentence is semantically meaningful (syntactic
/// position) and is preserved exactly as read. A corpus is built once by an
/// adapter and never mutated afterwards; training and evaluation only read
/// from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    sentences: Vec<Vec<TaggedWord>>,
}

impl Corpus {
    /// Builds a corpus from pre-tagged sentences.
    pub fn from_sentences(sentences: Vec<Vec<TaggedWord>>) -> Self {
        Self { sentences }
    }

    /// The tagged sentences, in corpus order.
    pub fn sentences(&self) -> &[Vec<TaggedWord>] {
        &self.sentences
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Returns `true` if the corpus holds no sentences.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Iterates over every tagged word in corpus order.
    pub fn tagged_words(&self) -> impl Iterator<Item = &TaggedWord> {
        self.sentences.iter().flatten()
    }

    /// The sentences with tags stripped, as plain form sequences.
    pub fn forms(&self) -> Vec<Vec<String>> {
        self.sentences
            .iter()
            .map(|s| s.iter().map(|w| w.form.clone()).collect())
            .collect()
    }

    /// Distinct tags in first-seen order.
    ///
    /// The order is deterministic for a given corpus, which lets callers
    /// build stable tag-index tables from it.
    pub fn tagset(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tags = Vec::new();
        for word in self.tagged_words() {
            if seen.insert(word.tag.as_str()) {
                tags.push(word.tag.clone());
            }
        }
        tags
    }

    /// Splits the corpus into disjoint train and test partitions.
    ///
    /// `test_fraction` of the sentences (rounded down, at least one when the
    /// corpus is non-empty and the fraction is positive) are sampled into the
    /// test partition using a seeded shuffle. The split is fixed before any
    /// training begins so that no test sentence can leak into a model.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Corpus, Corpus) {
        let mut indices: Vec<usize> = (0..self.sentences.len()).collect();
        let mut rng = oorandom::Rand64::new(seed as u128);
        // Fisher-Yates
        for i in (1..indices.len()).rev() {
            let j = rng.rand_range(0..(i as u64 + 1)) as usize;
            indices.swap(i, j);
        }

        let mut n_test = (self.sentences.len() as f64 * test_fraction) as usize;
        if n_test == 0 && test_fraction > 0.0 && !self.sentences.is_empty() {
            n_test = 1;
        }

        let test_ids: HashSet<usize> = indices[..n_test].iter().copied().collect();
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (i, sentence) in self.sentences.iter().enumerate() {
            if test_ids.contains(&i) {
                test.push(sentence.clone());
            } else {
                train.push(sentence.clone());
            }
        }
        (Corpus::from_sentences(train), Corpus::from_sentences(test))
    }
}
