//! # Backoff Tagging Chain
//!
//! An explicit ordered list of taggers tried from most to least specific,
//! closed by a constant default tagger. The chain as a whole is a total
//! function: every position receives some tag, unseen words included.

use crate::corpus::{Corpus, TaggedWord};
use crate::error::{Result, SintagmaError};
use crate::tagger::ngram::{ContextTagger, DefaultTagger};
use crate::tagger::Tagger;

/// An ordered backoff chain of taggers.
///
/// Each position is offered to the taggers in order; the first `Some`
/// wins. The separate default tagger guarantees the chain never fails to
/// produce a tag.
pub struct BackoffChain {
    taggers: Vec<Box<dyn Tagger>>,
    default: DefaultTagger,
}

impl BackoffChain {
    /// Builds a chain from explicit stages plus the total fallback.
    ///
    /// `taggers` are consulted front to back, so the most specific stage
    /// goes first.
    pub fn new(taggers: Vec<Box<dyn Tagger>>, default: DefaultTagger) -> Self {
        Self { taggers, default }
    }

    /// The canonical trigram → bigram → unigram → default chain trained on
    /// `train`.
    pub fn standard(train: &Corpus, default_tag: &str) -> Self {
        let trigram = ContextTagger::train(train, 3);
        let bigram = ContextTagger::train(train, 2);
        let unigram = ContextTagger::train(train, 1);
        Self::new(
            vec![Box::new(trigram), Box::new(bigram), Box::new(unigram)],
            DefaultTagger::new(default_tag),
        )
    }

    /// Tags a sentence left to right.
    ///
    /// The history offered to each stage is the chain's own output for the
    /// preceding positions. Total: the output always has exactly one tag
    /// per input form.
    pub fn tag(&self, forms: &[String]) -> Vec<TaggedWord> {
        let mut history: Vec<String> = Vec::with_capacity(forms.len());
        let mut tagged = Vec::with_capacity(forms.len());
        for index in 0..forms.len() {
            let tag = self
                .taggers
                .iter()
                .find_map(|t| t.tag_word(forms, index, &history))
                .unwrap_or_else(|| {
                    self.default
                        .tag_word(forms, index, &history)
                        .expect("default tagger is total")
                });
            history.push(tag.clone());
            tagged.push(TaggedWord::new(forms[index].clone(), tag));
        }
        tagged
    }

    /// Tags every sentence of a pre-tokenized document.
    pub fn tag_sentences(&self, sentences: &[Vec<String>]) -> Vec<Vec<TaggedWord>> {
        sentences.iter().map(|s| self.tag(s)).collect()
    }

    /// Token-level accuracy against a held-out gold corpus.
    ///
    /// The fraction of positions where the predicted tag equals the gold
    /// tag.
    ///
    /// # Errors
    ///
    /// [`SintagmaError::NoScoredSentences`] when the corpus holds no
    /// tokens; the mean over zero positions is undefined, not zero.
    pub fn accuracy(&self, test: &Corpus) -> Result<f64> {
        let mut correct = 0usize;
        let mut total = 0usize;
        for sentence in test.sentences() {
            let forms: Vec<String> = sentence.iter().map(|w| w.form.clone()).collect();
            let predicted = self.tag(&forms);
            for (gold, hyp) in sentence.iter().zip(predicted.iter()) {
                if gold.tag == hyp.tag {
                    correct += 1;
                }
                total += 1;
            }
        }
        if total == 0 {
            return Err(SintagmaError::NoScoredSentences);
        }
        Ok(correct as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TaggedWord;

    fn train_corpus() -> Corpus {
        Corpus::from_sentences(vec![
            vec![TaggedWord::new("the", "DT"), TaggedWord::new("dog", "NN")],
            vec![TaggedWord::new("a", "DT"), TaggedWord::new("cat", "NN")],
            vec![TaggedWord::new("the", "DT"), TaggedWord::new("cat", "NN")],
        ])
    }

    fn forms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn tagging_never_fails() {
        let chain = BackoffChain::standard(&train_corpus(), "NN");
        let sentence = forms(&["the", "quizzical", "zyzzyva"]);
        let tagged = chain.tag(&sentence);
        assert_eq!(tagged.len(), sentence.len());
        for word in &tagged {
            assert!(!word.tag.is_empty());
        }
    }

    #[test]
    fn unseen_words_get_the_default_tag() {
        let chain = BackoffChain::standard(&train_corpus(), "NN");
        let tagged = chain.tag(&forms(&["zyzzyva"]));
        assert_eq!(tagged[0].tag, "NN");
    }

    #[test]
    fn seen_words_back_off_to_unigram_evidence() {
        let chain = BackoffChain::standard(&train_corpus(), "XX");
        let tagged = chain.tag(&forms(&["the", "dog"]));
        assert_eq!(tagged[0].tag, "DT");
        assert_eq!(tagged[1].tag, "NN");
    }

    #[test]
    fn empty_sentence_yields_empty_output() {
        let chain = BackoffChain::standard(&train_corpus(), "NN");
        assert!(chain.tag(&[]).is_empty());
    }

    #[test]
    fn accuracy_on_training_data_is_perfect_for_this_corpus() {
        let corpus = train_corpus();
        let chain = BackoffChain::standard(&corpus, "NN");
        assert!((chain.accuracy(&corpus).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_counts_mismatches() {
        let chain = BackoffChain::standard(&train_corpus(), "NN");
        let test = Corpus::from_sentences(vec![vec![
            TaggedWord::new("the", "DT"),
            TaggedWord::new("zebra", "VB"), // unseen; chain will say NN
        ]]);
        assert!((chain.accuracy(&test).unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_over_an_empty_corpus_is_an_error() {
        let chain = BackoffChain::standard(&train_corpus(), "NN");
        let empty = Corpus::from_sentences(Vec::new());
        assert!(matches!(
            chain.accuracy(&empty).unwrap_err(),
            SintagmaError::NoScoredSentences
        ));
    }
}
