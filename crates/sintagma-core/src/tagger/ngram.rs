//! # N-gram Context Taggers
//!
//! Statistical taggers trained from a labeled corpus. An order-n tagger
//! conditions on the `n - 1` previously assigned tags plus the current
//! surface form and emits the tag most frequently observed for that
//! context during training. Ties are broken by first-seen order in the
//! training data, so training is deterministic and stable.

use std::collections::HashMap;

use crate::corpus::Corpus;
use crate::tagger::Tagger;

/// Context key: the tags of the `n - 1` preceding positions plus the form.
type Context = (Vec<String>, String);

/// Frequency distribution over tags for one context.
///
/// Tracks, per candidate tag, its count and the order in which it was first
/// observed. The winner is the highest count, earliest first-seen on ties.
#[derive(Debug, Default)]
struct TagFreq {
    counts: HashMap<String, (u64, usize)>,
    next_rank: usize,
}

impl TagFreq {
    fn observe(&mut self, tag: &str) {
        let rank = self.next_rank;
        let entry = self.counts.entry(tag.to_string()).or_insert((0, rank));
        if entry.0 == 0 {
            self.next_rank += 1;
        }
        entry.0 += 1;
    }

    fn most_frequent(&self) -> Option<&str> {
        self.counts
            .iter()
            .max_by(|(_, (ca, ra)), (_, (cb, rb))| ca.cmp(cb).then(rb.cmp(ra)))
            .map(|(tag, _)| tag.as_str())
    }
}

/// A statistical tagger of a fixed context order.
///
/// Order 1 is a unigram tagger (form only), order 2 a bigram tagger
/// (one previous tag + form), order 3 a trigram tagger. Contexts never
/// observed in training yield `None`.
#[derive(Debug)]
pub struct ContextTagger {
    order: usize,
    table: HashMap<Context, String>,
}

impl ContextTagger {
    /// Trains an order-`order` tagger from a labeled corpus.
    ///
    /// For every position, the context `(previous order-1 gold tags, form)`
    /// is counted against its gold tag; the table keeps the most frequent
    /// tag per context.
    ///
    /// # Panics
    ///
    /// Panics if `order` is zero.
    pub fn train(corpus: &Corpus, order: usize) -> Self {
        assert!(order >= 1, "context order must be at least 1");

        let mut freqs: HashMap<Context, TagFreq> = HashMap::new();
        for sentence in corpus.sentences() {
            for (i, word) in sentence.iter().enumerate() {
                let history = Self::history_at(
                    &sentence[..i]
                        .iter()
                        .map(|w| w.tag.clone())
                        .collect::<Vec<_>>(),
                    order,
                );
                let context = (history, word.form.clone());
                freqs.entry(context).or_default().observe(&word.tag);
            }
        }

        let table = freqs
            .into_iter()
            .filter_map(|(context, freq)| {
                freq.most_frequent().map(|tag| (context, tag.to_string()))
            })
            .collect();

        Self { order, table }
    }

    /// Number of distinct contexts observed during training.
    pub fn context_count(&self) -> usize {
        self.table.len()
    }

    /// The tag history window of length `order - 1` ending at the current
    /// position. Sentence-initial positions use a shorter window, mirroring
    /// how the contexts were built during training.
    fn history_at(tags: &[String], order: usize) -> Vec<String> {
        let width = order - 1;
        let start = tags.len().saturating_sub(width);
        tags[start..].to_vec()
    }
}

impl Tagger for ContextTagger {
    fn tag_word(&self, forms: &[String], index: usize, history: &[String]) -> Option<String> {
        let context = (
            Self::history_at(history, self.order),
            forms[index].clone(),
        );
        self.table.get(&context).cloned()
    }
}

/// The total fallback tagger: assigns one fixed tag to every position.
#[derive(Debug, Clone)]
pub struct DefaultTagger {
    tag: String,
}

impl DefaultTagger {
    /// Creates a default tagger emitting `tag` unconditionally.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The constant tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Tagger for DefaultTagger {
    fn tag_word(&self, _forms: &[String], _index: usize, _history: &[String]) -> Option<String> {
        Some(self.tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TaggedWord;

    fn dt_nn_corpus() -> Corpus {
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
    fn unigram_returns_most_frequent_tag_for_seen_word() {
        let tagger = ContextTagger::train(&dt_nn_corpus(), 1);
        let tag = tagger.tag_word(&forms(&["the"]), 0, &[]);
        assert_eq!(tag.as_deref(), Some("DT"));
    }

    #[test]
    fn unigram_returns_none_for_unseen_word() {
        let tagger = ContextTagger::train(&dt_nn_corpus(), 1);
        assert_eq!(tagger.tag_word(&forms(&["zebra"]), 0, &[]), None);
    }

    #[test]
    fn trigram_context_seen_once_is_reproduced() {
        let corpus = Corpus::from_sentences(vec![vec![
            TaggedWord::new("time", "NN"),
            TaggedWord::new("flies", "VBZ"),
            TaggedWord::new("fast", "RB"),
        ]]);
        let tagger = ContextTagger::train(&corpus, 3);
        let history = vec!["NN".to_string(), "VBZ".to_string()];
        let tag = tagger.tag_word(&forms(&["time", "flies", "fast"]), 2, &history);
        assert_eq!(tag.as_deref(), Some("RB"));
    }

    #[test]
    fn ties_break_by_first_seen_order() {
        // "fly" observed once as NN then once as VB: NN was seen first.
        let corpus = Corpus::from_sentences(vec![
            vec![TaggedWord::new("fly", "NN")],
            vec![TaggedWord::new("fly", "VB")],
        ]);
        let tagger = ContextTagger::train(&corpus, 1);
        assert_eq!(tagger.tag_word(&forms(&["fly"]), 0, &[]).as_deref(), Some("NN"));
    }

    #[test]
    fn higher_count_beats_first_seen() {
        let corpus = Corpus::from_sentences(vec![
            vec![TaggedWord::new("fly", "NN")],
            vec![TaggedWord::new("fly", "VB")],
            vec![TaggedWord::new("fly", "VB")],
        ]);
        let tagger = ContextTagger::train(&corpus, 1);
        assert_eq!(tagger.tag_word(&forms(&["fly"]), 0, &[]).as_deref(), Some("VB"));
    }

    #[test]
    fn default_tagger_is_total() {
        let tagger = DefaultTagger::new("NN");
        assert_eq!(tagger.tag_word(&forms(&["anything"]), 0, &[]).as_deref(), Some("NN"));
    }

    #[test]
    fn bigram_conditions_on_previous_tag() {
        // "saw" is VBD after a noun-ish history, NN after a determiner.
        let corpus = Corpus::from_sentences(vec![
            vec![TaggedWord::new("she", "PRP"), TaggedWord::new("saw", "VBD")],
            vec![TaggedWord::new("the", "DT"), TaggedWord::new("saw", "NN")],
        ]);
        let tagger = ContextTagger::train(&corpus, 2);
        let s = forms(&["she", "saw"]);
        assert_eq!(
            tagger.tag_word(&s, 1, &["PRP".to_string()]).as_deref(),
            Some("VBD")
        );
        assert_eq!(
            tagger.tag_word(&s, 1, &["DT".to_string()]).as_deref(),
            Some("NN")
        );
    }
}
