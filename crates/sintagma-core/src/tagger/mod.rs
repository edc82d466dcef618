//! # Part-of-Speech Taggers
//!
//! A small family of sequence taggers behind a common [`Tagger`] seam:
//! frequency-trained n-gram context taggers, a constant default tagger,
//! and the [`backoff::BackoffChain`] that composes them into a total
//! tagging function.

pub mod backoff;
pub mod ngram;

pub use backoff::BackoffChain;
pub use ngram::{ContextTagger, DefaultTagger};

/// Capability shared by every tagger variant.
///
/// A tagger is consulted for one position at a time. `history` holds the
/// tags already assigned to the positions left of `index` during the same
/// run, which is what the n-gram context taggers condition on. Returning
/// `None` means the tagger has no evidence for this position and defers to
/// whatever fallback the caller has configured.
pub trait Tagger {
    /// Propose a tag for `forms[index]`, or `None` if unobserved.
    fn tag_word(&self, forms: &[String], index: usize, history: &[String]) -> Option<String>;
}
