//! # Sintagma Core
//!
//! Corpus adapters, trainable part-of-speech taggers and treebank scoring
//! for the sintagma evaluation toolkit. Provides the normalized corpus
//! model, a CoNLL-U reader, an n-gram backoff tagging chain, EVALB-style
//! constituency scoring and CoNLL dependency evaluation.
//!
//! ## Quick Start
//!
//! ```rust
//! use sintagma_core::corpus::{Corpus, TaggedWord};
//! use sintagma_core::tagger::BackoffChain;
//!
//! let train = Corpus::from_sentences(vec![vec![
//!     TaggedWord::new("the", "DT"),
//!     TaggedWord::new("dog", "NN"),
//! ]]);
//! let chain = BackoffChain::standard(&train, "NN");
//!
//! let tagged = chain.tag(&["the".to_string(), "zebra".to_string()]);
//! assert_eq!(tagged[0].tag, "DT");
//! assert_eq!(tagged[1].tag, "NN"); // unseen word falls back to the default
//! ```
pub mod corpus;
pub mod detok;
pub mod error;
pub mod eval;
pub mod tagger;
pub mod tokenize;
pub mod tree;

// Re-export primary API
pub use corpus::{Corpus, TaggedWord};
pub use detok::{Detokenizer, Language};
pub use error::{Result, SintagmaError};
pub use eval::{TreeEvalRun, TreeEvalSummary};
pub use tagger::{BackoffChain, ContextTagger, DefaultTagger, Tagger};
pub use tokenize::Tokenizer;
pub use tree::{LabelNormalizer, Tree, TreeScore};
