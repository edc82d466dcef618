use thiserror::Error;

/// Errors that can occur during sintagma core operations.
#[derive(Debug, Error)]
pub enum SintagmaError {
    /// A corpus record did not match the expected tabular layout.
    ///
    /// A skipped record would shift every following token and corrupt
    /// the alignment between hypothesis and gold, so this is fatal.
    #[error("malformed corpus record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the input.
        line: usize,
        /// What was wrong with the record.
        reason: String,
    },

    /// The input ended in the middle of a sentence block.
    #[error("unexpected end of input at line {line}: sentence not terminated by a blank line")]
    UnexpectedEof {
        /// 1-based line number of the last record read.
        line: usize,
    },

    /// A bracketed tree string could not be parsed.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// Gold and hypothesis trees are structurally incomparable.
    ///
    /// Recoverable: callers skip the sentence and count it.
    #[error("tree alignment failed: {0}")]
    TreeAlignment(String),

    /// An aggregate metric was requested but no sentence was scored.
    #[error("no sentences were successfully scored; aggregate metric is undefined")]
    NoScoredSentences,

    /// A label normalization pattern failed to compile.
    #[error("normalization rule error: {0}")]
    RuleError(#[from] regex::Error),

    /// Underlying I/O failure while reading a corpus.
    #[error("corpus I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sintagma operations.
pub type Result<T> = std::result::Result<T, SintagmaError>;
