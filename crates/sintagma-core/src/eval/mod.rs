//! # Evaluation Harness
//!
//! Accumulators for evaluation runs. Scores are collected locally inside a
//! run value with a single-call lifecycle, never in shared state. Sentences
//! that cannot be aligned are skipped and counted, and aggregates are
//! arithmetic means over the successfully scored sentences only.

pub mod dep;

use std::fmt;

use crate::error::{Result, SintagmaError};
use crate::tree::score::{score_trees, TreeScore};
use crate::tree::Tree;

/// Default cap on the number of successfully scored sentences per run.
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// Accumulator for one constituency evaluation run.
pub struct TreeEvalRun {
    limit: usize,
    scores: Vec<TreeScore>,
    skipped: usize,
}

/// Aggregates of a finished constituency run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeEvalSummary {
    /// Mean labeled bracket precision over scored sentences.
    pub precision: f64,
    /// Mean labeled bracket recall over scored sentences.
    pub recall: f64,
    /// Mean preterminal tag accuracy over scored sentences.
    pub tag_accuracy: f64,
    /// Number of sentences that entered the aggregate.
    pub scored: usize,
    /// Number of sentences skipped for alignment failures.
    pub skipped: usize,
}

impl TreeEvalRun {
    /// Creates a run that stops accepting scores after `limit` successes.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            scores: Vec::new(),
            skipped: 0,
        }
    }

    /// Scores one gold/hypothesis pair.
    ///
    /// Alignment failures are recovered locally: the sentence is counted
    /// as skipped and the run continues. Any other error propagates.
    pub fn observe(&mut self, gold: &Tree, hypothesis: &Tree) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        match score_trees(gold, hypothesis) {
            Ok(score) => self.scores.push(score),
            Err(SintagmaError::TreeAlignment(_)) => self.skipped += 1,
            Err(other) => return Err(other),
        }
        Ok(())
    }

    /// Records a sentence skipped before scoring, e.g. when the
    /// annotation service returned no parse for it.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Returns `true` once the sample cap has been reached.
    pub fn is_complete(&self) -> bool {
        self.scores.len() >= self.limit
    }

    /// Sentences skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Sentences scored so far.
    pub fn scored(&self) -> usize {
        self.scores.len()
    }

    /// Final aggregates: arithmetic means over the scored sentences.
    ///
    /// # Errors
    ///
    /// [`SintagmaError::NoScoredSentences`] when nothing was scored; the
    /// mean is undefined and is never silently reported as zero.
    pub fn summary(&self) -> Result<TreeEvalSummary> {
        if self.scores.is_empty() {
            return Err(SintagmaError::NoScoredSentences);
        }
        let n = self.scores.len() as f64;
        Ok(TreeEvalSummary {
            precision: self.scores.iter().map(|s| s.precision).sum::<f64>() / n,
            recall: self.scores.iter().map(|s| s.recall).sum::<f64>() / n,
            tag_accuracy: self.scores.iter().map(|s| s.tag_accuracy).sum::<f64>() / n,
            scored: self.scores.len(),
            skipped: self.skipped,
        })
    }
}

impl Default for TreeEvalRun {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LIMIT)
    }
}

impl fmt::Display for TreeEvalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:  {:.4}", self.tag_accuracy)?;
        writeln!(f, "Precision: {:.4}", self.precision)?;
        writeln!(f, "Recall:    {:.4}", self.recall)?;
        write!(
            f,
            "Sentences: {} scored, {} skipped",
            self.scored, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_tree() -> Tree {
        Tree::parse("(S (NP (DT the) (NN dog)))").unwrap()
    }

    #[test]
    fn identical_pair_scores_one() {
        let mut run = TreeEvalRun::new(10);
        run.observe(&dog_tree(), &dog_tree()).unwrap();
        let summary = run.summary().unwrap();
        assert!((summary.precision - 1.0).abs() < f64::EPSILON);
        assert!((summary.recall - 1.0).abs() < f64::EPSILON);
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn alignment_failures_are_skipped_and_counted() {
        let mut run = TreeEvalRun::new(10);
        let short = Tree::parse("(S (NN dog))").unwrap();
        run.observe(&dog_tree(), &short).unwrap();
        run.observe(&dog_tree(), &dog_tree()).unwrap();
        let summary = run.summary().unwrap();
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn empty_run_summary_is_an_error() {
        let run = TreeEvalRun::new(10);
        assert!(matches!(
            run.summary().unwrap_err(),
            SintagmaError::NoScoredSentences
        ));
    }

    #[test]
    fn run_stops_at_the_sample_cap() {
        let mut run = TreeEvalRun::new(2);
        for _ in 0..5 {
            run.observe(&dog_tree(), &dog_tree()).unwrap();
        }
        assert!(run.is_complete());
        assert_eq!(run.summary().unwrap().scored, 2);
    }

    #[test]
    fn summary_display_reports_skips() {
        let mut run = TreeEvalRun::new(10);
        run.observe(&dog_tree(), &dog_tree()).unwrap();
        let text = run.summary().unwrap().to_string();
        assert!(text.contains("1 scored"));
        assert!(text.contains("0 skipped"));
    }
}
