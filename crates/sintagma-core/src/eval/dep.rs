//! # Dependency Evaluation
//!
//! Scores a system-parsed CoNLL document against its gold reference:
//! per-metric precision, recall, F1 and aligned accuracy for token forms,
//! POS tags and attachment (UAS/LAS). Sentences whose token sequences
//! cannot be aligned are skipped and counted rather than aborting the run.

use std::fmt;

use crate::corpus::conll::ConllSentence;
use crate::error::{Result, SintagmaError};

/// Metric names, in report order.
pub const METRICS: [&str; 5] = ["Tokens", "UPOS", "XPOS", "UAS", "LAS"];

/// Scores for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScore {
    /// Correct / system tokens.
    pub precision: f64,
    /// Correct / gold tokens.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Correct / aligned tokens (tokens in sentences that aligned).
    pub aligned_accuracy: f64,
}

impl MetricScore {
    fn compute(correct: usize, gold: usize, system: usize, aligned: usize) -> Self {
        let precision = if system == 0 { 0.0 } else { correct as f64 / system as f64 };
        let recall = if gold == 0 { 0.0 } else { correct as f64 / gold as f64 };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        let aligned_accuracy = if aligned == 0 {
            0.0
        } else {
            correct as f64 / aligned as f64
        };
        Self { precision, recall, f1, aligned_accuracy }
    }
}

/// Result of a dependency evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct DepEvaluation {
    metrics: Vec<(&'static str, MetricScore)>,
    /// Sentences skipped because their token sequences diverged.
    pub skipped: usize,
    /// Sentences that entered the counts.
    pub scored: usize,
}

impl DepEvaluation {
    /// Looks up one metric by name.
    pub fn metric(&self, name: &str) -> Option<MetricScore> {
        self.metrics
            .iter()
            .find(|(metric, _)| *metric == name)
            .map(|(_, score)| *score)
    }

    /// All metrics in report order.
    pub fn metrics(&self) -> &[(&'static str, MetricScore)] {
        &self.metrics
    }
}

/// Evaluates system dependency parses against gold.
///
/// Sentences are paired by position. A pair whose surface form sequences
/// differ (length or content) is skipped and counted; attachment counts
/// accumulate over the aligned pairs only, while gold/system totals cover
/// every sentence so that skips depress precision and recall.
///
/// # Errors
///
/// [`SintagmaError::NoScoredSentences`] when no sentence pair aligned.
pub fn evaluate(gold: &[ConllSentence], system: &[ConllSentence]) -> Result<DepEvaluation> {
    let gold_total: usize = gold.iter().map(Vec::len).sum();
    let system_total: usize = system.iter().map(Vec::len).sum();

    let mut aligned = 0usize;
    let mut scored = 0usize;
    let mut skipped = 0usize;
    let mut correct_upos = 0usize;
    let mut correct_xpos = 0usize;
    let mut correct_uas = 0usize;
    let mut correct_las = 0usize;

    let paired = gold.len().min(system.len());
    // Unpaired tail sentences on either side count as skipped.
    skipped += gold.len().max(system.len()) - paired;

    for (gold_sent, sys_sent) in gold.iter().zip(system.iter()) {
        let forms_match = gold_sent.len() == sys_sent.len()
            && gold_sent
                .iter()
                .zip(sys_sent.iter())
                .all(|(g, s)| g.form == s.form);
        if !forms_match {
            skipped += 1;
            continue;
        }

        scored += 1;
        aligned += gold_sent.len();
        for (g, s) in gold_sent.iter().zip(sys_sent.iter()) {
            if g.upos == s.upos {
                correct_upos += 1;
            }
            if g.xpos == s.xpos {
                correct_xpos += 1;
            }
            if g.head == s.head {
                correct_uas += 1;
                if g.deprel == s.deprel {
                    correct_las += 1;
                }
            }
        }
    }

    if scored == 0 {
        return Err(SintagmaError::NoScoredSentences);
    }

    let metrics = vec![
        ("Tokens", MetricScore::compute(aligned, gold_total, system_total, aligned)),
        ("UPOS", MetricScore::compute(correct_upos, gold_total, system_total, aligned)),
        ("XPOS", MetricScore::compute(correct_xpos, gold_total, system_total, aligned)),
        ("UAS", MetricScore::compute(correct_uas, gold_total, system_total, aligned)),
        ("LAS", MetricScore::compute(correct_las, gold_total, system_total, aligned)),
    ];

    Ok(DepEvaluation { metrics, skipped, scored })
}

impl fmt::Display for DepEvaluation {
    /// Renders the fixed-width results table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Metric     | Precision |    Recall |  F1 Score | AligndAcc")?;
        writeln!(f, "-----------+-----------+-----------+-----------+-----------")?;
        for (name, score) in &self.metrics {
            writeln!(
                f,
                "{:11}|{:10.2} |{:10.2} |{:10.2} |{:10.2}",
                name,
                100.0 * score.precision,
                100.0 * score.recall,
                100.0 * score.f1,
                100.0 * score.aligned_accuracy,
            )?;
        }
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
    use crate::corpus::conll::read_conll;
    use std::io::Cursor;

    fn sentence(doc: &str) -> Vec<ConllSentence> {
        read_conll(Cursor::new(doc)).unwrap()
    }

    const GOLD: &str = "1\tThe\t_\tDET\tDT\t_\t2\tdet\t_\t_\n\
                        2\tdog\t_\tNOUN\tNN\t_\t0\troot\t_\t_\n\n";

    #[test]
    fn identical_parses_score_one_everywhere() {
        let gold = sentence(GOLD);
        let eval = evaluate(&gold, &gold).unwrap();
        for (_, score) in eval.metrics() {
            assert!((score.precision - 1.0).abs() < f64::EPSILON);
            assert!((score.recall - 1.0).abs() < f64::EPSILON);
            assert!((score.f1 - 1.0).abs() < f64::EPSILON);
            assert!((score.aligned_accuracy - 1.0).abs() < f64::EPSILON);
        }
        assert_eq!(eval.skipped, 0);
    }

    #[test]
    fn wrong_head_lowers_uas_and_las() {
        let gold = sentence(GOLD);
        let system = sentence(
            "1\tThe\t_\tDET\tDT\t_\t0\troot\t_\t_\n\
             2\tdog\t_\tNOUN\tNN\t_\t1\tdet\t_\t_\n\n",
        );
        let eval = evaluate(&gold, &system).unwrap();
        assert!((eval.metric("UAS").unwrap().aligned_accuracy - 0.0).abs() < f64::EPSILON);
        assert!((eval.metric("UPOS").unwrap().aligned_accuracy - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn las_requires_matching_deprel() {
        let gold = sentence(GOLD);
        let system = sentence(
            "1\tThe\t_\tDET\tDT\t_\t2\tamod\t_\t_\n\
             2\tdog\t_\tNOUN\tNN\t_\t0\troot\t_\t_\n\n",
        );
        let eval = evaluate(&gold, &system).unwrap();
        assert!((eval.metric("UAS").unwrap().aligned_accuracy - 1.0).abs() < f64::EPSILON);
        assert!((eval.metric("LAS").unwrap().aligned_accuracy - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn diverging_sentences_are_skipped_and_depress_recall() {
        let mut gold = sentence(GOLD);
        gold.extend(sentence(GOLD));
        let mut system = sentence(GOLD);
        system.extend(sentence("1\tcat\t_\tNOUN\tNN\t_\t0\troot\t_\t_\n\n"));
        let eval = evaluate(&gold, &system).unwrap();
        assert_eq!(eval.skipped, 1);
        assert_eq!(eval.scored, 1);
        let upos = eval.metric("UPOS").unwrap();
        assert!(upos.recall < 1.0);
        assert!((upos.aligned_accuracy - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nothing_aligned_is_an_error() {
        let gold = sentence(GOLD);
        let system = sentence("1\tcat\t_\tNOUN\tNN\t_\t0\troot\t_\t_\n\n");
        assert!(matches!(
            evaluate(&gold, &system).unwrap_err(),
            SintagmaError::NoScoredSentences
        ));
    }

    #[test]
    fn display_renders_the_metric_table() {
        let gold = sentence(GOLD);
        let eval = evaluate(&gold, &gold).unwrap();
        let table = eval.to_string();
        assert!(table.contains("Metric     | Precision"));
        assert!(table.contains("LAS"));
        assert!(table.contains("100.00"));
    }
}
