//! # Labeled Bracket Scoring
//!
//! EVALB-style comparison of a hypothesis tree against a gold tree:
//! labeled bracket precision and recall over internal constituents, plus
//! part-of-speech accuracy over the aligned terminals.

use std::collections::HashMap;

use crate::error::{Result, SintagmaError};
use crate::tree::{Span, Tree};

/// Per-sentence constituency scores.
///
/// `tag_accuracy` is the fraction of terminal positions whose
/// preterminal labels match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeScore {
    /// Matched brackets / hypothesis brackets.
    pub precision: f64,
    /// Matched brackets / gold brackets.
    pub recall: f64,
    /// Matching preterminal tags / terminal count.
    pub tag_accuracy: f64,
}

/// Scores a hypothesis tree against its gold reference.
///
/// # Errors
///
/// [`SintagmaError::TreeAlignment`] when the trees are structurally
/// incomparable: differing terminal counts, diverging surface forms, or
/// no internal constituents to compare. Callers treat this as a skip,
/// not a failure of the whole run.
pub fn score_trees(gold: &Tree, hypothesis: &Tree) -> Result<TreeScore> {
    let gold_terminals = gold.terminals();
    let hyp_terminals = hypothesis.terminals();

    if gold_terminals.len() != hyp_terminals.len() {
        return Err(SintagmaError::TreeAlignment(format!(
            "terminal count mismatch: gold {} vs hypothesis {}",
            gold_terminals.len(),
            hyp_terminals.len()
        )));
    }
    if gold_terminals.is_empty() {
        return Err(SintagmaError::TreeAlignment("tree has no terminals".into()));
    }
    for (i, ((_, gold_form), (_, hyp_form))) in
        gold_terminals.iter().zip(hyp_terminals.iter()).enumerate()
    {
        if gold_form != hyp_form {
            return Err(SintagmaError::TreeAlignment(format!(
                "surface form mismatch at terminal {i}: gold {gold_form:?} vs hypothesis {hyp_form:?}"
            )));
        }
    }

    let gold_spans = gold.spans();
    let hyp_spans = hypothesis.spans();
    if gold_spans.is_empty() || hyp_spans.is_empty() {
        return Err(SintagmaError::TreeAlignment(
            "no internal constituents to score".into(),
        ));
    }

    let matched = multiset_intersection(&gold_spans, &hyp_spans);
    let matching_tags = gold_terminals
        .iter()
        .zip(hyp_terminals.iter())
        .filter(|((gold_tag, _), (hyp_tag, _))| gold_tag == hyp_tag)
        .count();

    Ok(TreeScore {
        precision: matched as f64 / hyp_spans.len() as f64,
        recall: matched as f64 / gold_spans.len() as f64,
        tag_accuracy: matching_tags as f64 / gold_terminals.len() as f64,
    })
}

/// Size of the multiset intersection of two span collections.
///
/// Duplicate spans (unary chains with repeated labels) must only match as
/// many times as they occur on both sides.
fn multiset_intersection(gold: &[Span], hypothesis: &[Span]) -> usize {
    let mut counts: HashMap<&Span, usize> = HashMap::new();
    for span in gold {
        *counts.entry(span).or_insert(0) += 1;
    }
    let mut matched = 0usize;
    for span in hypothesis {
        if let Some(count) = counts.get_mut(span) {
            if *count > 0 {
                *count -= 1;
                matched += 1;
            }
        }
    }
    matched
}
