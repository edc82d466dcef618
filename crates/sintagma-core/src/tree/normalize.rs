//! # Treebank Label Normalization
//!
//! Some treebanks carry fine-grained constituent labels that the
//! annotation pipeline under evaluation never produces (e.g. AnCora's
//! `grup.nom.ms` vs a parser's `grup.nom`). Rather than hardcoding
//! corpus-specific rewrites, normalization is a configurable ordered list
//! of regex rules applied to the gold bracket string before parsing.

use regex::Regex;
use serde::Deserialize;

use crate::error::Result;

/// One rewrite rule: every match of `pattern` becomes `replacement`.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelRule {
    /// Regex matched against the bracket string.
    pub pattern: String,
    /// Replacement text (regex capture syntax allowed).
    pub replacement: String,
}

/// An ordered list of compiled label rewrite rules.
pub struct LabelNormalizer {
    rules: Vec<(Regex, String)>,
}

impl LabelNormalizer {
    /// Compiles the given rules, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the underlying regex error if a pattern does not compile.
    pub fn new(rules: &[LabelRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push((Regex::new(&rule.pattern)?, rule.replacement.clone()));
        }
        Ok(Self { rules: compiled })
    }

    /// The identity normalizer.
    pub fn identity() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules for the Spanish AnCora treebank label scheme.
    ///
    /// These collapse morphologically suffixed labels to their bare phrase
    /// category and map sentence-internal punctuation tags (`Fe`, `Fc`,
    /// `Fp`) to a single `PUNCT` tag. They are specific to AnCora and are
    /// not expected to generalize to other treebank label schemes.
    pub fn ancora() -> Self {
        let rules = [
            (r"grup\.nom\.[a-z]*", "grup.nom"),
            (r"s\.a\.[a-z]*", "s.a"),
            (r"grup\.a\.[a-z]*", "grup.a"),
            (r"espec\.[a-z]*", "espec"),
            (r"conj\.[a-z]*", "conj"),
            (r"\((?:Fe|Fc|Fp)", "(PUNCT"),
        ];
        Self {
            rules: rules
                .iter()
                .map(|(pattern, replacement)| {
                    // Static patterns; compilation cannot fail.
                    (Regex::new(pattern).unwrap(), replacement.to_string())
                })
                .collect(),
        }
    }

    /// Applies every rule, in order, to a bracket string.
    pub fn apply(&self, bracket: &str) -> String {
        let mut out = bracket.to_string();
        for (pattern, replacement) in &self.rules {
            out = pattern.replace_all(&out, replacement.as_str()).into_owned();
        }
        out
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;

    #[test]
    fn identity_changes_nothing() {
        let normalizer = LabelNormalizer::identity();
        assert_eq!(normalizer.apply("(S (NN dog))"), "(S (NN dog))");
    }

    #[test]
    fn ancora_collapses_suffixed_labels() {
        let normalizer = LabelNormalizer::ancora();
        let input = "(sn (espec.ms (da0ms0 El)) (grup.nom.ms (ncms000 gato)))";
        let output = normalizer.apply(input);
        assert!(output.contains("(espec "));
        assert!(output.contains("(grup.nom "));
        assert!(!output.contains("grup.nom.ms"));
    }

    #[test]
    fn ancora_maps_punctuation_tags() {
        let normalizer = LabelNormalizer::ancora();
        let output = normalizer.apply("(S (Fp .))");
        assert_eq!(output, "(S (PUNCT .))");
    }

    #[test]
    fn normalized_output_still_parses() {
        let normalizer = LabelNormalizer::ancora();
        let output =
            normalizer.apply("(sentence (grup.nom.fp (ncfp000 casas)) (Fp .))");
        assert!(Tree::parse(&output).is_ok());
    }

    #[test]
    fn custom_rules_apply_in_order() {
        let rules = vec![
            LabelRule { pattern: "A".into(), replacement: "B".into() },
            LabelRule { pattern: "B".into(), replacement: "C".into() },
        ];
        let normalizer = LabelNormalizer::new(&rules).unwrap();
        assert_eq!(normalizer.apply("(A x)"), "(C x)");
    }

    #[test]
    fn bad_pattern_is_an_error() {
        let rules = vec![LabelRule { pattern: "(".into(), replacement: "".into() }];
        assert!(LabelNormalizer::new(&rules).is_err());
    }
}
