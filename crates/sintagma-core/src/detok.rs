//! # Detokenizer
//!
//! Deterministic, language-aware joining of a token sequence back into
//! running text, for feeding pretokenized gold sentences to an annotation
//! service that expects raw strings. Rules follow the usual conventions:
//! no space before closing punctuation, no space after opening
//! punctuation, clitics reattach to their host word.

/// Languages with dedicated detokenization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English rules (clitic reattachment).
    #[default]
    English,
    /// Spanish rules (inverted punctuation attaches forward).
    Spanish,
    /// Spacing rules only.
    Generic,
}

/// Tokens that attach to the preceding token (no space before).
const ATTACH_LEFT: &[&str] = &[
    ".", ",", ";", ":", "!", "?", ")", "]", "}", "%", "...", "''", "\u{201d}", "\u{2019}",
];

/// Tokens that attach to the following token (no space after).
const ATTACH_RIGHT: &[&str] = &["(", "[", "{", "``", "\u{201c}", "\u{2018}", "\u{00bf}", "\u{00a1}"];

/// Deterministic token joiner.
#[derive(Debug, Clone, Default)]
pub struct Detokenizer {
    language: Language,
}

impl Detokenizer {
    /// Creates a detokenizer for the given language.
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Joins tokens into a single string.
    ///
    /// # Examples
    /// ```
    /// use sintagma_core::detok::{Detokenizer, Language};
    ///
    /// let detok = Detokenizer::new(Language::English);
    /// let tokens = ["The", "dog", "barks", "."].map(String::from);
    /// assert_eq!(detok.detokenize(&tokens), "The dog barks.");
    /// ```
    pub fn detokenize(&self, tokens: &[String]) -> String {
        let mut out = String::new();
        let mut suppress_space = true; // no leading space
        for token in tokens {
            let attach_left = ATTACH_LEFT.contains(&token.as_str())
                || (self.language == Language::English && is_english_clitic(token));
            if !suppress_space && !attach_left {
                out.push(' ');
            }
            out.push_str(token);
            suppress_space = ATTACH_RIGHT.contains(&token.as_str());
        }
        out
    }
}

fn is_english_clitic(token: &str) -> bool {
    matches!(token, "n't" | "'s" | "'m" | "'re" | "'ve" | "'ll" | "'d")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn no_space_before_sentence_punctuation() {
        let detok = Detokenizer::new(Language::English);
        assert_eq!(
            detok.detokenize(&tokens(&["Out", ",", "damned", "spot", "!"])),
            "Out, damned spot!"
        );
    }

    #[test]
    fn brackets_hug_their_content() {
        let detok = Detokenizer::new(Language::Generic);
        assert_eq!(
            detok.detokenize(&tokens(&["a", "(", "small", ")", "test"])),
            "a (small) test"
        );
    }

    #[test]
    fn english_clitics_reattach() {
        let detok = Detokenizer::new(Language::English);
        assert_eq!(
            detok.detokenize(&tokens(&["It", "'s", "the", "king", "'s"])),
            "It's the king's"
        );
    }

    #[test]
    fn spanish_inverted_punctuation_attaches_forward() {
        let detok = Detokenizer::new(Language::Spanish);
        assert_eq!(
            detok.detokenize(&tokens(&["\u{00bf}", "Qu\u{00e9}", "hora", "es", "?"])),
            "\u{00bf}Qu\u{00e9} hora es?"
        );
    }

    #[test]
    fn detokenize_is_deterministic() {
        let detok = Detokenizer::new(Language::English);
        let input = tokens(&["The", "dog", "barks", "."]);
        assert_eq!(detok.detokenize(&input), detok.detokenize(&input));
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(Detokenizer::default().detokenize(&[]), "");
    }
}
