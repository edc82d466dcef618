//! # Word and Sentence Tokenizer
//!
//! Splits raw narrative text into sentences and word tokens for tagging.
//! Punctuation is split off as its own token and never dropped, so the
//! token stream stays alignable against tagged references.

/// Characters that end a sentence.
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Punctuation split off from adjacent word characters.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\u{201c}', '\u{201d}',
    '\u{2018}', '\u{2019}', '\u{00bf}', '\u{00a1}', '%', '&',
];

/// English clitic suffixes separated into their own tokens, longest first.
const CLITICS: &[&str] = &["n't", "'ll", "'ve", "'re", "'s", "'m", "'d"];

/// Tokenizer for raw UTF-8 narrative text.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer instance.
    pub fn new() -> Self {
        Self
    }

    /// Split text into word tokens.
    ///
    /// Whitespace separates tokens; leading and trailing punctuation is
    /// emitted as separate tokens; clitics such as `n't` and `'s` are
    /// detached from their host word.
    ///
    /// # Examples
    /// ```
    /// use sintagma_core::tokenize::Tokenizer;
    ///
    /// let tokens = Tokenizer::new().word_tokenize("The dog didn't bark.");
    /// assert_eq!(tokens, vec!["The", "dog", "did", "n't", "bark", "."]);
    /// ```
    pub fn word_tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            self.split_chunk(chunk, &mut tokens);
        }
        tokens
    }

    /// Split text into sentences of word tokens.
    ///
    /// A sentence ends at `.`, `!` or `?` followed by whitespace or end of
    /// input. A run of terminator tokens (an ellipsis, `?!`) forms a single
    /// boundary at its last token. Terminators stay inside their sentence.
    pub fn sent_tokenize(&self, text: &str) -> Vec<Vec<String>> {
        let mut sentences = Vec::new();
        let mut current = Vec::new();
        let mut tokens = self.word_tokenize(text).into_iter().peekable();
        while let Some(token) = tokens.next() {
            let is_terminator = is_terminator_token(&token);
            current.push(token);
            if is_terminator && !tokens.peek().is_some_and(|t| is_terminator_token(t)) {
                sentences.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            sentences.push(current);
        }
        sentences
    }

    fn split_chunk(&self, chunk: &str, tokens: &mut Vec<String>) {
        // Peel leading punctuation.
        let mut rest = chunk;
        while let Some(c) = rest.chars().next() {
            if PUNCTUATION.contains(&c) {
                tokens.push(c.to_string());
                rest = &rest[c.len_utf8()..];
            } else {
                break;
            }
        }

        // Peel trailing punctuation, collected in reverse.
        let mut trailing = Vec::new();
        while let Some(c) = rest.chars().next_back() {
            if PUNCTUATION.contains(&c) {
                trailing.push(c.to_string());
                rest = &rest[..rest.len() - c.len_utf8()];
            } else {
                break;
            }
        }

        if !rest.is_empty() {
            let lower = rest.to_lowercase();
            let clitic = CLITICS.iter().find(|suffix| {
                lower.ends_with(*suffix) && lower.len() > suffix.len()
            });
            match clitic {
                Some(suffix) => {
                    let cut = rest.len() - suffix.len();
                    tokens.push(rest[..cut].to_string());
                    tokens.push(rest[cut..].to_string());
                }
                None => tokens.push(rest.to_string()),
            }
        }

        tokens.extend(trailing.into_iter().rev());
    }
}

fn is_terminator_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| SENTENCE_TERMINATORS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_trailing_punctuation() {
        let tokens = Tokenizer::new().word_tokenize("Out, damned spot!");
        assert_eq!(tokens, vec!["Out", ",", "damned", "spot", "!"]);
    }

    #[test]
    fn splits_clitics() {
        let tokens = Tokenizer::new().word_tokenize("It's Macbeth's dagger");
        assert_eq!(tokens, vec!["It", "'s", "Macbeth", "'s", "dagger"]);
    }

    #[test]
    fn keeps_bare_punctuation_tokens() {
        let tokens = Tokenizer::new().word_tokenize("( so ) ...");
        assert_eq!(tokens, vec!["(", "so", ")", ".", ".", "."]);
    }

    #[test]
    fn sentence_split_on_terminators() {
        let sentences = Tokenizer::new().sent_tokenize("I come. Follow me!");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], vec!["I", "come", "."]);
        assert_eq!(sentences[1], vec!["Follow", "me", "!"]);
    }

    #[test]
    fn ellipsis_is_a_single_sentence_boundary() {
        let sentences = Tokenizer::new().sent_tokenize("Wait... go on.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], vec!["Wait", ".", ".", "."]);
        assert_eq!(sentences[1], vec!["go", "on", "."]);
    }

    #[test]
    fn mixed_terminator_run_does_not_split() {
        let sentences = Tokenizer::new().sent_tokenize("What?! Really?");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], vec!["What", "?", "!"]);
    }

    #[test]
    fn trailing_text_without_terminator_is_a_sentence() {
        let sentences = Tokenizer::new().sent_tokenize("no terminator here");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(Tokenizer::new().word_tokenize("").is_empty());
        assert!(Tokenizer::new().sent_tokenize("   ").is_empty());
    }
}
