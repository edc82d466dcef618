//! # CoNLL-U Corpus Adapter
//!
//! Reader and writer for the 10-column tab-separated treebank exchange
//! format: one token per line, blank lines delimiting sentences, `#`
//! comment lines skipped, multi-token range markers (ids containing `-`)
//! excluded from the token sequence.
//!
//! Malformed records are fatal. A record with the wrong field count or an
//! input that ends mid-sentence aborts the read instead of silently
//! producing a corpus that is misaligned against its gold counterpart.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, TaggedWord};
use crate::error::{Result, SintagmaError};

/// Number of fields in a CoNLL-U record.
pub const CONLL_FIELDS: usize = 10;

/// One token row of a CoNLL-U sentence.
///
/// All fields are kept verbatim; `_` placeholders are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConllToken {
    /// Token id within the sentence (1-based, as written).
    pub id: String,
    /// Surface form.
    pub form: String,
    /// Lemma.
    pub lemma: String,
    /// Universal part-of-speech tag.
    pub upos: String,
    /// Language-specific part-of-speech tag.
    pub xpos: String,
    /// Morphological features.
    pub feats: String,
    /// Head token id (`0` for the root).
    pub head: String,
    /// Dependency relation to the head.
    pub deprel: String,
    /// Enhanced dependency graph.
    pub deps: String,
    /// Miscellaneous annotations.
    pub misc: String,
}

impl ConllToken {
    fn from_fields(fields: &[&str]) -> Self {
        Self {
            id: fields[0].to_string(),
            form: fields[1].to_string(),
            lemma: fields[2].to_string(),
            upos: fields[3].to_string(),
            xpos: fields[4].to_string(),
            feats: fields[5].to_string(),
            head: fields[6].to_string(),
            deprel: fields[7].to_string(),
            deps: fields[8].to_string(),
            misc: fields[9].to_string(),
        }
    }

    /// Renders the token back to its tab-separated record form.
    pub fn to_record(&self) -> String {
        [
            self.id.as_str(),
            self.form.as_str(),
            self.lemma.as_str(),
            self.upos.as_str(),
            self.xpos.as_str(),
            self.feats.as_str(),
            self.head.as_str(),
            self.deprel.as_str(),
            self.deps.as_str(),
            self.misc.as_str(),
        ]
        .join("\t")
    }
}

/// A sentence of CoNLL tokens.
pub type ConllSentence = Vec<ConllToken>;

/// Reads a CoNLL-U document into sentences of tokens.
///
/// Reading the same source twice yields the same corpus; the reader holds
/// no state across calls.
///
/// # Errors
///
/// * [`SintagmaError::MalformedRecord`] when a non-comment, non-blank line
///   does not hold exactly [`CONLL_FIELDS`] tab-separated fields.
/// * [`SintagmaError::UnexpectedEof`] when the input ends inside an
///   unterminated sentence block.
pub fn read_conll<R: BufRead>(reader: R) -> Result<Vec<ConllSentence>> {
    let mut sentences = Vec::new();
    let mut current: ConllSentence = Vec::new();
    let mut line_no = 0usize;

    for line in reader.lines() {
        let line = line?;
        line_no += 1;

        if line.trim().is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != CONLL_FIELDS {
            return Err(SintagmaError::MalformedRecord {
                line: line_no,
                reason: format!(
                    "expected {} tab-separated fields, found {}",
                    CONLL_FIELDS,
                    fields.len()
                ),
            });
        }

        // Multi-token range markers (e.g. "3-4") cover surface contractions
        // and are not part of the syntactic token sequence.
        if fields[0].contains('-') {
            continue;
        }

        current.push(ConllToken::from_fields(&fields));
    }

    if !current.is_empty() {
        return Err(SintagmaError::UnexpectedEof { line: line_no });
    }

    Ok(sentences)
}

/// Reads a CoNLL-U document and keeps only the surface forms.
///
/// This is the adapter used to feed pretokenized sentences to an annotation
/// pipeline: every token is kept, punctuation included, in original order.
pub fn text_sentences<R: BufRead>(reader: R) -> Result<Vec<Vec<String>>> {
    let sentences = read_conll(reader)?;
    Ok(sentences
        .iter()
        .map(|s| s.iter().map(|t| t.form.clone()).collect())
        .collect())
}

/// Which part-of-speech column of a CoNLL record to read tags from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagColumn {
    /// Universal POS tags (column 4).
    #[default]
    Upos,
    /// Language-specific POS tags (column 5).
    Xpos,
}

/// Reads a CoNLL-U document into a tagged [`Corpus`] for tagger training.
pub fn tagged_corpus<R: BufRead>(reader: R, column: TagColumn) -> Result<Corpus> {
    let sentences = read_conll(reader)?;
    let tagged = sentences
        .iter()
        .map(|s| {
            s.iter()
                .map(|t| {
                    let tag = match column {
                        TagColumn::Upos => &t.upos,
                        TagColumn::Xpos => &t.xpos,
                    };
                    TaggedWord::new(t.form.clone(), tag.clone())
                })
                .collect()
        })
        .collect();
    Ok(Corpus::from_sentences(tagged))
}

/// Writes sentences back to the 10-column format, blank-line delimited.
pub fn write_conll<W: std::io::Write>(writer: &mut W, sentences: &[ConllSentence]) -> Result<()> {
    for sentence in sentences {
        for token in sentence {
            writeln!(writer, "{}", token.to_record())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_TOKENS: &str =
        "1\tThe\t_\t_\t_\t_\t2\tdet\t_\t_\n2\tdog\t_\t_\t_\t_\t0\troot\t_\t_\n\n";

    #[test]
    fn two_line_document_yields_one_sentence_of_two_tokens() {
        let sentences = text_sentences(Cursor::new(TWO_TOKENS)).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0], vec!["The".to_string(), "dog".to_string()]);
    }

    #[test]
    fn read_is_idempotent() {
        let first = read_conll(Cursor::new(TWO_TOKENS)).unwrap();
        let second = read_conll(Cursor::new(TWO_TOKENS)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn comments_and_range_markers_are_skipped() {
        let doc = "# sent_id = 1\n\
                   1\tvamonos\t_\t_\t_\t_\t0\troot\t_\t_\n\
                   2-3\tdel\t_\t_\t_\t_\t_\t_\t_\t_\n\
                   2\tde\t_\t_\t_\t_\t1\tcase\t_\t_\n\
                   3\tel\t_\t_\t_\t_\t4\tdet\t_\t_\n\
                   4\tbar\t_\t_\t_\t_\t1\tobl\t_\t_\n\n";
        let sentences = read_conll(Cursor::new(doc)).unwrap();
        assert_eq!(sentences.len(), 1);
        let forms: Vec<&str> = sentences[0].iter().map(|t| t.form.as_str()).collect();
        assert_eq!(forms, vec!["vamonos", "de", "el", "bar"]);
    }

    #[test]
    fn wrong_field_count_is_fatal() {
        let doc = "1\tThe\t_\n";
        let err = read_conll(Cursor::new(doc)).unwrap_err();
        match err {
            SintagmaError::MalformedRecord { line, ref reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("found 3"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn eof_mid_sentence_is_fatal() {
        let doc = "1\tThe\t_\t_\t_\t_\t2\tdet\t_\t_";
        let err = read_conll(Cursor::new(doc)).unwrap_err();
        assert!(matches!(err, SintagmaError::UnexpectedEof { line: 1 }));
    }

    #[test]
    fn tagged_corpus_reads_requested_column() {
        let doc = "1\tdog\t_\tNOUN\tNN\t_\t0\troot\t_\t_\n\n";
        let upos = tagged_corpus(Cursor::new(doc), TagColumn::Upos).unwrap();
        assert_eq!(upos.sentences()[0][0].tag, "NOUN");
        let xpos = tagged_corpus(Cursor::new(doc), TagColumn::Xpos).unwrap();
        assert_eq!(xpos.sentences()[0][0].tag, "NN");
    }

    #[test]
    fn write_then_read_round_trips() {
        let sentences = read_conll(Cursor::new(TWO_TOKENS)).unwrap();
        let mut out = Vec::new();
        write_conll(&mut out, &sentences).unwrap();
        let back = read_conll(Cursor::new(out)).unwrap();
        assert_eq!(sentences, back);
    }
}
