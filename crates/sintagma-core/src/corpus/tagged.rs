//! # Two-Column Tagged Corpus Adapter
//!
//! Reader for `form<TAB>tag` corpora with blank-line sentence boundaries,
//! and the writer for the tagged output files (one literal `('form', 'tag')`
//! pair per line).

use std::io::BufRead;

use crate::corpus::{Corpus, TaggedWord};
use crate::error::{Result, SintagmaError};

/// Reads a two-column `form<TAB>tag` corpus.
///
/// Blank lines delimit sentences, `#` comment lines are skipped. A line
/// with any other field count is a fatal [`SintagmaError::MalformedRecord`];
/// an unterminated trailing sentence is accepted here (unlike the CoNLL
/// reader) because the format carries no structural annotation that could
/// go out of alignment.
pub fn read_tagged<R: BufRead>(reader: R) -> Result<Corpus> {
    let mut sentences = Vec::new();
    let mut current: Vec<TaggedWord> = Vec::new();
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
        if fields.len() != 2 {
            return Err(SintagmaError::MalformedRecord {
                line: line_no,
                reason: format!("expected 2 tab-separated fields, found {}", fields.len()),
            });
        }
        current.push(TaggedWord::new(fields[0], fields[1]));
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    Ok(Corpus::from_sentences(sentences))
}

/// Writes tagged sentences as one `('form', 'tag')` pair per line.
///
/// This is the output contract of a tagging run: the file is a flat token
/// stream, sentence structure is not preserved. Existing content at the
/// destination is overwritten by the caller opening the file for write.
pub fn write_tagged<W: std::io::Write>(writer: &mut W, sentences: &[Vec<TaggedWord>]) -> Result<()> {
    for sentence in sentences {
        for word in sentence {
            writeln!(writer, "{word}")?;
        }
    }
    Ok(())
}
