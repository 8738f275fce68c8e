//! Bible reference parsing
//!
//! Turns a human-typed reference like "John 3:16" or "1 Corinthians 13:4"
//! into a (book, chapter, verse) triple. Book names are normalized to the
//! stored form ("1 Corinthians" -> "1st Corinthians") so that lookups hit
//! the verse table directly.

use std::fmt;

/// A parsed reference: canonical book name plus chapter and verse numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// Error type for reference parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than two space-separated tokens ("John3:16", "Genesis")
    MalformedReference(String),
    /// Last token does not split into exactly chapter:verse ("John 3")
    MalformedChapterVerse(String),
    /// Chapter or verse token is not a positive integer
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedReference(r) => {
                write!(f, "invalid Bible reference format: {}", r)
            }
            ParseError::MalformedChapterVerse(t) => {
                write!(f, "invalid chapter:verse format: {}", t)
            }
            ParseError::InvalidNumber { field, value } => {
                write!(f, "invalid {} number: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a reference string of the form "Book Chapter:Verse".
///
/// The book name may span multiple tokens ("Song of Solomon 2:1"). Numeral
/// prefixes are normalized: "1" -> "1st", "2" -> "2nd", "3" -> "3rd", first
/// occurrence only, and only when the ordinal form is not already present.
pub fn parse_reference(reference: &str) -> Result<Reference, ParseError> {
    let parts: Vec<&str> = reference.split(' ').collect();
    if parts.len() < 2 {
        return Err(ParseError::MalformedReference(reference.to_string()));
    }

    let book = normalize_book_name(&parts[..parts.len() - 1].join(" "));

    let chapter_verse = parts[parts.len() - 1];
    let cv_parts: Vec<&str> = chapter_verse.split(':').collect();
    if cv_parts.len() != 2 {
        return Err(ParseError::MalformedChapterVerse(chapter_verse.to_string()));
    }

    let chapter = parse_positive(cv_parts[0], "chapter")?;
    let verse = parse_positive(cv_parts[1], "verse")?;

    Ok(Reference {
        book,
        chapter,
        verse,
    })
}

/// Map user shorthand to the stored ordinal form.
///
/// The three checks are independent and evaluated in fixed order; only the
/// first match rewrites, and only the first occurrence of the digit.
fn normalize_book_name(raw: &str) -> String {
    if raw.contains('1') && !raw.contains("1st") {
        raw.replacen('1', "1st", 1)
    } else if raw.contains('2') && !raw.contains("2nd") {
        raw.replacen('2', "2nd", 1)
    } else if raw.contains('3') && !raw.contains("3rd") {
        raw.replacen('3', "3rd", 1)
    } else {
        raw.to_string()
    }
}

fn parse_positive(s: &str, field: &'static str) -> Result<u32, ParseError> {
    match s.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ParseError::InvalidNumber {
            field,
            value: s.to_string(),
        }),
    }
}
