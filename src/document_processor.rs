use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::errors::ExtractionError;
use crate::file_utils::{FileManager, FileType};

// @module: Document text handling and extraction

// @const: Word token regex (split on whitespace, keep offsets)
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

// @struct: Single whitespace-delimited word with its byte offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    // @field: Position in the word array
    pub index: usize,

    // @field: Byte offset of the first character
    pub start: usize,

    // @field: Byte offset one past the last character
    pub end: usize,

    // @field: The word itself
    pub text: String,
}

/// A document's text together with its derived word array
///
/// The text is a single ordered character sequence, replaced wholesale when a
/// new document is loaded. The word array is the whitespace split of that
/// text, with byte offsets kept so boundary events and suffix restarts can be
/// mapped back onto it.
#[derive(Debug, Clone)]
pub struct DocumentText {
    /// Source file, when the text came from one
    pub source_file: Option<PathBuf>,

    /// The full text
    text: String,

    /// Whitespace-split words with byte offsets
    words: Vec<WordSpan>,
}

impl DocumentText {
    /// Build a document from typed or pasted text
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let words = split_words(&text);
        DocumentText {
            source_file: None,
            text,
            words,
        }
    }

    /// Build a document by extracting text from a file
    ///
    /// Dispatches on the detected file type. Unsupported types are rejected
    /// with `ExtractionError::UnsupportedType` and must leave the caller's
    /// current document untouched.
    pub fn extract_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let file_type = FileManager::detect_file_type(path)
            .map_err(|e| ExtractionError::Io(std::io::Error::other(e.to_string())))?;

        let text = match file_type {
            FileType::Pdf => extract_pdf(&FileManager::read_to_bytes(path).map_err(io_err)?)?,
            FileType::Docx => extract_docx(&FileManager::read_to_bytes(path).map_err(io_err)?)?,
            FileType::PlainText => FileManager::read_to_string(path).map_err(io_err)?,
            FileType::Unknown => {
                return Err(ExtractionError::UnsupportedType {
                    extension: FileManager::extension_label(path),
                });
            }
        };

        debug!("Extracted {} characters from {:?}", text.len(), path);

        let words = split_words(&text);
        Ok(DocumentText {
            source_file: Some(path.to_path_buf()),
            text,
            words,
        })
    }

    /// The full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The whitespace-split word array
    pub fn words(&self) -> &[WordSpan] {
        &self.words
    }

    /// Number of words in the document
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Whether the document holds any speakable content
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The text suffix starting at the given word index
    ///
    /// This is what gets spoken when playback is restarted from a word.
    pub fn suffix_from(&self, word_index: usize) -> Option<&str> {
        self.words
            .get(word_index)
            .map(|span| &self.text[span.start..])
    }

    /// The text prefix covering the first `count` words
    ///
    /// Used by the application layer to cap utterance length; the document
    /// itself is never truncated.
    pub fn prefix_words(&self, count: usize) -> &str {
        cap_words(&self.text, count)
    }
}

/// Cap a text to its first `max_words` whitespace-delimited words
pub fn cap_words(text: &str, max_words: usize) -> &str {
    let words = split_words(text);
    if words.len() <= max_words {
        return text;
    }
    match words.get(max_words) {
        Some(span) => text[..span.start].trim_end(),
        None => text,
    }
}

impl fmt::Display for DocumentText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source_file {
            Some(path) => write!(f, "{:?} ({} words)", path, self.word_count()),
            None => write!(f, "<typed text> ({} words)", self.word_count()),
        }
    }
}

// Fold read failures from the file helpers into the extraction error type
fn io_err(error: anyhow::Error) -> ExtractionError {
    ExtractionError::Io(std::io::Error::other(error.to_string()))
}

/// Split text into whitespace-delimited words, keeping byte offsets
pub fn split_words(text: &str) -> Vec<WordSpan> {
    WORD_REGEX
        .find_iter(text)
        .enumerate()
        .map(|(index, m)| WordSpan {
            index,
            start: m.start(),
            end: m.end(),
            text: m.as_str().to_string(),
        })
        .collect()
}

/// Extract text from a PDF document
///
/// Opens the document and walks its pages sequentially, concatenating each
/// page's extracted text with single spaces.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .map_err(|e| ExtractionError::Pdf(format!("page {}: {}", page_number, e)))?;
        let trimmed = page_text.trim();
        if !trimmed.is_empty() {
            pages.push(trimmed.to_string());
        }
    }

    Ok(pages.join(" "))
}

/// Extract raw text from a DOCX document
///
/// A DOCX file is a zip container; the document body lives in
/// word/document.xml. Text runs (w:t) are collected in order, paragraph ends
/// become newlines. Formatting is discarded.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Docx(format!("missing document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    extract_docx_body(&xml)
}

// Streaming pass over the document XML collecting w:t runs
fn extract_docx_body(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_run = true,
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => out.push(' '),
                b"w:br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_run => {
                let run = e
                    .unescape()
                    .map_err(|err| ExtractionError::Docx(err.to_string()))?;
                out.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractionError::Docx(e.to_string())),
        }
        buf.clear();
    }

    Ok(out.trim().to_string())
}
