/*!
 * Tests for document text handling and extraction
 */

use anyhow::Result;
use readaloud::document_processor::{DocumentText, cap_words, extract_docx, extract_pdf, split_words};
use readaloud::errors::ExtractionError;
use crate::common;

/// Test word splitting with offsets over mixed whitespace
#[test]
fn test_split_words_withMixedWhitespace_shouldKeepOffsets() {
    let words = split_words("The quick\nbrown\t fox");
    assert_eq!(words.len(), 4);
    assert_eq!(words[0].text, "The");
    assert_eq!(words[0].start, 0);
    assert_eq!(words[0].end, 3);
    assert_eq!(words[1].text, "quick");
    assert_eq!(words[1].start, 4);
    assert_eq!(words[2].text, "brown");
    assert_eq!(words[2].start, 10);
    assert_eq!(words[3].text, "fox");
    assert_eq!(words[3].start, 17);
    assert_eq!(words[3].index, 3);
}

/// Test word splitting of empty and whitespace-only text
#[test]
fn test_split_words_withBlankText_shouldBeEmpty() {
    assert!(split_words("").is_empty());
    assert!(split_words("   \n\t ").is_empty());
}

/// Test document construction from typed text
#[test]
fn test_documentText_fromText_shouldDeriveWordArray() {
    let doc = DocumentText::from_text("one two three");
    assert_eq!(doc.word_count(), 3);
    assert_eq!(doc.text(), "one two three");
    assert!(doc.source_file.is_none());
    assert!(!doc.is_empty());

    let empty = DocumentText::from_text("  ");
    assert!(empty.is_empty());
}

/// Test suffix extraction for restart-from-word
#[test]
fn test_suffix_from_withValidIndex_shouldReturnWordSuffix() {
    let doc = DocumentText::from_text("alpha beta gamma delta");
    assert_eq!(doc.suffix_from(0).unwrap(), "alpha beta gamma delta");
    assert_eq!(doc.suffix_from(2).unwrap(), "gamma delta");
    assert_eq!(doc.suffix_from(3).unwrap(), "delta");
    assert!(doc.suffix_from(4).is_none());
}

/// Test word capping for the utterance limit
#[test]
fn test_cap_words_withLongText_shouldTruncateAtWordBoundary() {
    assert_eq!(cap_words("one two three four", 2), "one two");
    assert_eq!(cap_words("one two three four", 4), "one two three four");
    assert_eq!(cap_words("one two three four", 10), "one two three four");
    assert_eq!(cap_words("", 3), "");

    let doc = DocumentText::from_text("one two three four");
    assert_eq!(doc.prefix_words(3), "one two three");
}

/// Test word capping with multi-byte text
#[test]
fn test_cap_words_withUnicodeText_shouldSliceOnCharBoundaries() {
    let text = "héllo wörld déjà vu";
    assert_eq!(cap_words(text, 2), "héllo wörld");
    let words = split_words(text);
    assert_eq!(words[2].text, "déjà");
}

/// Test PDF extraction walks pages in order and joins with single spaces
#[test]
fn test_extract_pdf_withMultiplePages_shouldJoinPageTexts() -> Result<()> {
    let bytes = common::make_pdf_bytes(&["Hello from page one", "and from page two"])?;
    let text = extract_pdf(&bytes).unwrap();
    assert!(text.starts_with("Hello from page one"));
    assert!(text.contains("and from page two"));
    // Page texts are joined by exactly one space
    assert!(text.contains("one and"));
    Ok(())
}

/// Test PDF extraction of malformed bytes fails with a PDF error
#[test]
fn test_extract_pdf_withGarbageBytes_shouldFail() {
    let result = extract_pdf(b"this is not a pdf at all");
    assert!(matches!(result, Err(ExtractionError::Pdf(_))));
}

/// Test DOCX extraction collects paragraph text
#[test]
fn test_extract_docx_withParagraphs_shouldCollectRawText() -> Result<()> {
    let bytes = common::make_docx_bytes(&["First paragraph.", "Second paragraph."])?;
    let text = extract_docx(&bytes).unwrap();
    assert_eq!(text, "First paragraph.\nSecond paragraph.");
    Ok(())
}

/// Test DOCX extraction of a zip without a document body fails
#[test]
fn test_extract_docx_withMissingBody_shouldFail() {
    // A zip archive with no word/document.xml entry
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("unrelated.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"nothing here").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let result = extract_docx(&bytes);
    assert!(matches!(result, Err(ExtractionError::Docx(_))));
}

/// Test extraction from files of each supported type
#[test]
fn test_extract_from_file_withSupportedTypes_shouldExtractText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let txt = common::create_test_file(&dir, "note.txt", "plain text body")?;
    let doc = DocumentText::extract_from_file(&txt).unwrap();
    assert_eq!(doc.text(), "plain text body");
    assert_eq!(doc.source_file.as_deref(), Some(txt.as_path()));

    let pdf = common::create_test_pdf(&dir, "report.pdf", &["report body text"])?;
    let doc = DocumentText::extract_from_file(&pdf).unwrap();
    assert!(doc.text().contains("report body text"));

    let docx = common::create_test_docx(&dir, "memo.docx", &["memo body text"])?;
    let doc = DocumentText::extract_from_file(&docx).unwrap();
    assert!(doc.text().contains("memo body text"));

    Ok(())
}

/// Test extraction from an unsupported file type is rejected
#[test]
fn test_extract_from_file_withUnsupportedType_shouldReturnUnsupported() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    // Binary content that is neither a known container nor UTF-8 text
    let path = common::create_test_bytes(&dir, "song.mp3", &[0xff, 0xfb, 0x90, 0x00, 0xaa])?;
    let result = DocumentText::extract_from_file(&path);
    assert!(matches!(
        result,
        Err(ExtractionError::UnsupportedType { .. })
    ));
    Ok(())
}
