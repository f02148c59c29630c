use anyhow::{Result, Context};
use std::fs;
use std::path::Path;

// @module: File and document type utilities

// PDF header and zip local-file header (DOCX is an OOXML zip container)
const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read a file to raw bytes
    pub fn read_to_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Detect whether a file is a PDF, a DOCX document or plain text
    ///
    /// Checks the extension first, then falls back to magic bytes for files
    /// with a missing or unrecognized extension. Anything that is neither a
    /// known container nor valid UTF-8 text is reported as Unknown.
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        // Check file extension
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            match ext_str.as_str() {
                "pdf" => return Ok(FileType::Pdf),
                "docx" => return Ok(FileType::Docx),
                "txt" | "text" | "md" => return Ok(FileType::PlainText),
                _ => {}
            }
        }

        // Fall back to examining file contents
        let header = Self::read_header(path, 8)?;
        if header.starts_with(PDF_MAGIC) {
            return Ok(FileType::Pdf);
        }
        if header.starts_with(ZIP_MAGIC) {
            // A bare zip is assumed to be an OOXML document; the extractor
            // rejects it later if word/document.xml is missing.
            return Ok(FileType::Docx);
        }

        if fs::read_to_string(path).is_ok() {
            return Ok(FileType::PlainText);
        }

        Ok(FileType::Unknown)
    }

    /// Describe a path's extension for error messages
    pub fn extension_label<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| "<none>".to_string())
    }

    fn read_header(path: &Path, len: usize) -> Result<Vec<u8>> {
        use std::io::Read;
        let mut file = fs::File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        let mut buf = vec![0u8; len];
        let read = file.read(&mut buf)?;
        buf.truncate(read);
        Ok(buf)
    }
}

/// Enum representing different document types
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    /// PDF document
    Pdf,
    /// DOCX (OOXML) document
    Docx,
    /// Plain text file
    PlainText,
    /// Unknown file type
    Unknown,
}
