/*!
 * Error types for the readaloud application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when driving a speech engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error when the engine backend cannot be reached or started
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Error when submitting an utterance to the engine fails
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Error when the requested operation is not supported by the backend
    #[error("Engine does not support {feature}")]
    Unsupported {
        /// Name of the missing capability
        feature: &'static str,
    },

    /// Error when the engine event channel is gone
    #[error("Engine event channel closed")]
    ChannelClosed,
}

/// Errors that can occur during document text extraction
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Error when the file type is not one we can extract text from
    #[error("Unsupported file type: {extension}")]
    UnsupportedType {
        /// Extension or description of the rejected file
        extension: String,
    },

    /// Error while parsing a PDF document
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// Error while parsing a DOCX document
    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    /// Error reading the input file
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a speech engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Error from document extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
