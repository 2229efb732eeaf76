//! Text extraction from uploaded résumé files.
//!
//! Dispatch is on the client-declared MIME type, by exact or substring match.
//! There is no magic-byte sniffing: browsers and upload layers routinely report
//! DOCX as `application/zip`, and that must still be accepted.

use std::fmt;
use std::path::Path;

use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use thiserror::Error;
use tracing::{debug, error};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("PDF"),
            DocumentKind::Docx => f.write_str("DOCX"),
            DocumentKind::PlainText => f.write_str("text file"),
        }
    }
}

impl DocumentKind {
    /// Maps a declared MIME type (parameters ignored) to a supported kind.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime = mime_type.split(';').next().unwrap_or_default().trim();

        if mime == "application/pdf" || mime == "pdf" {
            Some(DocumentKind::Pdf)
        } else if mime == DOCX_MIME
            || mime == "application/zip"
            || mime.contains("wordprocessingml")
            || mime.contains("docx")
        {
            Some(DocumentKind::Docx)
        } else if mime == "text/plain" || mime == "txt" {
            Some(DocumentKind::PlainText)
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {mime_type}. Supported types: PDF, DOCX, TXT")]
    UnsupportedFormat { mime_type: String },

    #[error("Failed to parse {kind}: {reason}")]
    Failed { kind: DocumentKind, reason: String },

    /// The file parsed but held no text, e.g. a scanned PDF.
    #[error("No text could be extracted from the uploaded file")]
    NoText,
}

impl ExtractError {
    fn failed(kind: DocumentKind, reason: impl fmt::Display) -> Self {
        ExtractError::Failed {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Extracts plain text from the file at `path`, dispatching on `mime_type`.
///
/// Blocking: callers on the async runtime go through [`extract_text_blocking`].
pub fn extract_text(path: &Path, mime_type: &str) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_mime(mime_type).ok_or_else(|| {
        error!("Unsupported mimetype: {mime_type}");
        ExtractError::UnsupportedFormat {
            mime_type: mime_type.to_string(),
        }
    })?;

    debug!("Extracting {} from {:?} (declared {})", kind, path, mime_type);

    let result = match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text(path).map_err(|e| ExtractError::failed(kind, e))
        }
        DocumentKind::Docx => extract_docx(path),
        DocumentKind::PlainText => std::fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|e| ExtractError::failed(kind, e)),
    };

    if let Err(e) = &result {
        error!("Extraction failed for {:?}: {e}", path);
    }
    result
}

/// Runs [`extract_text`] on the blocking pool. A panic inside a decoder is
/// reported as an extraction failure rather than tearing down the request task.
pub async fn extract_text_blocking(
    path: std::path::PathBuf,
    mime_type: String,
) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_mime(&mime_type);
    tokio::task::spawn_blocking(move || extract_text(&path, &mime_type))
        .await
        .unwrap_or_else(|join_err| {
            Err(ExtractError::failed(
                kind.unwrap_or(DocumentKind::PlainText),
                format!("decoder aborted: {join_err}"),
            ))
        })
}

fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let kind = DocumentKind::Docx;
    let bytes = std::fs::read(path).map_err(|e| ExtractError::failed(kind, e))?;
    let docx = read_docx(&bytes).map_err(|e| ExtractError::failed(kind, e))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => push_table(table, &mut paragraphs),
            _ => {}
        }
    }
    Ok(paragraphs.join("\n\n"))
}

/// Table cells are read row by row, one paragraph at a time.
fn push_table(table: &Table, paragraphs: &mut Vec<String>) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                if let TableCellContent::Paragraph(paragraph) = content {
                    paragraphs.push(paragraph_text(paragraph));
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&paragraph.children, &mut text);
    text
}

fn push_paragraph_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, text),
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
