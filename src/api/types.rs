use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// MIME type the service expects for every upload.
pub const PDF_MIME: &str = "application/pdf";

/// Fallback display name when the path carries no usable file name.
pub const DEFAULT_DOCUMENT_NAME: &str = "book.pdf";

/// A locally selected file queued for upload.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub name: String,
}

impl DocumentRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());

        Self { path, name }
    }
}

/// Page bounds constraining which part of the document is summarized.
/// `end` of `None` means "through the last page".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

/// Opaque token the service hands back for a submitted document.
/// Also used as the stem of the exported `.txt` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Response body of POST /summarize.
#[derive(Debug, Deserialize)]
pub struct SubmitReceipt {
    pub file_id: String,
}

// Response body of GET /summary/{file_id}. The envelope may echo the id;
// only the text is required.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    #[serde(default)]
    pub file_id: Option<String>,
}

/// Returns true if the leading bytes carry the PDF magic marker.
pub fn looks_like_pdf(head: &[u8]) -> bool {
    head.starts_with(b"%PDF-")
}
