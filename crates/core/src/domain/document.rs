use std::fmt;
use std::path::Path;

/// File types the upload step advertises. Nothing enforces them.
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Advertised per-file upper bound (10 MB).
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An opaque uploaded file.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("file_name", &self.file_name)
            .field("size", &self.size())
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl Document {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { file_name: file_name.into(), content: content.into(), content_type: None }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Explicit content type, else one guessed from the extension.
    pub fn resolved_content_type(&self) -> &str {
        if let Some(content_type) = self.content_type.as_deref() {
            return content_type;
        }
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            _ => FALLBACK_CONTENT_TYPE,
        }
    }

    pub fn advisories(&self) -> Vec<DocumentAdvisory> {
        let mut advisories = Vec::new();
        let accepted = self
            .extension()
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !accepted {
            advisories.push(DocumentAdvisory::UnsupportedType { file_name: self.file_name.clone() });
        }
        if self.size() > MAX_DOCUMENT_BYTES {
            advisories.push(DocumentAdvisory::TooLarge {
                file_name: self.file_name.clone(),
                size: self.size(),
            });
        }
        advisories
    }
}

/// Upload hints shown next to a document. Informational only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentAdvisory {
    UnsupportedType { file_name: String },
    TooLarge { file_name: String, size: u64 },
}

impl fmt::Display for DocumentAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { file_name } => write!(
                f,
                "{file_name}: supported formats are PDF, DOC, DOCX, JPG, PNG"
            ),
            Self::TooLarge { file_name, size } => write!(
                f,
                "{file_name}: {} exceeds the 10 MB limit",
                format_file_size(*size)
            ),
        }
    }
}

/// Human-readable byte count (`0 Bytes`, `1.5 KB`, `10 MB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let mut rendered = format!("{rounded:.2}");
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }
    format!("{rendered} {}", UNITS[unit])
}
