//! File value objects
//!
//! Only metadata is ever inspected: name, byte size and MIME type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes in one megabyte, as used by size limits
pub const BYTES_PER_MB: u64 = 1_048_576;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Opaque reference to the underlying file (browser handle, path, blob key)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHandle(String);

impl FileHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file offered for upload by selection or drop
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub handle: FileHandle,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            handle: FileHandle::new(name.clone()),
            name,
            size,
            mime_type: mime_type.into(),
        }
    }

    pub fn with_handle(mut self, handle: FileHandle) -> Self {
        self.handle = handle;
        self
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            size: self.size,
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Metadata of a selected file
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    pub fn formatted_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// Transient preview reference (object URL) held while a file is tracked
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreviewRef(String);

impl PreviewRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable size: `0 Bytes`, `1.5 KB`, `10 MB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Icon class name for a MIME type
pub fn file_icon(mime_type: &str) -> &'static str {
    if mime_type.starts_with("image/") {
        "image"
    } else if mime_type == "application/pdf" {
        "file-pdf"
    } else if mime_type.contains("word") {
        "file-word"
    } else if mime_type.contains("excel") || mime_type.contains("spreadsheet") {
        "file-excel"
    } else if mime_type.contains("zip") || mime_type.contains("rar") {
        "file-archive"
    } else {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * BYTES_PER_MB), "10 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn test_file_icon() {
        assert_eq!(file_icon("image/png"), "image");
        assert_eq!(file_icon("application/pdf"), "file-pdf");
        assert_eq!(file_icon("application/msword"), "file-word");
        assert_eq!(
            file_icon("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            "file-excel"
        );
        assert_eq!(file_icon("application/zip"), "file-archive");
        assert_eq!(file_icon("text/plain"), "file");
    }

    #[test]
    fn test_candidate_meta() {
        let candidate = FileCandidate::new("report.pdf", 2048, "application/pdf");
        assert_eq!(candidate.handle.as_str(), "report.pdf");
        assert_eq!(candidate.meta().formatted_size(), "2 KB");
    }
}
