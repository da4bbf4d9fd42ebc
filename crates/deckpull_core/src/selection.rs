use std::path::{Path, PathBuf};

use thiserror::Error;

/// The only file type the extraction service accepts. Matched case-sensitively.
pub const ACCEPTED_EXTENSION: &str = ".pptx";

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported file type: {name} (only .pptx files are accepted)")]
    UnsupportedType { name: String },
}

/// Opaque reference to the bytes of a chosen file.
///
/// The core never reads through it; the engine opens it at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle(PathBuf);

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A validated presentation file. Only constructible through [`SelectedFile::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    size_bytes: u64,
    handle: FileHandle,
}

impl SelectedFile {
    /// Validates a picked or dropped file and produces a selection record.
    pub fn select(
        name: impl Into<String>,
        size_bytes: u64,
        handle: FileHandle,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if !name.ends_with(ACCEPTED_EXTENSION) {
            return Err(ValidationError::UnsupportedType { name });
        }
        Ok(Self {
            name,
            size_bytes,
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }

    pub fn size_label(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Human-readable size in binary units, rounded to two decimals with trailing zeros dropped.
///
/// `0` renders as `"0 B"`, `2_097_152` as `"2 MB"`, `1536` as `"1.5 KB"`.
/// Anything past gigabytes stays in `GB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit + 1 < SIZE_UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }
    let scaled = bytes as f64 / divisor as f64;
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}
