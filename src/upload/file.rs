//! Selected file handling

use crate::error::{Result, UploadError};
use bytes::Bytes;
use std::fmt;
use std::path::Path;

/// Content type used when none is supplied or detected
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An immutable view of a selected file
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    mime_type: String,
    data: Bytes,
}

impl FileRef {
    /// A file whose content type the host already knows
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime_type
        };

        Self {
            name: name.into(),
            mime_type,
            data: data.into(),
        }
    }

    /// A file whose content type is sniffed from its leading bytes
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let mime_type = infer::get(&data)
            .map(|kind| kind.mime_type())
            .unwrap_or(DEFAULT_MIME_TYPE);
        Self::new(name, mime_type, data)
    }

    /// Reads a file from disk
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(UploadError::invalid_parameter(
                "path",
                format!("File does not exist: {}", path.display()),
            ));
        }

        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Human-readable size, e.g. `1.0 MiB`
    pub fn size_string(&self) -> String {
        bytesize::ByteSize::b(self.size_bytes()).to_string()
    }
}

impl fmt::Debug for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRef")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
