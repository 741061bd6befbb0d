//! Error taxonomy for every export path.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// Missing canvas, zero-sized canvas, no 2-D context, bad parameters.
    #[error("Export precondition failed: {message}")]
    Precondition { message: String },

    /// The canvas holds cross-origin content; no retry can fix this.
    #[error("Export blocked for security reasons: {message}")]
    Security { message: String },

    #[error("Clipboard is not supported in this environment")]
    ClipboardUnsupported,

    #[error("Permission to write to the clipboard was denied")]
    ClipboardPermissionDenied,

    #[error("Clipboard write failed: {message}")]
    Clipboard { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Another export is already in progress")]
    Busy,
}

impl ExportError {
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        Self::Precondition { message: message.into() }
    }

    pub fn security<S: Into<String>>(message: S) -> Self {
        Self::Security { message: message.into() }
    }

    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into() }
    }

    pub fn clipboard<S: Into<String>>(message: S) -> Self {
        Self::Clipboard { message: message.into() }
    }

    pub fn is_security(&self) -> bool {
        matches!(self, Self::Security { .. })
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        Self::serialization(err.to_string())
    }
}
