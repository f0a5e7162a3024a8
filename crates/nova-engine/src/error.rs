use std::fmt;

/// Recoverable engine errors.
///
/// None of these are fatal: call sites log them as warnings and fall back to a
/// disabled feature or a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum NovaError {
    /// Resize was requested on a camera whose projection is neither
    /// perspective nor orthographic.
    UnsupportedCameraKind { kind: String },

    /// An optional capability (gesture recognizer, VR display, stencil buffer)
    /// is not available at runtime.
    MissingCapability {
        capability: &'static str,
        detail: String,
    },
}

impl NovaError {
    pub(crate) fn missing(capability: &'static str, detail: impl Into<String>) -> Self {
        Self::MissingCapability { capability, detail: detail.into() }
    }
}

impl fmt::Display for NovaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NovaError::UnsupportedCameraKind { kind } => {
                write!(f, "cannot resize camera of kind `{kind}`; only perspective and orthographic cameras are supported")
            }
            NovaError::MissingCapability { capability, detail } => {
                write!(f, "{capability} is not available: {detail}")
            }
        }
    }
}

impl std::error::Error for NovaError {}
