//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the vitrine crate.
#[derive(Debug)]
pub enum VitrineError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// An environment map, background image or model failed to load.
    ///
    /// Non-fatal: the scene keeps whatever it showed before.
    AssetLoad {
        /// Path of the asset that failed.
        path: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// A page fragment could not be fetched.
    ///
    /// Non-fatal: the page container keeps its previous content.
    FragmentFetch {
        /// URL or path that was requested.
        url: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// WGSL composition failure.
    Shader(String),
    /// A render pass was wired to an input that does not precede it.
    RenderChain(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl VitrineError {
    /// Build an [`AssetLoad`](Self::AssetLoad) error from any displayable
    /// reason.
    pub fn asset(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`FragmentFetch`](Self::FragmentFetch) error from any
    /// displayable reason.
    pub fn fetch(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::FragmentFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for VitrineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::AssetLoad { path, reason } => {
                write!(f, "failed to load asset '{path}': {reason}")
            }
            Self::FragmentFetch { url, reason } => {
                write!(f, "failed to fetch page '{url}': {reason}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::RenderChain(msg) => write!(f, "render chain error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for VitrineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for VitrineError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for VitrineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_error_names_the_path() {
        let err = VitrineError::asset("textures/bg.png", "no such file");
        assert_eq!(
            err.to_string(),
            "failed to load asset 'textures/bg.png': no such file"
        );
    }

    #[test]
    fn io_error_keeps_its_source() {
        use std::error::Error;
        let err = VitrineError::from(std::io::Error::other("disk"));
        assert!(err.source().is_some());
        assert!(VitrineError::fetch("page1.html", "404").source().is_none());
    }
}
