use foundation::ids::{LayerId, SourceId};

/// Construction-time configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpiderError {
    /// The cluster layer is not bound to the clustering source.
    UnsupportedSource {
        layer: LayerId,
        bound: Option<SourceId>,
        expected: SourceId,
    },
    /// A layer that must draw points is a line layer.
    UnsupportedLayer { layer: LayerId, role: &'static str },
}

impl std::fmt::Display for SpiderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpiderError::UnsupportedSource {
                layer,
                bound: Some(bound),
                expected,
            } => write!(
                f,
                "data source on cluster layer {} is not supported: bound to {bound}, expected {expected}",
                layer.0
            ),
            SpiderError::UnsupportedSource {
                layer,
                bound: None,
                expected,
            } => write!(
                f,
                "cluster layer {} has no data source (expected {expected})",
                layer.0
            ),
            SpiderError::UnsupportedLayer { layer, role } => {
                write!(f, "{role} layer {} must be a bubble or symbol layer", layer.0)
            }
        }
    }
}

impl std::error::Error for SpiderError {}

/// Failure reported by a clustering source request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cluster source request failed: {}", self.message)
    }
}

impl std::error::Error for SourceError {}
