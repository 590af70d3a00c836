use jbm_syntax::SyntaxKind;

/// Why a single node could not be rendered.
///
/// These never escape [`crate::Renderer::render_document`]; the failing node
/// is replaced by a visible error marker and its siblings carry on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderAnomaly {
    #[error("{kind:?} is missing its {expected} delimiter tokens")]
    MissingDelimiters { kind: SyntaxKind, expected: usize },

    #[error("{kind:?} has no {child:?} child")]
    MissingChild { kind: SyntaxKind, child: SyntaxKind },

    #[error("heading level {0} is outside 1..=6")]
    InvalidHeadingLevel(usize),

    #[error("timestamp {0:?} is out of range")]
    InvalidTimestamp(String),

    #[error("highlighting {language} failed: {message}")]
    Highlight { language: String, message: String },
}
