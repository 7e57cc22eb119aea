use thiserror::Error;

/// Compile-time failure. Every variant aborts compilation of the enclosing
/// unit; none is recoverable at the language level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    #[error("internal lowering error: {0}")]
    Invariant(String),
    #[error("`{unit}` needs more than {limit} slots")]
    TooManySlots { unit: String, limit: usize },
    #[error("`{unit}` needs more than {limit} constants")]
    TooManyConstants { unit: String, limit: usize },
    #[error("unknown primitive `{0}`")]
    UnknownPrimitive(String),
    #[error("'...' used in an incorrect context")]
    MisplacedEllipsis,
    #[error("`{call}` forwards '...' more than once")]
    MultipleEllipsis { call: String },
    #[error("`{call}` has {names} argument names for {arguments} arguments")]
    ArgumentNameMismatch {
        call: String,
        names: usize,
        arguments: usize,
    },
    #[error("label {0} is referenced but never bound")]
    UnboundLabel(String),
}

impl LoweringError {
    pub fn code(&self) -> &'static str {
        match self {
            LoweringError::Invariant(_) => "E200",
            LoweringError::TooManySlots { .. } => "E201",
            LoweringError::TooManyConstants { .. } => "E202",
            LoweringError::UnknownPrimitive(_) => "E203",
            LoweringError::MisplacedEllipsis => "E204",
            LoweringError::MultipleEllipsis { .. } => "E205",
            LoweringError::ArgumentNameMismatch { .. } => "E206",
            LoweringError::UnboundLabel(_) => "E207",
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        LoweringError::Invariant(message.into())
    }
}

pub type LoweringResult<T> = Result<T, LoweringError>;
