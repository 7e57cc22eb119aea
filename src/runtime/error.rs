use thiserror::Error;

use crate::bytecode::LoweringError;

/// Failure while evaluating. All variants except `Internal` and `Lowering`
/// are ordinary language-level errors: they unwind to the caller and are
/// never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("could not find function \"{name}\"")]
    UnresolvedFunction { name: String },
    #[error("attempt to apply non-function in `{call}`")]
    NotCallable { call: String },
    #[error("{detail} in `{call}`")]
    ArgumentCountMismatch { call: String, detail: String },
    #[error("{context}: expected {expected}, got {found}")]
    ArgumentTypeMismatch {
        context: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("object '{name}' not found")]
    UnboundVariable { name: String },
    #[error("promise already under evaluation: recursive default argument reference or earlier problems?")]
    PromiseRecursion,
    #[error("evaluation nested too deeply: infinite recursion? (limit {limit})")]
    DepthExceeded { limit: usize },
    #[error("error in {function}: {message}")]
    Primitive { function: String, message: String },
    #[error(transparent)]
    Lowering(#[from] LoweringError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl EvalError {
    pub fn code(&self) -> &'static str {
        match self {
            EvalError::ArgumentCountMismatch { .. } => "E1000",
            EvalError::NotCallable { .. } => "E1001",
            EvalError::UnresolvedFunction { .. } => "E1002",
            EvalError::UnboundVariable { .. } => "E1003",
            EvalError::ArgumentTypeMismatch { .. } => "E1004",
            EvalError::PromiseRecursion => "E1005",
            EvalError::DepthExceeded { .. } => "E1006",
            EvalError::Primitive { .. } => "E1007",
            EvalError::Lowering(err) => err.code(),
            EvalError::Internal(_) => "E1099",
        }
    }

    pub(crate) fn primitive(function: &str, message: impl Into<String>) -> Self {
        EvalError::Primitive {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        EvalError::ArgumentTypeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}
