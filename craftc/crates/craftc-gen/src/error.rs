//! Code generation errors.
//!
//! Everything here aborts the compile: there is no recovery and no
//! multi-error batching. Files already written stay on disk and are
//! undefined outputs.

use thiserror::Error;

use craftc_util::VarType;

#[derive(Debug, Error)]
pub enum CompileError {
    /// A name was read before any assignment bound it.
    #[error("'{0}' is not defined")]
    Undefined(String),

    /// A parameter or return type annotation outside the fixed type table.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// A call to a function not defined in this file.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("wrong number of arguments for '{function}': expected {expected}, found {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot apply '{operator}' to {left} and {right}")]
    BinaryTypeMismatch {
        operator: String,
        left: VarType,
        right: VarType,
    },

    #[error("cannot apply '{operator}' to {operand}")]
    UnaryTypeMismatch { operator: String, operand: VarType },

    /// `index` is 1-based.
    #[error("argument {index} of '{function}' expects {expected}, found {found}")]
    ArgumentTypeMismatch {
        function: String,
        index: usize,
        expected: VarType,
        found: VarType,
    },

    #[error("return type mismatch: expected {expected}, found {found}")]
    ReturnTypeMismatch { expected: VarType, found: VarType },

    #[error("condition must be boolean, found {0}")]
    ConditionNotBoolean(VarType),

    /// A variable of type void used as a value.
    #[error("cannot use a value of type void")]
    VoidValue,

    #[error("function '{0}' returns void and cannot be used in an expression")]
    VoidCallExpression(String),

    #[error("by-reference argument must be a variable name")]
    ByRefNotIdentifier,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
