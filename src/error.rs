//! Error taxonomy for the causal-identification engine.

use thiserror::Error;

/// Errors the core distinguishes.
///
/// Identification *failure* (a hedge witness) is not an error: it is a valid,
/// distinguished outcome of [`crate::search::identify`] and is represented by
/// [`crate::derivation::Outcome::NotIdentifiable`], not by this type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentifyError {
    /// A variable name violated the naming rule (non-empty, no whitespace,
    /// none of `[]*;,()/`).
    #[error("invalid variable name '{name}': {reason}")]
    InvalidVariableName { name: String, reason: String },

    /// A structural equation's outcome also appears among its own parents.
    #[error("variable '{0}' cannot be its own parent")]
    SelfReferentialEquation(String),

    /// A variable occurred as the outcome of more than one structural equation.
    #[error("variable '{0}' occurs as an outcome in more than one structural equation")]
    DuplicateOutcome(String),

    /// A structural equation mentions a variable outside the graph's declared set.
    #[error("undeclared variable '{0}' appears in a structural equation")]
    UndeclaredVariable(String),

    /// The structural equations imply a cycle.
    #[error("variable '{0}' appears in a cycle")]
    Cyclic(String),

    /// A `P(Y, do, Z)` atom was constructed with overlapping Y/do/Z, or empty Y.
    #[error("malformed probability atom: {0}")]
    MalformedAtom(String),

    /// A marginalization's margins were not a subset of the expression's free variables.
    #[error("marginalization margins {0:?} are not free variables of the expression")]
    MarginsNotFree(Vec<String>),

    /// Graph or expression text failed to parse.
    #[error("parse error at {position}: {message}")]
    ParseError { position: usize, message: String },
}

pub type Result<T> = std::result::Result<T, IdentifyError>;
