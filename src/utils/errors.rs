//! Error types for the SCoP interchange library.
//!
//! Errors are organized by the family that produces them: configuration of
//! the numeric layer, violated relation invariants, and malformed text. Every
//! library entry point returns [`ScopResult`]; nothing in the library exits the
//! process.

use thiserror::Error;
use std::fmt;

/// Top-level error type for the library.
#[derive(Error, Debug)]
pub enum ScopError {
    /// Unknown or frozen precision selection
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Out-of-range index, protected column, precision mismatch, overflow...
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantError),

    /// Malformed textual input
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScopError {
    /// The configuration error kind, if this is a configuration error.
    pub fn config_kind(&self) -> Option<ConfigErrorKind> {
        match self {
            ScopError::Config(e) => Some(e.kind),
            _ => None,
        }
    }

    /// The invariant error kind, if this is an invariant violation.
    pub fn invariant_kind(&self) -> Option<InvariantErrorKind> {
        match self {
            ScopError::Invariant(e) => Some(e.kind),
            _ => None,
        }
    }

    /// The format error kind, if this is a format error.
    pub fn format_kind(&self) -> Option<FormatErrorKind> {
        match self {
            ScopError::Format(e) => Some(e.kind),
            _ => None,
        }
    }
}

/// Error in the configuration of the numeric layer.
#[derive(Error, Debug, Clone)]
pub struct ConfigError {
    /// The error message
    pub message: String,
    /// The kind of configuration error
    pub kind: ConfigErrorKind,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self { message: message.into(), kind }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// Precision code or name not recognized
    UnknownPrecision,
    /// Default precision changed after relations were built from it
    PrecisionFrozen,
}

/// A violated relation or coefficient invariant.
#[derive(Error, Debug, Clone)]
pub struct InvariantError {
    /// The error message
    pub message: String,
    /// The kind of invariant violation
    pub kind: InvariantErrorKind,
}

impl InvariantError {
    pub fn new(kind: InvariantErrorKind, message: impl Into<String>) -> Self {
        Self { message: message.into(), kind }
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantErrorKind {
    /// Row index outside `[0, nb_rows)`
    RowOutOfRange,
    /// Column index outside `[0, nb_columns)`
    ColumnOutOfRange,
    /// Index outside a dimension class (or the class is empty)
    DimOutOfRange,
    /// Attempt to remove the eq/ineq tag or the constant column
    ProtectedColumn,
    /// Disjuncts or operands with incompatible dimension counts
    DimensionMismatch,
    /// Operands of different precisions
    PrecisionMismatch,
    /// Fixed-width arithmetic overflow
    Overflow,
    /// Division without an integral quotient
    InexactDivision,
    /// Row with the wrong number of cells
    RowLength,
    /// Two scattering disjuncts share the same beta vector
    DuplicateBeta,
}

/// Error while reading the textual exchange format.
#[derive(Error, Debug, Clone)]
pub struct FormatError {
    /// The error message
    pub message: String,
    /// The kind of format error
    pub kind: FormatErrorKind,
    /// 1-based line of the offending content (if known)
    pub line: Option<usize>,
    /// The offending content
    pub found: Option<String>,
}

impl FormatError {
    pub fn new(kind: FormatErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            line: None,
            found: None,
        }
    }

    /// Attach the line number of the offending content.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach the offending content.
    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        if let Some(ref found) = self.found {
            write!(f, " (found: {:?})", found)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// Header line without 2 or 6 integers
    MalformedHeader,
    /// Union count below 1
    BadUnionCount,
    /// Input ended inside a matrix body
    TruncatedBody,
    /// Row with too many coefficients
    MalformedRow,
    /// Token that is not a valid numeral for the precision
    MalformedNumber,
    /// Relation type keyword not recognized
    UnknownRelationKind,
    /// `<mark>` without its closing `</mark>`
    UnterminatedExtension,
    /// Legacy matrix header read without a parameter count
    MissingParameterHint,
    /// Content that does not fit the expected section
    UnexpectedContent,
    /// Input ended where more content was required
    UnexpectedEof,
}

/// Result type using ScopError.
pub type ScopResult<T> = Result<T, ScopError>;

/// Shorthand for an invariant error wrapped as a `ScopError`.
pub(crate) fn invariant(kind: InvariantErrorKind, message: impl Into<String>) -> ScopError {
    InvariantError::new(kind, message).into()
}
