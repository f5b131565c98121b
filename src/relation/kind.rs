//! Relation types and their keywords in the exchange format.

use serde::{Serialize, Deserialize};
use std::fmt;

/// What a relation describes. Informs interpretation, not the algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Type not specified
    Undefined,
    /// Constraints on the parameters of a program
    Context,
    /// Iteration domain of a statement
    Domain,
    /// Scheduling function of a statement
    Scattering,
    /// Read access
    Read,
    /// Write access
    Write,
    /// Possible write access
    MayWrite,
}

impl RelationKind {
    /// All relation kinds.
    pub const ALL: [RelationKind; 7] = [
        RelationKind::Undefined,
        RelationKind::Context,
        RelationKind::Domain,
        RelationKind::Scattering,
        RelationKind::Read,
        RelationKind::Write,
        RelationKind::MayWrite,
    ];

    /// Keyword introducing a relation of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            RelationKind::Undefined => "UNDEFINED",
            RelationKind::Context => "CONTEXT",
            RelationKind::Domain => "DOMAIN",
            RelationKind::Scattering => "SCATTERING",
            RelationKind::Read => "READ",
            RelationKind::Write => "WRITE",
            RelationKind::MayWrite => "MAY_WRITE",
        }
    }

    /// Resolve a keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.keyword() == keyword)
    }

    /// Whether this is a memory access relation.
    pub fn is_access(self) -> bool {
        matches!(self, RelationKind::Read | RelationKind::Write | RelationKind::MayWrite)
    }

    /// Whether this access may modify memory.
    pub fn is_write(self) -> bool {
        matches!(self, RelationKind::Write | RelationKind::MayWrite)
    }

    /// Section title used in printed comments.
    pub fn title(self) -> &'static str {
        match self {
            RelationKind::Undefined => "Relation",
            RelationKind::Context => "Context",
            RelationKind::Domain => "Domain",
            RelationKind::Scattering => "Scattering",
            RelationKind::Read | RelationKind::Write | RelationKind::MayWrite => "Access",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
