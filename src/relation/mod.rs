//! Affine relations and their dimension algebra.
//!
//! A [`Relation`] is one constraint matrix with a strict column layout; a
//! [`RelationUnion`] is an ordered disjunction of relations that agree on
//! their dimensions.

pub mod convex;
pub mod dim;
pub mod kind;
pub mod union;

pub use convex::Relation;
pub use dim::{ColumnRole, DimClass, DimKind, DimTag, RowClass};
pub use kind::RelationKind;
pub use union::RelationUnion;
