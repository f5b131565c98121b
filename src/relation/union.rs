//! Unions of convex relations.

use super::convex::Relation;
use super::dim::DimClass;
use super::kind::RelationKind;
use crate::utils::errors::{invariant, InvariantErrorKind, ScopResult};

/// Ordered disjunction of relations.
///
/// All parts share kind, precision, output, input and parameter counts; local
/// dimension counts may differ. Mutation through [`RelationUnion::push`] and
/// [`RelationUnion::union`] checks this; code editing parts in place through
/// [`RelationUnion::parts_mut`] can re-validate with
/// [`RelationUnion::check_consistency`].
#[derive(Debug, Clone, Default)]
pub struct RelationUnion {
    parts: Vec<Relation>,
}

impl RelationUnion {
    pub fn new() -> Self {
        Self::default()
    }

    /// A union of one relation.
    pub fn single(relation: Relation) -> Self {
        Self { parts: vec![relation] }
    }

    /// A union of the given parts, checked for consistency.
    pub fn from_parts(parts: Vec<Relation>) -> ScopResult<Self> {
        let union = Self { parts };
        union.check_consistency()?;
        Ok(union)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[Relation] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [Relation] {
        &mut self.parts
    }

    pub fn part(&self, index: usize) -> Option<&Relation> {
        self.parts.get(index)
    }

    pub fn first(&self) -> Option<&Relation> {
        self.parts.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Relation> {
        self.parts.iter()
    }

    pub fn into_parts(self) -> Vec<Relation> {
        self.parts
    }

    /// Kind shared by all parts.
    pub fn kind(&self) -> Option<RelationKind> {
        self.first().map(Relation::kind)
    }

    /// Retype every part.
    pub fn set_kind(&mut self, kind: RelationKind) {
        for part in &mut self.parts {
            part.set_kind(kind);
        }
    }

    /// Shared output count (0 for an empty union).
    pub fn nb_output_dims(&self) -> usize {
        self.first().map_or(0, Relation::nb_output_dims)
    }

    pub fn nb_input_dims(&self) -> usize {
        self.first().map_or(0, Relation::nb_input_dims)
    }

    pub fn nb_parameters(&self) -> usize {
        self.first().map_or(0, Relation::nb_parameters)
    }

    fn check_part(reference: &Relation, part: &Relation, index: usize) -> ScopResult<()> {
        if part.kind() != reference.kind() {
            return Err(invariant(
                InvariantErrorKind::DimensionMismatch,
                format!(
                    "union part {} is {} but part 0 is {}",
                    index,
                    part.kind(),
                    reference.kind()
                ),
            ));
        }
        if part.precision() != reference.precision() {
            return Err(invariant(
                InvariantErrorKind::PrecisionMismatch,
                format!(
                    "union part {} is {} but part 0 is {}",
                    index,
                    part.precision(),
                    reference.precision()
                ),
            ));
        }
        if part.nb_output_dims() != reference.nb_output_dims()
            || part.nb_input_dims() != reference.nb_input_dims()
            || part.nb_parameters() != reference.nb_parameters()
        {
            return Err(invariant(
                InvariantErrorKind::DimensionMismatch,
                format!(
                    "union part {} is {} but part 0 is {}",
                    index,
                    part.layout_string(),
                    reference.layout_string()
                ),
            ));
        }
        Ok(())
    }

    /// Check that all parts agree on kind, precision and non-local counts.
    pub fn check_consistency(&self) -> ScopResult<()> {
        if let Some((reference, rest)) = self.parts.split_first() {
            for (i, part) in rest.iter().enumerate() {
                Self::check_part(reference, part, i + 1)?;
            }
        }
        Ok(())
    }

    /// Append a part.
    pub fn push(&mut self, relation: Relation) -> ScopResult<()> {
        if let Some(reference) = self.first() {
            Self::check_part(reference, &relation, self.parts.len())?;
        }
        self.parts.push(relation);
        Ok(())
    }

    /// Concatenate two unions. Every part of `other` is checked before any is moved.
    pub fn union(mut self, other: RelationUnion) -> ScopResult<RelationUnion> {
        if let Some(reference) = self.first().or_else(|| other.first()) {
            for (i, part) in other.parts.iter().enumerate() {
                Self::check_part(reference, part, self.parts.len() + i)?;
            }
        }
        self.parts.extend(other.parts);
        Ok(self)
    }

    /// Part-wise structural equality.
    pub fn equal(&self, other: &RelationUnion) -> ScopResult<bool> {
        if self.parts.len() != other.parts.len() {
            return Ok(false);
        }
        for (a, b) in self.parts.iter().zip(&other.parts) {
            if !a.equal(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Insert a dimension at the same position in every part.
    ///
    /// Fails without touching any part if `pos` is past the end in one of them.
    pub fn add_dim(&mut self, class: DimClass, pos: usize) -> ScopResult<()> {
        for (i, part) in self.parts.iter().enumerate() {
            let len = part.nb_dims(class);
            if pos > len {
                return Err(invariant(
                    InvariantErrorKind::DimOutOfRange,
                    format!(
                        "cannot insert {} dimension at {} (union part {} has {})",
                        class, pos, i, len
                    ),
                ));
            }
        }
        for part in &mut self.parts {
            part.add_dim(class, pos)?;
        }
        Ok(())
    }

    /// Remove a dimension from every part.
    ///
    /// Fails without touching any part if one of them lacks the dimension.
    pub fn remove_dim(&mut self, class: DimClass, index: usize) -> ScopResult<()> {
        for part in &self.parts {
            part.column_of(class, index)?;
        }
        for part in &mut self.parts {
            part.remove_dim(class, index)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RelationUnion {
    type Item = &'a Relation;
    type IntoIter = std::slice::Iter<'a, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

impl From<Relation> for RelationUnion {
    fn from(relation: Relation) -> Self {
        Self::single(relation)
    }
}
