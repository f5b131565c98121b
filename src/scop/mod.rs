//! Programs and statements.
//!
//! A [`Scop`] is one static control part:
//! - a context constraining the parameters
//! - optional parameter names
//! - statements, each with a domain, an optional scattering and accesses
//! - extensions at every level

use crate::extension::{Body, ExtensionList, ScatNames};
use crate::relation::{Relation, RelationKind, RelationUnion};
use crate::utils::context;
use crate::utils::errors::{invariant, InvariantErrorKind, ScopError, ScopResult};
use serde::{Serialize, Deserialize};

/// A unique identifier for statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StmtId(pub u64);

impl StmtId {
    pub fn new(id: u64) -> Self { Self(id) }

    /// A fresh process-wide id.
    pub fn fresh() -> Self { Self(context::fresh_id()) }
}

impl std::fmt::Display for StmtId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// A complete SCoP.
#[derive(Debug, Clone)]
pub struct Scop {
    /// Target language of the statement bodies (e.g. "C")
    pub language: String,
    /// Constraints on the parameters
    pub context: RelationUnion,
    /// Parameter names (empty if not provided)
    pub parameters: Vec<String>,
    /// Statements in textual order
    pub statements: Vec<Statement>,
    /// Program-level extensions
    pub extensions: ExtensionList,
}

impl Scop {
    pub fn new(language: impl Into<String>, context: RelationUnion) -> Self {
        Self {
            language: language.into(),
            context,
            parameters: Vec::new(),
            statements: Vec::new(),
            extensions: ExtensionList::new(),
        }
    }

    pub fn nb_parameters(&self) -> usize {
        self.context.nb_parameters()
    }

    /// Get a statement by ID.
    pub fn get_stmt(&self, id: StmtId) -> Option<&Statement> {
        self.statements.iter().find(|s| s.id == id)
    }

    /// Get a mutable statement by ID.
    pub fn get_stmt_mut(&mut self, id: StmtId) -> Option<&mut Statement> {
        self.statements.iter_mut().find(|s| s.id == id)
    }

    /// Scattering dimension names from the `scatnames` extension.
    pub fn scatnames(&self) -> Option<&[String]> {
        self.extensions.get::<ScatNames>().map(ScatNames::names)
    }

    /// Every scattering part as `(statement index, part index, relation)`.
    pub fn scattering_parts(&self) -> impl Iterator<Item = (usize, usize, &Relation)> + '_ {
        self.statements.iter().enumerate().flat_map(|(s, stmt)| {
            stmt.scattering
                .iter()
                .flat_map(|union| union.iter().enumerate())
                .map(move |(p, rel)| (s, p, rel))
        })
    }

    /// Structural equality of two programs (ids are ignored).
    pub fn equal(&self, other: &Scop) -> ScopResult<bool> {
        if self.language != other.language
            || self.parameters != other.parameters
            || self.statements.len() != other.statements.len()
            || !self.extensions.equal(&other.extensions)
            || !self.context.equal(&other.context)?
        {
            return Ok(false);
        }
        for (a, b) in self.statements.iter().zip(&other.statements) {
            if !a.equal(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Check that every relation agrees with the context and its statement.
    pub fn integrity_check(&self) -> ScopResult<()> {
        check_union("context", &self.context, &[RelationKind::Context, RelationKind::Undefined])?;
        if self.context.nb_output_dims() != 0 || self.context.nb_input_dims() != 0 {
            return Err(mismatch("context must only constrain parameters"));
        }
        let nb_parameters = self.nb_parameters();
        if !self.parameters.is_empty() && self.parameters.len() != nb_parameters {
            return Err(mismatch(format!(
                "{} parameter names for {} parameters",
                self.parameters.len(),
                nb_parameters
            )));
        }
        for (index, stmt) in self.statements.iter().enumerate() {
            stmt.integrity_check(nb_parameters).map_err(|e| match e {
                ScopError::Invariant(mut err) => {
                    err.message = format!("statement {}: {}", index + 1, err.message);
                    err.into()
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

fn mismatch(message: impl Into<String>) -> ScopError {
    invariant(InvariantErrorKind::DimensionMismatch, message)
}

fn check_union(what: &str, union: &RelationUnion, kinds: &[RelationKind]) -> ScopResult<()> {
    let kind = union
        .kind()
        .ok_or_else(|| mismatch(format!("{} has no part", what)))?;
    if !kinds.contains(&kind) {
        return Err(mismatch(format!("{} has type {}", what, kind)));
    }
    union.check_consistency()
}

/// A statement of a SCoP.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Unique identifier
    pub id: StmtId,
    /// Iteration domain
    pub domain: RelationUnion,
    /// Scheduling function
    pub scattering: Option<RelationUnion>,
    /// Memory accesses in textual order
    pub accesses: Vec<RelationUnion>,
    /// Statement-level extensions
    pub extensions: ExtensionList,
}

impl Statement {
    pub fn new(domain: RelationUnion) -> Self {
        Self {
            id: StmtId::fresh(),
            domain,
            scattering: None,
            accesses: Vec::new(),
            extensions: ExtensionList::new(),
        }
    }

    pub fn with_scattering(mut self, scattering: RelationUnion) -> Self {
        self.scattering = Some(scattering);
        self
    }

    pub fn with_access(mut self, access: RelationUnion) -> Self {
        self.accesses.push(access);
        self
    }

    /// Get the dimensionality of the iteration space.
    pub fn depth(&self) -> usize {
        self.domain.nb_output_dims()
    }

    /// Number of relations printed for this statement.
    pub fn nb_relations(&self) -> usize {
        1 + usize::from(self.scattering.is_some()) + self.accesses.len()
    }

    /// Read accesses.
    pub fn reads(&self) -> impl Iterator<Item = &RelationUnion> {
        self.accesses
            .iter()
            .filter(|a| a.kind() == Some(RelationKind::Read))
    }

    /// Write and may-write accesses.
    pub fn writes(&self) -> impl Iterator<Item = &RelationUnion> {
        self.accesses
            .iter()
            .filter(|a| a.kind().map_or(false, RelationKind::is_write))
    }

    /// Original iterator names from the `body` extension.
    pub fn iterators(&self) -> Option<&[String]> {
        self.extensions.get::<Body>().map(Body::iterators)
    }

    /// Structural equality (ids are ignored).
    pub fn equal(&self, other: &Statement) -> ScopResult<bool> {
        if self.accesses.len() != other.accesses.len()
            || !self.extensions.equal(&other.extensions)
            || !self.domain.equal(&other.domain)?
        {
            return Ok(false);
        }
        match (&self.scattering, &other.scattering) {
            (Some(a), Some(b)) => {
                if !a.equal(b)? {
                    return Ok(false);
                }
            }
            (None, None) => {}
            _ => return Ok(false),
        }
        for (a, b) in self.accesses.iter().zip(&other.accesses) {
            if !a.equal(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn integrity_check(&self, nb_parameters: usize) -> ScopResult<()> {
        check_union("domain", &self.domain, &[RelationKind::Domain])?;
        if self.domain.nb_input_dims() != 0 {
            return Err(mismatch("domain has input dimensions"));
        }
        let depth = self.depth();
        let mut related = Vec::new();
        if let Some(scattering) = &self.scattering {
            check_union("scattering", scattering, &[RelationKind::Scattering])?;
            related.push(("scattering", scattering));
        }
        for access in &self.accesses {
            check_union(
                "access",
                access,
                &[RelationKind::Read, RelationKind::Write, RelationKind::MayWrite],
            )?;
            related.push(("access", access));
        }
        if self.domain.nb_parameters() != nb_parameters {
            return Err(mismatch(format!(
                "domain has {} parameters, context has {}",
                self.domain.nb_parameters(),
                nb_parameters
            )));
        }
        for (what, union) in related {
            if union.nb_input_dims() != depth {
                return Err(mismatch(format!(
                    "{} has {} input dimensions, domain has {} iterators",
                    what,
                    union.nb_input_dims(),
                    depth
                )));
            }
            if union.nb_parameters() != nb_parameters {
                return Err(mismatch(format!(
                    "{} has {} parameters, context has {}",
                    what,
                    union.nb_parameters(),
                    nb_parameters
                )));
            }
        }
        if let Some(iterators) = self.iterators() {
            if iterators.len() != depth {
                return Err(mismatch(format!(
                    "body lists {} iterators, domain has {}",
                    iterators.len(),
                    depth
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int::Precision;

    fn relation(kind: RelationKind, out: usize, inp: usize, params: usize) -> Relation {
        Relation::with_precision(kind, Precision::Double, 1, out, inp, 0, params)
    }

    fn small_scop() -> Scop {
        let context = RelationUnion::single(relation(RelationKind::Context, 0, 0, 1));
        let mut scop = Scop::new("C", context);
        scop.parameters = vec!["N".to_string()];
        let stmt = Statement::new(relation(RelationKind::Domain, 1, 0, 1).into())
            .with_scattering(relation(RelationKind::Scattering, 3, 1, 1).into())
            .with_access(relation(RelationKind::Write, 2, 1, 1).into())
            .with_access(relation(RelationKind::Read, 2, 1, 1).into())
            .with_access(relation(RelationKind::MayWrite, 2, 1, 1).into());
        scop.statements.push(stmt);
        scop
    }

    #[test]
    fn test_integrity() {
        let scop = small_scop();
        scop.integrity_check().unwrap();
        assert_eq!(scop.statements[0].nb_relations(), 5);
        assert_eq!(scop.statements[0].reads().count(), 1);
        assert_eq!(scop.statements[0].writes().count(), 2);
        assert_eq!(scop.scattering_parts().count(), 1);
    }

    #[test]
    fn test_integrity_catches_bad_access() {
        let mut scop = small_scop();
        scop.statements[0]
            .accesses
            .push(relation(RelationKind::Read, 2, 2, 1).into());
        let err = scop.integrity_check().unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::DimensionMismatch));
        assert!(err.to_string().contains("statement 1"));
    }

    #[test]
    fn test_parameter_names_must_match() {
        let mut scop = small_scop();
        scop.parameters.push("M".to_string());
        assert!(scop.integrity_check().is_err());
    }

    #[test]
    fn test_equal_ignores_ids() {
        let a = small_scop();
        let b = small_scop();
        assert_ne!(a.statements[0].id, b.statements[0].id);
        assert!(a.equal(&b).unwrap());
        let mut c = small_scop();
        c.language = "Fortran".to_string();
        assert!(!a.equal(&c).unwrap());
    }
}
