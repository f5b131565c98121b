//! Beta vectors: the scheduling positions of statements.
//!
//! The beta of a scattering relation is the list of values pinned by its beta
//! equations, in row order. A beta prefix ends with [`BetaValue::Wildcard`]
//! and denotes every statement nested under one loop level.

use crate::relation::{DimClass, Relation, RowClass};
use crate::scop::Scop;
use crate::utils::errors::{invariant, InvariantErrorKind, ScopResult};
use log::trace;
use std::fmt;

/// One element of a beta vector or prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetaValue {
    Fixed(i64),
    /// Matches anything, only meaningful as the last element of a prefix
    Wildcard,
}

impl BetaValue {
    pub fn value(&self) -> Option<i64> {
        match self {
            BetaValue::Fixed(v) => Some(*v),
            BetaValue::Wildcard => None,
        }
    }
}

impl From<i64> for BetaValue {
    fn from(value: i64) -> Self {
        BetaValue::Fixed(value)
    }
}

impl fmt::Display for BetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetaValue::Fixed(v) => write!(f, "{}", v),
            BetaValue::Wildcard => write!(f, "*"),
        }
    }
}

pub type Beta = Vec<BetaValue>;

/// Build a beta from plain values.
pub fn beta_from(values: &[i64]) -> Beta {
    values.iter().copied().map(BetaValue::Fixed).collect()
}

/// Render a beta as `[1,2,*]`.
pub fn beta_to_string(beta: &[BetaValue]) -> String {
    let items: Vec<String> = beta.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(","))
}

/// Values pinned by the beta equations of `relation`, in row order.
pub fn extract_beta(relation: &Relation) -> ScopResult<Beta> {
    let mut beta = Vec::new();
    for row in 0..relation.nb_rows() {
        if let RowClass::BetaEquation { dim } = relation.classify_row(row)? {
            let coefficient = relation.get(row, relation.column_of(DimClass::Output, dim)?)?;
            let constant = relation.get(row, relation.constant_column())?;
            // a*c + k == 0 pins c to -k/a
            let value = constant.neg()?.div_exact(coefficient)?;
            let value = value.to_i64().ok_or_else(|| {
                invariant(
                    InvariantErrorKind::Overflow,
                    format!("beta value {} does not fit 64 bits", value),
                )
            })?;
            beta.push(BetaValue::Fixed(value));
        }
    }
    trace!("relation {} has beta {}", relation.id(), beta_to_string(&beta));
    Ok(beta)
}

/// One beta per scattering part, statement by statement.
pub fn extract_betas(scop: &Scop) -> ScopResult<Vec<Beta>> {
    scop.scattering_parts()
        .map(|(_, _, relation)| extract_beta(relation))
        .collect()
}

/// Whether `beta` lives under `prefix`.
pub fn same_beta_prefix(beta: &[BetaValue], prefix: &[BetaValue]) -> bool {
    let Some((BetaValue::Wildcard, fixed)) = prefix.split_last() else {
        return false;
    };
    beta.len() > fixed.len() && beta[..fixed.len()] == *fixed
}

/// Turn a beta into the prefix of its enclosing loop.
pub fn beta_to_prefix(beta: &mut [BetaValue]) {
    if let Some(last) = beta.last_mut() {
        *last = BetaValue::Wildcard;
    }
}

/// A scattering part together with its beta.
#[derive(Debug, Clone)]
pub struct BetaMatch<'a> {
    /// Statement index in the program
    pub statement: usize,
    /// Part index in the statement's scattering union
    pub part: usize,
    pub relation: &'a Relation,
    pub beta: Beta,
}

/// Every scattering part whose beta lives under `prefix`.
pub fn relations_with_prefix<'a>(
    scop: &'a Scop,
    prefix: &[BetaValue],
) -> ScopResult<Vec<BetaMatch<'a>>> {
    let mut matches = Vec::new();
    for (statement, part, relation) in scop.scattering_parts() {
        let beta = extract_beta(relation)?;
        if same_beta_prefix(&beta, prefix) {
            matches.push(BetaMatch {
                statement,
                part,
                relation,
                beta,
            });
        }
    }
    Ok(matches)
}

pub fn count_with_prefix(scop: &Scop, prefix: &[BetaValue]) -> ScopResult<usize> {
    Ok(relations_with_prefix(scop, prefix)?.len())
}

/// Largest value at the wildcard position among the betas under `prefix`.
pub fn max_beta_under_prefix(scop: &Scop, prefix: &[BetaValue]) -> ScopResult<Option<i64>> {
    let position = prefix.len().saturating_sub(1);
    Ok(relations_with_prefix(scop, prefix)?
        .iter()
        .filter_map(|m| m.beta[position].value())
        .max())
}

/// Fail when two scattering parts share the same beta.
pub fn check_unique_betas(scop: &Scop) -> ScopResult<()> {
    let mut seen: Vec<(usize, Beta)> = Vec::new();
    for (statement, _, relation) in scop.scattering_parts() {
        let beta = extract_beta(relation)?;
        if let Some((other, _)) = seen.iter().find(|(_, b)| *b == beta) {
            return Err(invariant(
                InvariantErrorKind::DuplicateBeta,
                format!(
                    "statements {} and {} share beta {}",
                    other + 1,
                    statement + 1,
                    beta_to_string(&beta)
                ),
            ));
        }
        seen.push((statement, beta));
    }
    Ok(())
}
