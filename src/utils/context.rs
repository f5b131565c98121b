//! Default precision and relation id generation.
//!
//! A [`ScopContext`] owns the default coefficient precision and the id counter
//! handed to new relations and statements. The precision is resolved lazily
//! (explicit setting, else `SCOP_PRECISION`, else 64-bit) and freezes the first
//! time a relation is built from it; changing it afterwards to a different
//! value is rejected.
//!
//! Most callers use the process-wide instance through [`default_precision`],
//! [`set_default_precision`] and [`fresh_id`].

use crate::config::ScopConfig;
use crate::int::Precision;
use crate::relation::{Relation, RelationKind};
use crate::utils::errors::{ConfigError, ConfigErrorKind, ScopResult};
use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Precision and id state for relation construction.
#[derive(Debug, Default)]
pub struct ScopContext {
    precision: Option<Precision>,
    frozen: bool,
    next_id: u64,
}

impl ScopContext {
    /// A context whose precision is resolved from the environment on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with an explicit default precision.
    pub fn with_precision(precision: Precision) -> Self {
        Self {
            precision: Some(precision),
            ..Self::default()
        }
    }

    /// The configured precision, without resolving or freezing it.
    pub fn precision(&self) -> Option<Precision> {
        self.precision
    }

    /// Whether relations were already built from the default precision.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Change the default precision.
    pub fn set_precision(&mut self, precision: Precision) -> ScopResult<()> {
        if self.frozen && self.precision != Some(precision) {
            return Err(ConfigError::new(
                ConfigErrorKind::PrecisionFrozen,
                format!(
                    "default precision is already {} and relations depend on it",
                    self.precision.unwrap_or_default()
                ),
            )
            .into());
        }
        self.precision = Some(precision);
        Ok(())
    }

    /// Resolve the default precision and freeze it.
    pub fn resolve_precision(&mut self) -> ScopResult<Precision> {
        let precision = match self.precision {
            Some(p) => p,
            None => {
                let p = ScopConfig::from_env()?.precision.unwrap_or_default();
                log::debug!("default precision resolved to {}", p);
                self.precision = Some(p);
                p
            }
        };
        self.frozen = true;
        Ok(precision)
    }

    /// Allocate a fresh id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build a zero-filled relation at this context's default precision.
    pub fn relation(
        &mut self,
        kind: RelationKind,
        nb_rows: usize,
        nb_output_dims: usize,
        nb_input_dims: usize,
        nb_local_dims: usize,
        nb_parameters: usize,
    ) -> ScopResult<Relation> {
        let precision = self.resolve_precision()?;
        let id = self.next_id();
        Ok(Relation::from_layout(
            id,
            kind,
            precision,
            nb_rows,
            nb_output_dims,
            nb_input_dims,
            nb_local_dims,
            nb_parameters,
        ))
    }
}

/// Global context (thread-safe).
static GLOBAL_CONTEXT: Lazy<Mutex<ScopContext>> = Lazy::new(|| Mutex::new(ScopContext::new()));

fn global() -> MutexGuard<'static, ScopContext> {
    GLOBAL_CONTEXT.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The process-wide default precision. Freezes it.
pub fn default_precision() -> ScopResult<Precision> {
    global().resolve_precision()
}

/// Override the process-wide default precision.
pub fn set_default_precision(precision: Precision) -> ScopResult<()> {
    global().set_precision(precision)
}

/// A fresh process-wide id.
pub fn fresh_id() -> u64 {
    global().next_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_freezes_on_use() {
        let mut ctx = ScopContext::with_precision(Precision::Single);
        ctx.set_precision(Precision::Multiple).unwrap();
        assert!(!ctx.is_frozen());

        let rel = ctx.relation(RelationKind::Domain, 2, 1, 0, 0, 1).unwrap();
        assert_eq!(rel.precision(), Precision::Multiple);
        assert!(ctx.is_frozen());

        // Same value is accepted, a different one is not
        ctx.set_precision(Precision::Multiple).unwrap();
        let err = ctx.set_precision(Precision::Double).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::PrecisionFrozen));
    }

    #[test]
    fn test_ids_are_fresh() {
        let mut ctx = ScopContext::with_precision(Precision::Double);
        let a = ctx.relation(RelationKind::Domain, 0, 1, 0, 0, 0).unwrap();
        let b = ctx.relation(RelationKind::Domain, 0, 1, 0, 0, 0).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(fresh_id(), fresh_id());
    }

    #[test]
    fn test_global_default_precision() {
        let precision = default_precision().unwrap();
        let rel = Relation::new(RelationKind::Domain, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(rel.precision(), precision);
        // Re-setting the frozen value is a no-op
        set_default_precision(precision).unwrap();
    }
}
