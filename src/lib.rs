//! # PolyScop - Polyhedral SCoP interchange
//!
//! A library for exchanging static control parts between polyhedral tools:
//! - Coefficients at 32-bit, 64-bit or arbitrary precision
//! - Convex relations and their dimension algebra
//! - Relation unions (disjunctions of convex parts)
//! - URI-keyed extensions with a fallback for unknown payloads
//! - A textual reader and writer for the OpenScop-style format
//! - Beta vector extraction for schedulers
//!
//! ## Architecture
//!
//! ```text
//! Text → ScopReader → Scop (RelationUnion → Relation → Int) → ScopWriter → Text
//!                       ↓
//!                 beta extraction
//! ```
//!
//! ## Example
//!
//! ```rust
//! use polyscop::prelude::*;
//!
//! let text = "\
//! DOMAIN
//! 2 4 1 0 0 1
//! 1  1 0  0
//! 1 -1 1 -1
//! ";
//! let config = ScopConfig::default().with_precision(Precision::Double);
//! let domain = polyscop::codec::read_relation(text, &config).unwrap();
//! assert_eq!(domain.nb_parameters(), 1);
//!
//! let printed = polyscop::codec::print_relation(&domain, &config).unwrap();
//! assert!(printed.contains("## -i0 + p0 - 1 >= 0"));
//! ```

#![warn(clippy::all)]

pub mod beta;
pub mod codec;
pub mod config;
pub mod extension;
pub mod int;
pub mod relation;
pub mod scop;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::beta::{
        beta_to_prefix, beta_to_string, extract_beta, extract_betas, same_beta_prefix, Beta,
        BetaValue,
    };
    pub use crate::codec::{NameSources, NameTable, ScopReader, ScopWriter};
    pub use crate::config::ScopConfig;
    pub use crate::extension::{
        Extension, ExtensionInterface, ExtensionList, ExtensionRegistry, ExtensionValue,
    };
    pub use crate::int::{Int, Precision};
    pub use crate::relation::{
        DimClass, DimKind, DimTag, Relation, RelationKind, RelationUnion, RowClass,
    };
    pub use crate::scop::{Scop, Statement, StmtId};
    pub use crate::utils::errors::*;
}

pub use codec::{print_scop, read_scop, read_scops};
pub use config::ScopConfig;
pub use scop::{Scop, Statement};
pub use utils::errors::{ScopError, ScopResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
