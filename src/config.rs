//! Reader/writer configuration

use crate::int::Precision;
use crate::utils::errors::ScopResult;
use serde::{Serialize, Deserialize};

/// Environment variable selecting the default coefficient precision.
pub const PRECISION_ENV: &str = "SCOP_PRECISION";

/// Configuration shared by the reader, the writer and the CLI
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopConfig {
    /// Precision of relations built by the reader (process default if `None`)
    pub precision: Option<Precision>,

    /// Print `## expr` comments after each matrix row
    pub print_comments: bool,

    /// Parameter count for legacy matrix headers read outside a program
    pub legacy_parameters: Option<usize>,
}

impl Default for ScopConfig {
    fn default() -> Self {
        Self {
            precision: None,
            print_comments: true,
            legacy_parameters: None,
        }
    }
}

impl ScopConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config, with the precision taken from `SCOP_PRECISION` if set
    pub fn from_env() -> ScopResult<Self> {
        let mut config = Self::default();
        if let Some(value) = std::env::var_os(PRECISION_ENV) {
            let value = value.to_string_lossy();
            if !value.trim().is_empty() {
                config.precision = Some(value.parse()?);
            }
        }
        Ok(config)
    }

    /// Set the reader precision
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Enable or disable row comments
    pub fn with_comments(mut self, print_comments: bool) -> Self {
        self.print_comments = print_comments;
        self
    }

    /// Set the parameter count used for legacy matrix headers
    pub fn with_legacy_parameters(mut self, nb_parameters: usize) -> Self {
        self.legacy_parameters = Some(nb_parameters);
        self
    }
}
