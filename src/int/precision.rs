//! Precision selection for relation coefficients.

use crate::utils::errors::{ConfigError, ConfigErrorKind, ScopError};
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// Backing representation of a coefficient.
///
/// Numeric codes follow the exchange-format convention: 32 and 64 for the
/// fixed-width backends, 0 for arbitrary precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Precision {
    /// 32-bit signed integers
    Single,
    /// 64-bit signed integers
    #[default]
    Double,
    /// Arbitrary precision integers
    Multiple,
}

impl Precision {
    /// All supported precisions.
    pub const ALL: [Precision; 3] = [Precision::Single, Precision::Double, Precision::Multiple];

    /// Numeric code of this precision.
    pub const fn code(self) -> u32 {
        match self {
            Precision::Single => 32,
            Precision::Double => 64,
            Precision::Multiple => 0,
        }
    }

    /// Resolve a numeric code.
    pub fn from_code(code: i64) -> Result<Self, ConfigError> {
        match code {
            32 => Ok(Precision::Single),
            64 => Ok(Precision::Double),
            0 => Ok(Precision::Multiple),
            other => Err(ConfigError::new(
                ConfigErrorKind::UnknownPrecision,
                format!("unknown precision code {} (expected 32, 64 or 0)", other),
            )),
        }
    }

    /// Whether values of this precision are bounded.
    pub const fn is_fixed(self) -> bool {
        !matches!(self, Precision::Multiple)
    }
}

impl FromStr for Precision {
    type Err = ScopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "sp" | "single" | "i32" => Ok(Precision::Single),
            "dp" | "double" | "i64" => Ok(Precision::Double),
            "mp" | "multiple" | "big" | "arbitrary" => Ok(Precision::Multiple),
            other => match other.parse::<i64>() {
                Ok(code) => Ok(Precision::from_code(code)?),
                Err(_) => Err(ConfigError::new(
                    ConfigErrorKind::UnknownPrecision,
                    format!("unknown precision {:?}", s),
                )
                .into()),
            },
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "32-bit"),
            Precision::Double => write!(f, "64-bit"),
            Precision::Multiple => write!(f, "arbitrary"),
        }
    }
}
