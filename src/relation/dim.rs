//! Dimension classes, column roles and per-output-dimension tags.

use serde::{Serialize, Deserialize};
use std::fmt;

/// The four classes of dimensions, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimClass {
    Output,
    Input,
    Local,
    Parameter,
}

impl DimClass {
    /// All classes in column order.
    pub const ALL: [DimClass; 4] = [
        DimClass::Output,
        DimClass::Input,
        DimClass::Local,
        DimClass::Parameter,
    ];
}

impl fmt::Display for DimClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DimClass::Output => "output",
            DimClass::Input => "input",
            DimClass::Local => "local",
            DimClass::Parameter => "parameter",
        };
        write!(f, "{}", name)
    }
}

/// What a column of the constraint matrix holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Column 0: 0 for equalities, nonzero for inequalities
    Tag,
    /// A dimension, with its index inside the class
    Dim(DimClass, usize),
    /// Last column
    Constant,
}

/// Scheduling role of an output dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DimKind {
    /// Dimension varying with iterators (a loop level)
    #[default]
    Alpha,
    /// Constant dimension ordering statements textually
    Beta,
}

/// Type tag of an output dimension, as consumed by schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DimTag {
    pub kind: DimKind,
    pub strip_mined: bool,
    pub parallel: bool,
    pub vectorizable: bool,
}

impl DimTag {
    pub fn alpha() -> Self {
        Self::default()
    }

    pub fn beta() -> Self {
        Self {
            kind: DimKind::Beta,
            ..Self::default()
        }
    }

    pub fn is_beta(&self) -> bool {
        self.kind == DimKind::Beta
    }

    pub fn with_strip_mined(mut self, value: bool) -> Self {
        self.strip_mined = value;
        self
    }

    pub fn with_parallel(mut self, value: bool) -> Self {
        self.parallel = value;
        self
    }

    pub fn with_vectorizable(mut self, value: bool) -> Self {
        self.vectorizable = value;
        self
    }
}

/// Semantic class of one constraint row. Exactly one holds for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowClass {
    /// `expr >= 0`
    Inequality,
    /// Equality with no dimension coefficient
    ConstantEquation,
    /// Equality over parameters only
    ParameterEquation,
    /// Equality pinning a single beta output dimension
    BetaEquation { dim: usize },
    /// Any other equality
    AlphaEquation,
}

impl RowClass {
    pub fn is_equation(&self) -> bool {
        !matches!(self, RowClass::Inequality)
    }
}
