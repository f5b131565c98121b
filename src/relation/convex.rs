//! Convex relations: one constraint matrix plus its dimension layout.
//!
//! Column layout, always:
//! ```text
//! | eq/ineq | output dims | input dims | local dims | parameters | constant |
//! ```
//! Column 0 is 0 for an equality (`expr == 0`) and nonzero for an inequality
//! (`expr >= 0`). Every dimension operation keeps
//! `nb_columns == 2 + nb_output + nb_input + nb_local + nb_parameters`.

use super::dim::{ColumnRole, DimClass, DimKind, DimTag, RowClass};
use super::kind::RelationKind;
use crate::extension::ExtensionList;
use crate::int::{Int, Precision};
use crate::utils::context;
use crate::utils::errors::{invariant, InvariantErrorKind, ScopResult};
use log::trace;
use std::fmt;

/// A conjunction of affine constraints over output, input, local and
/// parameter dimensions.
///
/// Cloning is deep and keeps the id; use [`Relation::with_precision`] or the
/// context to obtain fresh ids.
#[derive(Debug, Clone)]
pub struct Relation {
    id: u64,
    kind: RelationKind,
    precision: Precision,
    nb_columns: usize,
    nb_output_dims: usize,
    nb_input_dims: usize,
    nb_local_dims: usize,
    nb_parameters: usize,
    rows: Vec<Vec<Int>>,
    dim_tags: Vec<DimTag>,
    extensions: ExtensionList,
}

impl Relation {
    /// Zero-filled relation at the process-wide default precision.
    pub fn new(
        kind: RelationKind,
        nb_rows: usize,
        nb_output_dims: usize,
        nb_input_dims: usize,
        nb_local_dims: usize,
        nb_parameters: usize,
    ) -> ScopResult<Self> {
        let precision = context::default_precision()?;
        Ok(Self::with_precision(
            kind,
            precision,
            nb_rows,
            nb_output_dims,
            nb_input_dims,
            nb_local_dims,
            nb_parameters,
        ))
    }

    /// Zero-filled relation at an explicit precision.
    pub fn with_precision(
        kind: RelationKind,
        precision: Precision,
        nb_rows: usize,
        nb_output_dims: usize,
        nb_input_dims: usize,
        nb_local_dims: usize,
        nb_parameters: usize,
    ) -> Self {
        Self::from_layout(
            context::fresh_id(),
            kind,
            precision,
            nb_rows,
            nb_output_dims,
            nb_input_dims,
            nb_local_dims,
            nb_parameters,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_layout(
        id: u64,
        kind: RelationKind,
        precision: Precision,
        nb_rows: usize,
        nb_output_dims: usize,
        nb_input_dims: usize,
        nb_local_dims: usize,
        nb_parameters: usize,
    ) -> Self {
        let nb_columns = 2 + nb_output_dims + nb_input_dims + nb_local_dims + nb_parameters;
        Self {
            id,
            kind,
            precision,
            nb_columns,
            nb_output_dims,
            nb_input_dims,
            nb_local_dims,
            nb_parameters,
            rows: vec![vec![Int::zero(precision); nb_columns]; nb_rows],
            dim_tags: vec![DimTag::default(); nb_output_dims],
            extensions: ExtensionList::new(),
        }
    }

    /// Relation built from machine-integer rows.
    pub fn from_rows(
        kind: RelationKind,
        precision: Precision,
        nb_output_dims: usize,
        nb_input_dims: usize,
        nb_local_dims: usize,
        nb_parameters: usize,
        rows: &[Vec<i64>],
    ) -> ScopResult<Self> {
        let mut relation = Self::with_precision(
            kind,
            precision,
            0,
            nb_output_dims,
            nb_input_dims,
            nb_local_dims,
            nb_parameters,
        );
        for row in rows {
            let cells = row
                .iter()
                .map(|&v| Int::from_i64(precision, v))
                .collect::<ScopResult<Vec<_>>>()?;
            relation.push_row(cells)?;
        }
        Ok(relation)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: RelationKind) {
        self.kind = kind;
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn nb_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn nb_columns(&self) -> usize {
        self.nb_columns
    }

    pub fn nb_output_dims(&self) -> usize {
        self.nb_output_dims
    }

    pub fn nb_input_dims(&self) -> usize {
        self.nb_input_dims
    }

    pub fn nb_local_dims(&self) -> usize {
        self.nb_local_dims
    }

    pub fn nb_parameters(&self) -> usize {
        self.nb_parameters
    }

    /// Number of dimensions of a class.
    pub fn nb_dims(&self, class: DimClass) -> usize {
        match class {
            DimClass::Output => self.nb_output_dims,
            DimClass::Input => self.nb_input_dims,
            DimClass::Local => self.nb_local_dims,
            DimClass::Parameter => self.nb_parameters,
        }
    }

    fn class_offset(&self, class: DimClass) -> usize {
        match class {
            DimClass::Output => 1,
            DimClass::Input => 1 + self.nb_output_dims,
            DimClass::Local => 1 + self.nb_output_dims + self.nb_input_dims,
            DimClass::Parameter => {
                1 + self.nb_output_dims + self.nb_input_dims + self.nb_local_dims
            }
        }
    }

    /// Index of the constant column.
    pub fn constant_column(&self) -> usize {
        self.nb_columns - 1
    }

    pub fn rows(&self) -> &[Vec<Int>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> ScopResult<&[Int]> {
        self.check_row(row)?;
        Ok(&self.rows[row])
    }

    pub fn dim_tags(&self) -> &[DimTag] {
        &self.dim_tags
    }

    pub fn dim_tag(&self, dim: usize) -> ScopResult<DimTag> {
        self.column_of(DimClass::Output, dim)?;
        Ok(self.dim_tags[dim])
    }

    pub fn set_dim_tag(&mut self, dim: usize, tag: DimTag) -> ScopResult<()> {
        self.column_of(DimClass::Output, dim)?;
        self.dim_tags[dim] = tag;
        Ok(())
    }

    pub fn extensions(&self) -> &ExtensionList {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionList {
        &mut self.extensions
    }

    // ---- Indexing ----

    /// Column holding dimension `index` of `class`.
    pub fn column_of(&self, class: DimClass, index: usize) -> ScopResult<usize> {
        let len = self.nb_dims(class);
        if index >= len {
            let message = if len == 0 {
                format!("relation has no {} dimensions", class)
            } else {
                format!("{} dimension {} out of range (relation has {})", class, index, len)
            };
            return Err(invariant(InvariantErrorKind::DimOutOfRange, message));
        }
        Ok(self.class_offset(class) + index)
    }

    /// What a column holds.
    pub fn column_role(&self, column: usize) -> ScopResult<ColumnRole> {
        self.check_column(column)?;
        if column == 0 {
            return Ok(ColumnRole::Tag);
        }
        if column == self.constant_column() {
            return Ok(ColumnRole::Constant);
        }
        let class = DimClass::ALL
            .into_iter()
            .find(|&class| column < self.class_offset(class) + self.nb_dims(class))
            .ok_or_else(|| {
                invariant(
                    InvariantErrorKind::ColumnOutOfRange,
                    format!("column {} has no role", column),
                )
            })?;
        Ok(ColumnRole::Dim(class, column - self.class_offset(class)))
    }

    fn column_class(&self, column: usize) -> Option<(DimClass, usize)> {
        match self.column_role(column) {
            Ok(ColumnRole::Dim(class, index)) => Some((class, index)),
            _ => None,
        }
    }

    pub fn is_output_dim(&self, column: usize) -> bool {
        matches!(self.column_class(column), Some((DimClass::Output, _)))
    }

    pub fn is_input_dim(&self, column: usize) -> bool {
        matches!(self.column_class(column), Some((DimClass::Input, _)))
    }

    pub fn is_local_dim(&self, column: usize) -> bool {
        matches!(self.column_class(column), Some((DimClass::Local, _)))
    }

    pub fn is_parameter_dim(&self, column: usize) -> bool {
        matches!(self.column_class(column), Some((DimClass::Parameter, _)))
    }

    /// Whether `column` is an output dimension tagged beta.
    pub fn is_beta_dim(&self, column: usize) -> bool {
        match self.column_class(column) {
            Some((DimClass::Output, dim)) => self.dim_tags[dim].is_beta(),
            _ => false,
        }
    }

    /// Whether `column` is an output dimension tagged alpha.
    pub fn is_alpha_dim(&self, column: usize) -> bool {
        match self.column_class(column) {
            Some((DimClass::Output, dim)) => !self.dim_tags[dim].is_beta(),
            _ => false,
        }
    }

    // ---- Cells ----

    fn check_row(&self, row: usize) -> ScopResult<()> {
        if row >= self.rows.len() {
            return Err(invariant(
                InvariantErrorKind::RowOutOfRange,
                format!("row {} out of range (relation has {})", row, self.rows.len()),
            ));
        }
        Ok(())
    }

    fn check_column(&self, column: usize) -> ScopResult<()> {
        if column >= self.nb_columns {
            return Err(invariant(
                InvariantErrorKind::ColumnOutOfRange,
                format!("column {} out of range (relation has {})", column, self.nb_columns),
            ));
        }
        Ok(())
    }

    fn check_precision(&self, value: &Int) -> ScopResult<()> {
        if value.precision() != self.precision {
            return Err(invariant(
                InvariantErrorKind::PrecisionMismatch,
                format!(
                    "{} coefficient in a {} relation",
                    value.precision(),
                    self.precision
                ),
            ));
        }
        Ok(())
    }

    pub fn get(&self, row: usize, column: usize) -> ScopResult<&Int> {
        self.check_row(row)?;
        self.check_column(column)?;
        Ok(&self.rows[row][column])
    }

    pub fn set(&mut self, row: usize, column: usize, value: Int) -> ScopResult<()> {
        self.check_row(row)?;
        self.check_column(column)?;
        self.check_precision(&value)?;
        self.rows[row][column] = value;
        Ok(())
    }

    pub fn set_i64(&mut self, row: usize, column: usize, value: i64) -> ScopResult<()> {
        let value = Int::from_i64(self.precision, value)?;
        self.set(row, column, value)
    }

    /// Whether row `row` is an equality.
    pub fn is_equality(&self, row: usize) -> ScopResult<bool> {
        Ok(self.get(row, 0)?.is_zero())
    }

    // ---- Dimension algebra ----

    /// Insert a zero column for a new dimension of `class` at position `pos`
    /// within the class. Returns the new column index.
    pub fn add_dim(&mut self, class: DimClass, pos: usize) -> ScopResult<usize> {
        let len = self.nb_dims(class);
        if pos > len {
            return Err(invariant(
                InvariantErrorKind::DimOutOfRange,
                format!(
                    "cannot insert {} dimension at {} (relation has {})",
                    class, pos, len
                ),
            ));
        }
        let column = self.class_offset(class) + pos;
        let zero = Int::zero(self.precision);
        for row in &mut self.rows {
            row.insert(column, zero.clone());
        }
        self.nb_columns += 1;
        match class {
            DimClass::Output => {
                self.nb_output_dims += 1;
                self.dim_tags.insert(pos, DimTag::default());
            }
            DimClass::Input => self.nb_input_dims += 1,
            DimClass::Local => self.nb_local_dims += 1,
            DimClass::Parameter => self.nb_parameters += 1,
        }
        trace!("relation {}: {} dimension inserted at column {}", self.id, class, column);
        Ok(column)
    }

    pub fn add_output_dim(&mut self, pos: usize) -> ScopResult<usize> {
        self.add_dim(DimClass::Output, pos)
    }

    /// Insert an output dimension carrying `tag`.
    pub fn add_output_dim_with_tag(&mut self, pos: usize, tag: DimTag) -> ScopResult<usize> {
        let column = self.add_dim(DimClass::Output, pos)?;
        self.dim_tags[pos] = tag;
        Ok(column)
    }

    /// Insert an output dimension before output dimension `dim`
    /// (`dim == nb_output_dims` appends).
    pub fn add_output_dim_before(&mut self, dim: usize) -> ScopResult<usize> {
        self.add_dim(DimClass::Output, dim)
    }

    /// Insert an output dimension after output dimension `dim`.
    pub fn add_output_dim_after(&mut self, dim: usize) -> ScopResult<usize> {
        self.column_of(DimClass::Output, dim)?;
        self.add_dim(DimClass::Output, dim + 1)
    }

    pub fn add_input_dim(&mut self, pos: usize) -> ScopResult<usize> {
        self.add_dim(DimClass::Input, pos)
    }

    pub fn add_local_dim(&mut self, pos: usize) -> ScopResult<usize> {
        self.add_dim(DimClass::Local, pos)
    }

    pub fn add_parameter(&mut self, pos: usize) -> ScopResult<usize> {
        self.add_dim(DimClass::Parameter, pos)
    }

    /// Delete dimension `index` of `class` and its column.
    pub fn remove_dim(&mut self, class: DimClass, index: usize) -> ScopResult<()> {
        let column = self.column_of(class, index)?;
        for row in &mut self.rows {
            row.remove(column);
        }
        self.nb_columns -= 1;
        match class {
            DimClass::Output => {
                self.nb_output_dims -= 1;
                self.dim_tags.remove(index);
            }
            DimClass::Input => self.nb_input_dims -= 1,
            DimClass::Local => self.nb_local_dims -= 1,
            DimClass::Parameter => self.nb_parameters -= 1,
        }
        trace!("relation {}: column {} removed", self.id, column);
        Ok(())
    }

    pub fn remove_output_dim(&mut self, dim: usize) -> ScopResult<()> {
        self.remove_dim(DimClass::Output, dim)
    }

    pub fn remove_input_dim(&mut self, dim: usize) -> ScopResult<()> {
        self.remove_dim(DimClass::Input, dim)
    }

    pub fn remove_local_dim(&mut self, dim: usize) -> ScopResult<()> {
        self.remove_dim(DimClass::Local, dim)
    }

    pub fn remove_parameter(&mut self, dim: usize) -> ScopResult<()> {
        self.remove_dim(DimClass::Parameter, dim)
    }

    /// Delete a dimension column. The tag and constant columns are protected.
    pub fn remove_column(&mut self, column: usize) -> ScopResult<()> {
        match self.column_role(column)? {
            ColumnRole::Tag | ColumnRole::Constant => Err(invariant(
                InvariantErrorKind::ProtectedColumn,
                format!("column {} cannot be removed", column),
            )),
            ColumnRole::Dim(class, index) => self.remove_dim(class, index),
        }
    }

    // ---- Rows ----

    fn check_cells(&self, cells: &[Int]) -> ScopResult<()> {
        if cells.len() != self.nb_columns {
            return Err(invariant(
                InvariantErrorKind::RowLength,
                format!("row has {} cells, relation has {} columns", cells.len(), self.nb_columns),
            ));
        }
        cells.iter().try_for_each(|cell| self.check_precision(cell))
    }

    /// Insert a row at position `pos`.
    pub fn insert_row(&mut self, pos: usize, cells: Vec<Int>) -> ScopResult<()> {
        if pos > self.rows.len() {
            return Err(invariant(
                InvariantErrorKind::RowOutOfRange,
                format!("cannot insert row at {} (relation has {})", pos, self.rows.len()),
            ));
        }
        self.check_cells(&cells)?;
        self.rows.insert(pos, cells);
        Ok(())
    }

    pub fn push_row(&mut self, cells: Vec<Int>) -> ScopResult<()> {
        self.insert_row(self.rows.len(), cells)
    }

    /// Insert an all-zero row (an equality `0 == 0`) at `pos`.
    pub fn insert_blank_row(&mut self, pos: usize) -> ScopResult<()> {
        let blank = vec![Int::zero(self.precision); self.nb_columns];
        self.insert_row(pos, blank)
    }

    /// Insert a blank equation before row `row`. Returns its index.
    pub fn add_equation_before(&mut self, row: usize) -> ScopResult<usize> {
        self.insert_blank_row(row)?;
        Ok(row)
    }

    /// Insert a blank equation after row `row`. Returns its index.
    pub fn add_equation_after(&mut self, row: usize) -> ScopResult<usize> {
        self.check_row(row)?;
        self.insert_blank_row(row + 1)?;
        Ok(row + 1)
    }

    /// Remove and return row `row`.
    pub fn remove_constraint(&mut self, row: usize) -> ScopResult<Vec<Int>> {
        self.check_row(row)?;
        Ok(self.rows.remove(row))
    }

    /// Whether both relations have the same four dimension counts.
    pub fn same_layout(&self, other: &Relation) -> bool {
        self.nb_output_dims == other.nb_output_dims
            && self.nb_input_dims == other.nb_input_dims
            && self.nb_local_dims == other.nb_local_dims
            && self.nb_parameters == other.nb_parameters
    }

    /// Append the rows of `other`, which must have the same layout and precision.
    pub fn concat_constraints(&mut self, other: &Relation) -> ScopResult<()> {
        if !self.same_layout(other) {
            return Err(invariant(
                InvariantErrorKind::DimensionMismatch,
                format!(
                    "cannot concatenate a {} relation with a {} relation",
                    self.layout_string(),
                    other.layout_string()
                ),
            ));
        }
        if self.precision != other.precision {
            return Err(invariant(
                InvariantErrorKind::PrecisionMismatch,
                format!("cannot concatenate {} and {} relations", self.precision, other.precision),
            ));
        }
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    pub(crate) fn layout_string(&self) -> String {
        format!(
            "{}x{} ({} out, {} in, {} local, {} param)",
            self.rows.len(),
            self.nb_columns,
            self.nb_output_dims,
            self.nb_input_dims,
            self.nb_local_dims,
            self.nb_parameters
        )
    }

    // ---- Queries ----

    /// Structural equality: kind, counts, tags, cells and extensions.
    /// Ids are ignored. Relations of different precisions cannot be compared.
    pub fn equal(&self, other: &Relation) -> ScopResult<bool> {
        if self.precision != other.precision {
            return Err(invariant(
                InvariantErrorKind::PrecisionMismatch,
                format!("cannot compare {} and {} relations", self.precision, other.precision),
            ));
        }
        Ok(self.kind == other.kind
            && self.same_layout(other)
            && self.dim_tags == other.dim_tags
            && self.rows == other.rows
            && self.extensions.equal(&other.extensions))
    }

    /// Output dimensions with a nonzero coefficient in some row.
    pub fn used_output_dims(&self) -> Vec<usize> {
        (0..self.nb_output_dims)
            .filter(|&dim| self.rows.iter().any(|row| !row[1 + dim].is_zero()))
            .collect()
    }

    /// Output dimensions with a nonzero coefficient in row `row`.
    pub fn used_output_dims_in_row(&self, row: usize) -> ScopResult<Vec<usize>> {
        let cells = self.row(row)?;
        Ok((0..self.nb_output_dims)
            .filter(|&dim| !cells[1 + dim].is_zero())
            .collect())
    }

    fn nonzero_in_class(&self, cells: &[Int], class: DimClass) -> usize {
        let start = self.class_offset(class);
        cells[start..start + self.nb_dims(class)]
            .iter()
            .filter(|cell| !cell.is_zero())
            .count()
    }

    /// Semantic class of row `row`.
    pub fn classify_row(&self, row: usize) -> ScopResult<RowClass> {
        let cells = self.row(row)?;
        if !cells[0].is_zero() {
            return Ok(RowClass::Inequality);
        }
        let outputs = self.used_output_dims_in_row(row)?;
        let inner = self.nonzero_in_class(cells, DimClass::Input)
            + self.nonzero_in_class(cells, DimClass::Local);
        let params = self.nonzero_in_class(cells, DimClass::Parameter);

        if outputs.is_empty() && inner == 0 {
            return Ok(if params == 0 {
                RowClass::ConstantEquation
            } else {
                RowClass::ParameterEquation
            });
        }
        if let &[dim] = outputs.as_slice() {
            if inner == 0 && params == 0 && self.dim_tags[dim].is_beta() {
                return Ok(RowClass::BetaEquation { dim });
            }
        }
        Ok(RowClass::AlphaEquation)
    }

    fn pins_output_dim(&self, cells: &[Int], dim: usize) -> bool {
        cells[0].is_zero()
            && !cells[1 + dim].is_zero()
            && cells[1..self.constant_column()]
                .iter()
                .enumerate()
                .all(|(i, cell)| i == dim || cell.is_zero())
    }

    /// Retag output dimensions: in a scattering relation, a dimension is beta
    /// when an equality pins it alone to a constant. Everything else is alpha.
    /// Other tag flags are kept.
    pub fn infer_dim_tags(&mut self) {
        for dim in 0..self.nb_output_dims {
            let pinned = self.kind == RelationKind::Scattering
                && self.rows.iter().any(|row| self.pins_output_dim(row, dim));
            self.dim_tags[dim].kind = if pinned { DimKind::Beta } else { DimKind::Alpha };
        }
    }

    /// Copy with every cell converted to `precision`.
    pub fn to_precision(&self, precision: Precision) -> ScopResult<Relation> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_precision(precision))
                    .collect::<ScopResult<Vec<_>>>()
            })
            .collect::<ScopResult<Vec<_>>>()?;
        Ok(Relation {
            id: self.id,
            kind: self.kind,
            precision,
            nb_columns: self.nb_columns,
            nb_output_dims: self.nb_output_dims,
            nb_input_dims: self.nb_input_dims,
            nb_local_dims: self.nb_local_dims,
            nb_parameters: self.nb_parameters,
            rows,
            dim_tags: self.dim_tags.clone(),
            extensions: self.extensions.clone(),
        })
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::codec::relation_to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::Comment;

    fn rel(kind: RelationKind, out: usize, inp: usize, local: usize, params: usize, rows: &[Vec<i64>]) -> Relation {
        Relation::from_rows(kind, Precision::Double, out, inp, local, params, rows).unwrap()
    }

    fn square_domain() -> Relation {
        // 0 <= i < N
        rel(RelationKind::Domain, 1, 0, 0, 1, &[vec![1, 1, 0, 0], vec![1, -1, 1, -1]])
    }

    #[test]
    fn test_layout_and_indexing() {
        let r = Relation::with_precision(RelationKind::Scattering, Precision::Single, 2, 3, 2, 1, 1);
        assert_eq!(r.nb_columns(), 9);
        assert_eq!(r.column_of(DimClass::Output, 0).unwrap(), 1);
        assert_eq!(r.column_of(DimClass::Input, 1).unwrap(), 5);
        assert_eq!(r.column_of(DimClass::Local, 0).unwrap(), 6);
        assert_eq!(r.column_of(DimClass::Parameter, 0).unwrap(), 7);
        assert_eq!(r.column_role(0).unwrap(), ColumnRole::Tag);
        assert_eq!(r.column_role(8).unwrap(), ColumnRole::Constant);
        assert_eq!(r.column_role(4).unwrap(), ColumnRole::Dim(DimClass::Input, 0));
        assert!(r.is_output_dim(3));
        assert!(r.is_local_dim(6));
        assert!(r.is_parameter_dim(7));
        assert!(!r.is_input_dim(8));

        let err = r.column_of(DimClass::Output, 3).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::DimOutOfRange));
        let err = r.column_role(9).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::ColumnOutOfRange));
    }

    #[test]
    fn test_empty_class_is_out_of_range() {
        let r = square_domain();
        let err = r.column_of(DimClass::Input, 0).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::DimOutOfRange));
    }

    #[test]
    fn test_add_then_remove_restores() {
        let original = rel(
            RelationKind::Scattering,
            3,
            1,
            0,
            1,
            &[
                vec![0, -1, 0, 0, 0, 0, 0],
                vec![0, 0, -1, 0, 1, 0, 0],
                vec![0, 0, 0, -1, 0, 0, 2],
            ],
        );
        for i in 0..3 {
            let mut r = original.clone();
            let column = r.add_output_dim_after(i).unwrap();
            assert_eq!(column, i + 2);
            assert_eq!(r.nb_output_dims(), 4);
            assert_eq!(r.nb_columns(), original.nb_columns() + 1);
            assert!(r.rows().iter().all(|row| row[column].is_zero()));
            r.remove_output_dim(i + 1).unwrap();
            assert!(r.equal(&original).unwrap());
        }
    }

    #[test]
    fn test_add_dims_of_each_class() {
        let mut r = square_domain();
        r.add_parameter(1).unwrap();
        r.add_local_dim(0).unwrap();
        r.add_input_dim(0).unwrap();
        r.add_output_dim_before(0).unwrap();
        assert_eq!(
            (r.nb_output_dims(), r.nb_input_dims(), r.nb_local_dims(), r.nb_parameters()),
            (2, 1, 1, 2)
        );
        assert_eq!(r.nb_columns(), 8);
        assert_eq!(r.dim_tags().len(), 2);
        // The constant column moved with the layout
        assert_eq!(r.get(1, r.constant_column()).unwrap(), &Int::Double(-1));
        assert!(r.add_output_dim_after(2).is_err());
        assert!(r.add_parameter(3).is_err());
    }

    #[test]
    fn test_remove_column() {
        let mut r = square_domain();
        let last = r.constant_column();
        for column in [0, last] {
            let err = r.remove_column(column).unwrap_err();
            assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::ProtectedColumn));
        }
        r.remove_column(2).unwrap();
        assert_eq!(r.nb_parameters(), 0);
        assert_eq!(r.nb_columns(), 3);
    }

    #[test]
    fn test_cell_access() {
        let mut r = square_domain();
        r.set_i64(0, 3, 7).unwrap();
        assert_eq!(r.get(0, 3).unwrap(), &Int::Double(7));
        let err = r.get(2, 0).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::RowOutOfRange));
        let err = r.set(0, 4, Int::Double(1)).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::ColumnOutOfRange));
        let err = r.set(0, 1, Int::Single(1)).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::PrecisionMismatch));
    }

    #[test]
    fn test_row_operations() {
        let mut r = square_domain();
        assert_eq!(r.add_equation_after(0).unwrap(), 1);
        assert_eq!(r.add_equation_before(0).unwrap(), 0);
        assert_eq!(r.nb_rows(), 4);
        assert!(r.is_equality(0).unwrap());
        assert!(!r.is_equality(1).unwrap());
        let removed = r.remove_constraint(0).unwrap();
        assert!(removed.iter().all(Int::is_zero));
        assert!(r.add_equation_after(3).is_err());

        let err = r.push_row(vec![Int::Double(1); 3]).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::RowLength));
    }

    #[test]
    fn test_concat() {
        let mut a = square_domain();
        let b = square_domain();
        a.concat_constraints(&b).unwrap();
        assert_eq!(a.nb_rows(), 4);

        let c = rel(RelationKind::Domain, 2, 0, 0, 1, &[]);
        let err = a.concat_constraints(&c).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::DimensionMismatch));

        let d = b.to_precision(Precision::Multiple).unwrap();
        let err = a.concat_constraints(&d).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::PrecisionMismatch));
    }

    #[test]
    fn test_equality() {
        let a = square_domain();
        let mut b = square_domain();
        assert!(a.equal(&b).unwrap());
        b.extensions_mut().push(Comment::new("note"));
        assert!(!a.equal(&b).unwrap());

        let mut c = square_domain();
        c.set_dim_tag(0, DimTag::alpha().with_parallel(true)).unwrap();
        assert!(!a.equal(&c).unwrap());

        let m = a.to_precision(Precision::Multiple).unwrap();
        let err = a.equal(&m).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::PrecisionMismatch));
    }

    #[test]
    fn test_used_output_dims() {
        let r = rel(
            RelationKind::Scattering,
            3,
            1,
            0,
            0,
            &[vec![0, -1, 0, 0, 0, 0], vec![0, 0, 0, -1, 1, 0]],
        );
        assert_eq!(r.used_output_dims(), vec![0, 2]);
        assert_eq!(r.used_output_dims_in_row(1).unwrap(), vec![2]);
        assert!(r.used_output_dims_in_row(2).is_err());
    }

    #[test]
    fn test_row_classification() {
        // Outputs c0 c1 c2, input i, parameter N
        let mut r = rel(
            RelationKind::Scattering,
            3,
            1,
            0,
            1,
            &[
                vec![0, -1, 0, 0, 0, 0, 0],
                vec![0, 0, -1, 0, 1, 0, 0],
                vec![0, 0, 0, -1, 0, 0, 1],
                vec![0, 0, 0, 0, 0, 0, 5],
                vec![0, 0, 0, 0, 0, 1, -2],
                vec![1, 0, 0, 0, 1, 0, 0],
                vec![0, -1, 0, 0, 0, 1, 0],
            ],
        );
        r.infer_dim_tags();
        assert!(r.dim_tag(0).unwrap().is_beta());
        assert!(!r.dim_tag(1).unwrap().is_beta());
        assert!(r.dim_tag(2).unwrap().is_beta());
        assert!(r.is_beta_dim(1));
        assert!(r.is_alpha_dim(2));

        let classes: Vec<RowClass> = (0..r.nb_rows()).map(|i| r.classify_row(i).unwrap()).collect();
        assert_eq!(
            classes,
            vec![
                RowClass::BetaEquation { dim: 0 },
                RowClass::AlphaEquation,
                RowClass::BetaEquation { dim: 2 },
                RowClass::ConstantEquation,
                RowClass::ParameterEquation,
                RowClass::Inequality,
                RowClass::AlphaEquation,
            ]
        );
    }

    #[test]
    fn test_infer_tags_only_for_scattering() {
        let mut r = rel(RelationKind::Domain, 1, 0, 0, 0, &[vec![0, -1, 3]]);
        r.infer_dim_tags();
        assert!(!r.dim_tag(0).unwrap().is_beta());
    }

    #[test]
    fn test_to_precision_checks_range() {
        let mut r = Relation::with_precision(RelationKind::Domain, Precision::Multiple, 1, 1, 0, 0, 0);
        r.set(0, 2, Int::parse(Precision::Multiple, "4294967296").unwrap()).unwrap();
        let err = r.to_precision(Precision::Single).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::Overflow));
        let d = r.to_precision(Precision::Double).unwrap();
        assert_eq!(d.get(0, 2).unwrap(), &Int::Double(4294967296));
    }
}
