//! Display names for relation dimensions.
//!
//! Names only feed the `##` comments the writer appends to matrix rows; the
//! reader ignores them. Missing names are synthesized from the dimension
//! class: `i0` for iterators, `c0` for scattering outputs, `a0` for access
//! outputs, `l0` for locals and `p0` for parameters.

use crate::relation::{DimClass, Relation, RelationKind};
use crate::utils::errors::ScopResult;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Names of the dimensions of one relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
    pub locals: Vec<String>,
    pub parameters: Vec<String>,
}

fn fill(given: Option<&[String]>, len: usize, prefix: &str) -> Vec<String> {
    (0..len)
        .map(|i| {
            given
                .and_then(|names| names.get(i))
                .cloned()
                .unwrap_or_else(|| format!("{}{}", prefix, i))
        })
        .collect()
}

fn output_prefix(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Domain => "i",
        RelationKind::Scattering => "c",
        RelationKind::Read | RelationKind::Write | RelationKind::MayWrite => "a",
        RelationKind::Context | RelationKind::Undefined => "o",
    }
}

/// Names known for the dimensions of a union, before fallbacks.
///
/// Every part of a union gets its own [`NameTable`] built from the same
/// sources, so parts with more local dimensions still get `l0`, `l1`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSources<'a> {
    pub outputs: Option<&'a [String]>,
    pub inputs: Option<&'a [String]>,
    pub parameters: Option<&'a [String]>,
}

impl<'a> NameSources<'a> {
    pub fn new(
        outputs: Option<&'a [String]>,
        inputs: Option<&'a [String]>,
        parameters: Option<&'a [String]>,
    ) -> Self {
        Self {
            outputs,
            inputs,
            parameters,
        }
    }

    /// Names for one part.
    pub fn table(&self, relation: &Relation) -> NameTable {
        NameTable::for_relation(relation, self.outputs, self.inputs, self.parameters)
    }
}

/// Render `sum(coef * name) + constant`.
fn format_affine(terms: &[(BigInt, &str)], constant: &BigInt) -> String {
    let mut parts = Vec::new();
    for (c, name) in terms {
        if c.is_one() {
            parts.push(name.to_string());
        } else if *c == -BigInt::one() {
            parts.push(format!("-{}", name));
        } else {
            parts.push(format!("{}*{}", c, name));
        }
    }
    if !constant.is_zero() || parts.is_empty() {
        parts.push(constant.to_string());
    }
    parts.join(" + ").replace("+ -", "- ")
}

impl NameTable {
    /// Synthesized names for every dimension of `relation`.
    pub fn synthesized(relation: &Relation) -> Self {
        Self::for_relation(relation, None, None, None)
    }

    /// Names for `relation`, taking the given names where they exist.
    pub fn for_relation(
        relation: &Relation,
        outputs: Option<&[String]>,
        inputs: Option<&[String]>,
        parameters: Option<&[String]>,
    ) -> Self {
        Self {
            outputs: fill(outputs, relation.nb_output_dims(), output_prefix(relation.kind())),
            inputs: fill(inputs, relation.nb_input_dims(), "i"),
            locals: fill(None, relation.nb_local_dims(), "l"),
            parameters: fill(parameters, relation.nb_parameters(), "p"),
        }
    }

    pub fn names(&self, class: DimClass) -> &[String] {
        match class {
            DimClass::Output => &self.outputs,
            DimClass::Input => &self.inputs,
            DimClass::Local => &self.locals,
            DimClass::Parameter => &self.parameters,
        }
    }

    pub fn name(&self, class: DimClass, index: usize) -> Option<&str> {
        self.names(class).get(index).map(String::as_str)
    }

    /// Column header comment aligned with the printed rows.
    pub fn header(&self) -> String {
        let mut line = String::from("# e/i|");
        for class in DimClass::ALL {
            let names = self.names(class);
            if names.is_empty() {
                continue;
            }
            for name in names {
                line.push_str(&format!(" {:>4}", name));
            }
            line.push_str(" |");
        }
        line.push_str(&format!(" {:>4}", "1"));
        line
    }

    /// Affine form of row `row`, e.g. `-i + N - 1 >= 0` or `c1 == i`.
    pub fn expression(&self, relation: &Relation, row: usize) -> ScopResult<String> {
        let cells = relation.row(row)?;
        let mut terms: Vec<(DimClass, BigInt, &str)> = Vec::new();
        for class in DimClass::ALL {
            for index in 0..relation.nb_dims(class) {
                let value = cells[relation.column_of(class, index)?].to_bigint();
                if !value.is_zero() {
                    terms.push((class, value, self.name(class, index).unwrap_or("?")));
                }
            }
        }
        let constant = cells[relation.constant_column()].to_bigint();

        if !relation.is_equality(row)? {
            let all: Vec<(BigInt, &str)> = terms.into_iter().map(|(_, c, n)| (c, n)).collect();
            return Ok(format!("{} >= 0", format_affine(&all, &constant)));
        }

        let outputs: Vec<usize> = terms
            .iter()
            .enumerate()
            .filter(|(_, (class, _, _))| *class == DimClass::Output)
            .map(|(i, _)| i)
            .collect();
        if let &[pos] = outputs.as_slice() {
            if terms[pos].1.abs().is_one() {
                // c + rest == 0 becomes c == -rest, -c + rest == 0 becomes c == rest
                let factor = -terms[pos].1.clone();
                let rest: Vec<(BigInt, &str)> = terms
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != pos)
                    .map(|(_, (_, c, n))| (c * &factor, *n))
                    .collect();
                return Ok(format!(
                    "{} == {}",
                    terms[pos].2,
                    format_affine(&rest, &(&constant * &factor))
                ));
            }
        }
        let all: Vec<(BigInt, &str)> = terms.into_iter().map(|(_, c, n)| (c, n)).collect();
        Ok(format!("{} == 0", format_affine(&all, &constant)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int::Precision;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_synthesized_names() {
        let r = Relation::with_precision(RelationKind::Scattering, Precision::Double, 0, 2, 1, 1, 1);
        let table = NameTable::synthesized(&r);
        assert_eq!(table.outputs, names(&["c0", "c1"]));
        assert_eq!(table.inputs, names(&["i0"]));
        assert_eq!(table.locals, names(&["l0"]));
        assert_eq!(table.parameters, names(&["p0"]));
    }

    #[test]
    fn test_given_names_with_fallback() {
        let r = Relation::with_precision(RelationKind::Domain, Precision::Double, 0, 2, 0, 0, 2);
        let iterators = names(&["i"]);
        let params = names(&["N", "M"]);
        let table = NameTable::for_relation(&r, Some(&iterators), None, Some(&params));
        assert_eq!(table.outputs, names(&["i", "i1"]));
        assert_eq!(table.parameters, params);
        assert_eq!(table.name(DimClass::Parameter, 1), Some("M"));
        assert_eq!(table.name(DimClass::Input, 0), None);
    }

    #[test]
    fn test_expressions() {
        let r = Relation::from_rows(
            RelationKind::Scattering,
            Precision::Double,
            2,
            1,
            0,
            1,
            &[
                vec![0, -1, 0, 0, 0, 0],
                vec![0, 0, -1, 1, 0, 0],
                vec![1, 0, 0, -1, 1, -1],
                vec![0, 0, 2, 1, 0, 0],
                vec![0, 0, 0, 0, 0, 0],
            ],
        )
        .unwrap();
        let iterators = names(&["i"]);
        let params = names(&["N"]);
        let table = NameTable::for_relation(&r, None, Some(&iterators), Some(&params));
        assert_eq!(table.expression(&r, 0).unwrap(), "c0 == 0");
        assert_eq!(table.expression(&r, 1).unwrap(), "c1 == i");
        assert_eq!(table.expression(&r, 2).unwrap(), "-i + N - 1 >= 0");
        assert_eq!(table.expression(&r, 3).unwrap(), "2*c1 + i == 0");
        assert_eq!(table.expression(&r, 4).unwrap(), "0 == 0");
        assert_eq!(table.header(), "# e/i|   c0   c1 |    i |    N |    1");
    }

    #[test]
    fn test_sources_fill_each_part() {
        let a = Relation::with_precision(RelationKind::Domain, Precision::Double, 0, 1, 0, 0, 1);
        let b = Relation::with_precision(RelationKind::Domain, Precision::Double, 0, 1, 0, 2, 1);
        let iterators = names(&["i"]);
        let sources = NameSources::new(Some(&iterators), None, None);
        assert!(sources.table(&a).locals.is_empty());
        let table = sources.table(&b);
        assert_eq!(table.outputs, iterators);
        assert_eq!(table.locals, names(&["l0", "l1"]));
        assert_eq!(table.parameters, names(&["p0"]));
    }
}
