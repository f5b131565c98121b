//! Textual exchange format.
//!
//! This module reads and writes SCoPs in the OpenScop-style text format:
//! - [`ScopReader`]: cursor-driven pull parser, comment tolerant
//! - [`ScopWriter`]: structural inverse of the reader
//! - [`NameTable`]: dimension names used in row comments
//!
//! Writing is idempotent through reading: `print(read(print(s))) == print(s)`.

pub mod cursor;
pub mod names;
pub mod reader;
pub mod writer;

pub use cursor::{Line, TextCursor};
pub use names::{NameSources, NameTable};
pub use reader::ScopReader;
pub use writer::ScopWriter;

use crate::config::ScopConfig;
use crate::extension::ExtensionRegistry;
use crate::relation::{Relation, RelationUnion};
use crate::scop::Scop;
use crate::utils::errors::ScopResult;
use std::path::Path;

/// Opening tag of a program.
pub const START_TAG: &str = "<OpenScop>";
/// Closing tag of a program.
pub const END_TAG: &str = "</OpenScop>";
/// Keyword introducing the extensions of one relation.
pub const EXTENSIONS_KEYWORD: &str = "EXTENSIONS";
/// Mark of the parameter name block.
pub const STRINGS_URI: &str = "strings";

/// Read exactly one program with the built-in extensions.
pub fn read_scop(text: &str) -> ScopResult<Scop> {
    read_scop_with(text, &ExtensionRegistry::with_defaults(), &ScopConfig::default())
}

/// Read exactly one program.
pub fn read_scop_with(
    text: &str,
    registry: &ExtensionRegistry,
    config: &ScopConfig,
) -> ScopResult<Scop> {
    let mut reader = ScopReader::new(text, registry, config)?;
    let scop = reader.read_scop()?;
    reader.finish()?;
    Ok(scop)
}

/// Read every program of a text with the built-in extensions.
pub fn read_scops(text: &str) -> ScopResult<Vec<Scop>> {
    read_scops_with(text, &ExtensionRegistry::with_defaults(), &ScopConfig::default())
}

/// Read every program of a text.
pub fn read_scops_with(
    text: &str,
    registry: &ExtensionRegistry,
    config: &ScopConfig,
) -> ScopResult<Vec<Scop>> {
    ScopReader::new(text, registry, config)?.read_scops()
}

/// Read every program of a file.
pub fn read_scop_file(
    path: impl AsRef<Path>,
    registry: &ExtensionRegistry,
    config: &ScopConfig,
) -> ScopResult<Vec<Scop>> {
    let text = std::fs::read_to_string(path)?;
    read_scops_with(&text, registry, config)
}

/// Read one standalone relation union.
pub fn read_relation(text: &str, config: &ScopConfig) -> ScopResult<RelationUnion> {
    let registry = ExtensionRegistry::with_defaults();
    let mut reader = ScopReader::new(text, &registry, config)?;
    let union = reader.read_relation_union()?;
    reader.finish()?;
    Ok(union)
}

/// Print a program with row comments.
pub fn print_scop(scop: &Scop) -> ScopResult<String> {
    print_scop_with(scop, &ScopConfig::default())
}

pub fn print_scop_with(scop: &Scop, config: &ScopConfig) -> ScopResult<String> {
    let mut writer = ScopWriter::with_config(config);
    writer.write_scop(scop)?;
    Ok(writer.take_output())
}

pub fn print_scops(scops: &[Scop], config: &ScopConfig) -> ScopResult<String> {
    let mut writer = ScopWriter::with_config(config);
    writer.write_scops(scops)?;
    Ok(writer.take_output())
}

/// Print a relation union with synthesized dimension names.
pub fn print_relation(union: &RelationUnion, config: &ScopConfig) -> ScopResult<String> {
    let mut writer = ScopWriter::with_config(config);
    writer.write_relation_union(union, &NameSources::default())?;
    Ok(writer.take_output())
}

/// Print one relation with synthesized dimension names.
pub fn relation_to_string(relation: &Relation) -> ScopResult<String> {
    let mut writer = ScopWriter::new();
    writer.write_relation(relation, &NameTable::synthesized(relation))?;
    Ok(writer.take_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int::Precision;
    use crate::relation::RelationKind;

    #[test]
    fn test_relation_round_trip() {
        let config = ScopConfig::default().with_precision(Precision::Multiple);
        let text = "SCATTERING\n2\n1 5 2 1 0 0\n0 -1 0 0 0\n2 6 2 1 1 0\n0 -1 0 0 0 1\n1 0 0 1 -1 0\n";
        let union = read_relation(text, &config).unwrap();
        let printed = print_relation(&union, &config).unwrap();
        let again = print_relation(&read_relation(&printed, &config).unwrap(), &config).unwrap();
        assert_eq!(printed, again);
    }

    #[test]
    fn test_display_uses_writer() {
        let r = Relation::from_rows(RelationKind::Domain, Precision::Double, 1, 0, 0, 0, &[vec![1, 1, 0]])
            .unwrap();
        let text = r.to_string();
        assert!(text.starts_with("DOMAIN\n1 3 1 0 0 0\n"));
        assert!(text.contains("## i0 >= 0"));
    }

    #[test]
    fn test_print_relation_names_every_part() {
        let config = ScopConfig::default().with_precision(Precision::Double);
        let text = "DOMAIN\n2\n1 3 1 0 0 0\n1 1 0\n1 4 1 0 1 0\n1 1 1 0\n";
        let printed = print_relation(&read_relation(text, &config).unwrap(), &config).unwrap();
        assert!(printed.contains("## i0 + l0 >= 0"));
        assert!(printed.contains("# e/i|   i0 |   l0 |    1"));
        assert!(!printed.contains('?'));
    }

    #[test]
    fn test_trailing_content_is_rejected() {
        let config = ScopConfig::default().with_precision(Precision::Double);
        let err = read_relation("DOMAIN\n1 3 1 0 0 0\n1 1 0\n1 1 0\n", &config).unwrap_err();
        assert!(err.format_kind().is_some());
    }
}
