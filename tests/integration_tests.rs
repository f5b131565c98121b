//! Integration tests for reading, rewriting and querying SCoP files.

use polyscop::beta::{
    beta_from, check_unique_betas, count_with_prefix, extract_betas, max_beta_under_prefix,
    relations_with_prefix, BetaValue,
};
use polyscop::codec::{self, ScopReader};
use polyscop::extension::{Body, Comment, ExtensionRegistry, ScatNames, Unknown};
use polyscop::prelude::*;

const MATMUL: &str = include_str!("data/matmul.scop");
const LEGACY: &str = include_str!("data/legacy.scop");

fn config() -> ScopConfig {
    ScopConfig::default().with_precision(Precision::Double)
}

fn read(text: &str) -> Scop {
    codec::read_scop_with(text, &ExtensionRegistry::with_defaults(), &config())
        .expect("Failed to read scop")
}

fn print(scop: &Scop) -> String {
    codec::print_scop_with(scop, &config()).expect("Failed to print scop")
}

fn prefix(values: &[i64]) -> Beta {
    let mut p = beta_from(values);
    p.push(BetaValue::Wildcard);
    p
}

#[test]
fn test_matmul_structure() {
    let scop = read(MATMUL);

    assert_eq!(scop.language, "C");
    assert_eq!(scop.parameters, vec!["N"]);
    assert_eq!(scop.nb_parameters(), 1);
    assert_eq!(scop.statements.len(), 2);

    let s1 = &scop.statements[0];
    assert_eq!(s1.depth(), 2);
    assert_eq!(s1.nb_relations(), 3);
    assert_eq!(s1.iterators().unwrap(), ["i", "j"]);
    assert_eq!(s1.writes().count(), 1);
    assert_eq!(s1.reads().count(), 0);

    let s2 = &scop.statements[1];
    assert_eq!(s2.depth(), 3);
    assert_eq!(s2.nb_relations(), 6);
    assert_eq!(s2.reads().count(), 3);
    let body = s2.extensions.get::<Body>().unwrap();
    assert_eq!(body.expression(), "C[i][j] = C[i][j] + A[i][k] * B[k][j];");

    assert_eq!(scop.scatnames().unwrap().len(), 7);
    let foo = scop.extensions.find("foo").unwrap();
    assert_eq!(foo.print(), "hello");
    assert!(foo.downcast_ref::<Unknown>().is_some());
}

#[test]
fn test_matmul_print_is_idempotent() {
    let scop = read(MATMUL);
    let printed = print(&scop);
    let reread = read(&printed);
    assert!(scop.equal(&reread).unwrap());
    assert_eq!(print(&reread), printed);
}

#[test]
fn test_printed_rows_carry_names() {
    let printed = print(&read(MATMUL));
    assert!(printed.contains("## -i + N - 1 >= 0"));
    assert!(printed.contains("## i == i"));
    assert!(printed.contains("# e/i|   b0    i   b1    j   b2 |    i    j |    N |    1"));
    assert!(printed.contains("<foo>\nhello\n</foo>"));
}

#[test]
fn test_scattering_dims_are_tagged() {
    let scop = read(MATMUL);
    let scattering = scop.statements[1].scattering.as_ref().unwrap().first().unwrap();
    let kinds: Vec<bool> = scattering.dim_tags().iter().map(DimTag::is_beta).collect();
    assert_eq!(kinds, vec![true, false, true, false, true, false, true]);
    assert_eq!(
        scattering.classify_row(4).unwrap(),
        RowClass::BetaEquation { dim: 4 }
    );
    assert_eq!(scattering.classify_row(5).unwrap(), RowClass::AlphaEquation);
}

#[test]
fn test_matmul_betas() {
    let scop = read(MATMUL);
    let betas = extract_betas(&scop).unwrap();
    assert_eq!(betas, vec![beta_from(&[0, 0, 0]), beta_from(&[0, 0, 1, 0])]);
    check_unique_betas(&scop).unwrap();

    let under_j = prefix(&[0, 0]);
    assert_eq!(count_with_prefix(&scop, &under_j).unwrap(), 2);
    assert_eq!(max_beta_under_prefix(&scop, &under_j).unwrap(), Some(1));

    let under_k = prefix(&[0, 0, 1]);
    let matches = relations_with_prefix(&scop, &under_k).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].statement, 1);
    assert_eq!(matches[0].part, 0);
}

#[test]
fn test_unknown_extension_fallback() {
    let registry = ExtensionRegistry::new();
    let text = "C\nCONTEXT\n0 2 0 0 0 0\n0\n0\n<foo>hello</foo>\n";
    let scop = codec::read_scop_with(text, &registry, &config()).unwrap();
    let value = scop.extensions.find("foo").unwrap();
    assert_eq!(value.print(), "hello");

    let printed = codec::print_scop_with(&scop, &config()).unwrap();
    assert!(printed.contains("# Number of extensions\n1\n<foo>\nhello\n</foo>\n"));
}

#[test]
fn test_unregistered_builtin_is_kept_verbatim() {
    let mut registry = ExtensionRegistry::with_defaults();
    registry.unregister("body");
    let scop = codec::read_scop_with(MATMUL, &registry, &config()).unwrap();
    assert!(scop.statements[0].iterators().is_none());
    let body = scop.statements[0].extensions.find("body").unwrap();
    assert!(body.print().ends_with("C[i][j] = 0;"));
}

#[test]
fn test_legacy_matrix_headers() {
    let scop = read(LEGACY);
    let stmt = &scop.statements[0];
    let domain = stmt.domain.first().unwrap();
    assert_eq!(domain.nb_output_dims(), 1);
    assert_eq!(domain.nb_parameters(), 1);

    let scattering = stmt.scattering.as_ref().unwrap().first().unwrap();
    assert_eq!(scattering.nb_output_dims(), 3);
    assert_eq!(scattering.nb_input_dims(), 1);

    let printed = print(&scop);
    assert!(printed.contains("\n3 7 3 1 0 1\n"));
    assert_eq!(print(&read(&printed)), printed);
}

#[test]
fn test_legacy_relation_needs_hint() {
    let text = "DOMAIN\n2 4\n1 1 0 0\n1 -1 1 -1\n";
    let err = codec::read_relation(text, &config()).unwrap_err();
    assert_eq!(err.format_kind(), Some(FormatErrorKind::MissingParameterHint));

    let union = codec::read_relation(text, &config().with_legacy_parameters(1)).unwrap();
    assert_eq!(union.nb_output_dims(), 1);
    assert_eq!(union.nb_parameters(), 1);
}

#[test]
fn test_multiple_scops() {
    let text = format!("{}\n{}", MATMUL, MATMUL);
    let scops = codec::read_scops_with(&text, &ExtensionRegistry::with_defaults(), &config()).unwrap();
    assert_eq!(scops.len(), 2);
    assert!(scops[0].equal(&scops[1]).unwrap());

    let printed = codec::print_scops(&scops, &config()).unwrap();
    assert_eq!(printed.matches("<OpenScop>").count(), 2);
}

#[test]
fn test_truncated_body_reports_line() {
    let text = "C\nCONTEXT\n0 3 0 0 0 1\n0\n1\n1\nDOMAIN\n3 4 1 0 0 1\n1 1 0 0\n1 -1 1 -1\nSCATTERING\n";
    let err = codec::read_scop_with(text, &ExtensionRegistry::with_defaults(), &config()).unwrap_err();
    match err {
        ScopError::Format(e) => {
            assert_eq!(e.kind, FormatErrorKind::TruncatedBody);
            assert_eq!(e.line, Some(11));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_end_tag() {
    let text = "<OpenScop>\nC\nCONTEXT\n0 2 0 0 0 0\n0\n0\n0\n";
    let err = codec::read_scop_with(text, &ExtensionRegistry::with_defaults(), &config()).unwrap_err();
    assert_eq!(err.format_kind(), Some(FormatErrorKind::UnexpectedEof));
}

#[test]
fn test_arbitrary_precision_program() {
    let text = "C\nCONTEXT\n1 3 0 0 0 1\n1 1 -123456789012345678901234567890\n0\n0\n";
    let registry = ExtensionRegistry::with_defaults();

    let err = codec::read_scop_with(text, &registry, &config()).unwrap_err();
    assert_eq!(err.format_kind(), Some(FormatErrorKind::MalformedNumber));

    let big = ScopConfig::default().with_precision(Precision::Multiple);
    let scop = codec::read_scop_with(text, &registry, &big).unwrap();
    let printed = codec::print_scop_with(&scop, &big).unwrap();
    assert!(printed.contains("-123456789012345678901234567890"));
}

#[test]
fn test_edit_then_print() {
    let mut scop = read(MATMUL);
    let stmt = &mut scop.statements[0];
    stmt.extensions.push(Comment::new("initialisation"));
    let scattering = stmt.scattering.as_mut().unwrap();
    let part = &mut scattering.parts_mut()[0];
    part.set_i64(4, part.constant_column(), 5).unwrap();

    let printed = print(&scop);
    let reread = read(&printed);
    assert_eq!(
        extract_betas(&reread).unwrap()[0],
        beta_from(&[0, 0, 5])
    );
    assert_eq!(
        reread.statements[0].extensions.get::<Comment>().unwrap().text(),
        "initialisation"
    );
}

#[test]
fn test_reader_stops_between_scops() {
    let registry = ExtensionRegistry::with_defaults();
    let text = format!("{}{}", MATMUL, MATMUL);
    let mut reader = ScopReader::new(&text, &registry, &config()).unwrap();
    reader.read_scop().unwrap();
    assert!(!reader.is_at_end());
    reader.read_scop().unwrap();
    assert!(reader.is_at_end());
    reader.finish().unwrap();
}

#[test]
fn test_scatnames_extension_type() {
    let scop = read(MATMUL);
    let names = scop.extensions.get::<ScatNames>().unwrap();
    assert_eq!(names.names()[0], "b0");
}
