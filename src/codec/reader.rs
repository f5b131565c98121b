//! Reader for the textual exchange format.
//!
//! The reader pulls content lines from a [`TextCursor`] and builds the graph
//! program → statements → relation unions → relations → extensions. Blank
//! lines and `#` comments are skipped everywhere except inside extension
//! blocks.
//!
//! Relation headers come in two modes:
//! - relation mode: `rows columns outputs inputs locals parameters`
//! - legacy matrix mode: `rows columns`, with the dimension counts derived
//!   from the relation type and the number of parameters in scope
//!
//! Headers announcing more than [`MAX_COLUMNS`] columns are rejected before
//! anything is allocated for them.

use super::cursor::{Line, TextCursor};
use super::{END_TAG, EXTENSIONS_KEYWORD, START_TAG, STRINGS_URI};
use crate::config::ScopConfig;
use crate::extension::{ExtensionList, ExtensionRegistry, ExtensionValue};
use crate::int::{Int, Precision};
use crate::relation::{Relation, RelationKind, RelationUnion};
use crate::scop::{Scop, Statement};
use crate::utils::context;
use crate::utils::errors::{FormatError, FormatErrorKind, ScopError, ScopResult};
use log::{debug, trace};
use std::fmt;

/// Largest column count a relation header may announce.
pub const MAX_COLUMNS: usize = 1 << 16;

/// Position inside the union being read, for diagnostics.
#[derive(Debug, Clone, Copy)]
struct UnionPosition {
    part: usize,
    total: usize,
}

impl fmt::Display for UnionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "union part {} of {}, {} remaining",
            self.part + 1,
            self.total,
            self.total - self.part - 1
        )
    }
}

/// Dimension counts resolved from a relation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    nb_rows: usize,
    nb_columns: usize,
    nb_output_dims: usize,
    nb_input_dims: usize,
    nb_local_dims: usize,
    nb_parameters: usize,
}

/// Attach a line number to a format error that has none.
fn at_line(err: ScopError, line: usize) -> ScopError {
    match err {
        ScopError::Format(e) if e.line.is_none() => e.at_line(line).into(),
        other => other,
    }
}

fn looks_numeric(token: &str) -> bool {
    token
        .trim_start_matches(|c: char| c == '-' || c == '+')
        .starts_with(|c: char| c.is_ascii_digit())
}

/// Pull parser over exchange-format text.
pub struct ScopReader<'a> {
    cursor: TextCursor<'a>,
    registry: &'a ExtensionRegistry,
    precision: Precision,
    /// Parameter count used for legacy matrix headers
    parameter_hint: Option<usize>,
    position: Option<UnionPosition>,
}

impl<'a> ScopReader<'a> {
    /// Create a reader. Without a precision in `config`, the process-wide
    /// default is used (and frozen).
    pub fn new(
        text: &'a str,
        registry: &'a ExtensionRegistry,
        config: &ScopConfig,
    ) -> ScopResult<Self> {
        let precision = match config.precision {
            Some(precision) => precision,
            None => context::default_precision()?,
        };
        Ok(Self {
            cursor: TextCursor::new(text),
            registry,
            precision,
            parameter_hint: config.legacy_parameters,
            position: None,
        })
    }

    /// Precision of the relations this reader builds.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Whether only blank lines and comments remain.
    pub fn is_at_end(&mut self) -> bool {
        self.cursor.is_at_end()
    }

    /// Fail if any content remains.
    pub fn finish(&mut self) -> ScopResult<()> {
        match self.cursor.peek() {
            Some(line) => Err(self.error(
                FormatErrorKind::UnexpectedContent,
                "unexpected content after the end of input",
                &line,
            )),
            None => Ok(()),
        }
    }

    fn error(&self, kind: FormatErrorKind, message: impl Into<String>, line: &Line<'_>) -> ScopError {
        let mut message = message.into();
        if let Some(position) = self.position {
            message = format!("{} ({})", message, position);
        }
        FormatError::new(kind, message)
            .at_line(line.number)
            .with_found(line.text)
            .into()
    }

    // ---- Programs ----

    /// Read every program until the end of input.
    pub fn read_scops(&mut self) -> ScopResult<Vec<Scop>> {
        let mut scops = Vec::new();
        while !self.cursor.is_at_end() {
            scops.push(self.read_scop()?);
        }
        debug!("read {} scop(s)", scops.len());
        Ok(scops)
    }

    /// Read one program.
    pub fn read_scop(&mut self) -> ScopResult<Scop> {
        let tagged = match self.cursor.peek() {
            Some(line) if line.data().trim() == START_TAG => {
                self.cursor.next_line();
                true
            }
            _ => false,
        };

        let language = self.cursor.expect_line("language")?.data().trim().to_string();
        let context = self.read_relation_union()?;

        // Inside a program, legacy headers take the context's parameter count
        let saved_hint = self.parameter_hint.replace(context.nb_parameters());
        let result = self.read_scop_body(language, context, tagged);
        self.parameter_hint = saved_hint;
        result
    }

    fn read_scop_body(
        &mut self,
        language: String,
        context: RelationUnion,
        tagged: bool,
    ) -> ScopResult<Scop> {
        let mut scop = Scop::new(language, context);
        scop.parameters = self.read_parameters()?;

        let nb_statements = self.cursor.expect_count("number of statements")?;
        for index in 0..nb_statements {
            let stmt = self.read_statement(index)?;
            scop.statements.push(stmt);
        }

        scop.extensions = self.read_program_extensions()?;

        match self.cursor.peek() {
            Some(line) if line.data().trim() == END_TAG => {
                self.cursor.next_line();
            }
            Some(line) if tagged => {
                return Err(self.error(
                    FormatErrorKind::UnexpectedContent,
                    format!("expected {}", END_TAG),
                    &line,
                ));
            }
            None if tagged => {
                return Err(FormatError::new(
                    FormatErrorKind::UnexpectedEof,
                    format!("missing {}", END_TAG),
                )
                .at_line(self.cursor.line_number())
                .into());
            }
            _ => {}
        }

        scop.integrity_check()?;
        debug!(
            "read scop: {} parameter(s), {} statement(s), {} extension(s)",
            scop.nb_parameters(),
            scop.statements.len(),
            scop.extensions.len()
        );
        Ok(scop)
    }

    fn read_parameters(&mut self) -> ScopResult<Vec<String>> {
        let line = self.cursor.expect_line("parameter flag")?;
        match line.single_integer() {
            Some(0) => Ok(Vec::new()),
            Some(1) => {
                let (uri, text, number) = self.read_mark()?;
                if uri != STRINGS_URI {
                    return Err(FormatError::new(
                        FormatErrorKind::UnexpectedContent,
                        format!("expected <{}> block, found <{}>", STRINGS_URI, uri),
                    )
                    .at_line(number)
                    .into());
                }
                Ok(text
                    .lines()
                    .filter(|l| !l.trim_start().starts_with('#'))
                    .flat_map(str::split_whitespace)
                    .map(String::from)
                    .collect())
            }
            _ => Err(self.error(
                FormatErrorKind::UnexpectedContent,
                "expected parameter flag 0 or 1",
                &line,
            )),
        }
    }

    fn read_statement(&mut self, index: usize) -> ScopResult<Statement> {
        let nb_relations = self.cursor.expect_count("number of relations")?;
        let mut domain = None;
        let mut scattering = None;
        let mut accesses = Vec::new();

        for _ in 0..nb_relations {
            let start = self.cursor.peek();
            let union = self.read_relation_union()?;
            match union.kind() {
                Some(RelationKind::Domain) if domain.is_none() => domain = Some(union),
                Some(RelationKind::Scattering) if scattering.is_none() => scattering = Some(union),
                Some(kind) if kind.is_access() => accesses.push(union),
                kind => {
                    let message = format!(
                        "unexpected {} relation in statement {}",
                        kind.map_or("empty", RelationKind::keyword),
                        index + 1
                    );
                    return Err(match start {
                        Some(line) => self.error(FormatErrorKind::UnexpectedContent, message, &line),
                        None => FormatError::new(FormatErrorKind::UnexpectedContent, message).into(),
                    });
                }
            }
        }

        let domain = domain.ok_or_else(|| {
            FormatError::new(
                FormatErrorKind::UnexpectedContent,
                format!("statement {} has no domain", index + 1),
            )
            .at_line(self.cursor.line_number())
        })?;

        let mut stmt = Statement::new(domain);
        stmt.scattering = scattering;
        stmt.accesses = accesses;

        let nb_extensions = self.cursor.expect_count("number of statement extensions")?;
        for _ in 0..nb_extensions {
            let value = self.read_extension_block()?;
            stmt.extensions.push(value);
        }
        trace!("statement {}: {} relation(s)", index + 1, nb_relations);
        Ok(stmt)
    }

    fn read_program_extensions(&mut self) -> ScopResult<ExtensionList> {
        let mut list = ExtensionList::new();
        let counted = self
            .cursor
            .peek()
            .map_or(false, |line| line.single_integer().is_some());
        if counted {
            let count = self.cursor.expect_count("number of extensions")?;
            for _ in 0..count {
                let value = self.read_extension_block()?;
                list.push(value);
            }
            return Ok(list);
        }
        while let Some(line) = self.cursor.peek() {
            let data = line.data().trim();
            if !data.starts_with('<') || data == END_TAG || data == START_TAG {
                break;
            }
            let value = self.read_extension_block()?;
            list.push(value);
        }
        Ok(list)
    }

    // ---- Relations ----

    /// Read a relation union: type keyword, optional part count, parts.
    pub fn read_relation_union(&mut self) -> ScopResult<RelationUnion> {
        self.position = None;
        let line = self.cursor.expect_line("relation type")?;
        let kind = RelationKind::from_keyword(line.data().trim()).ok_or_else(|| {
            self.error(FormatErrorKind::UnknownRelationKind, "unknown relation type", &line)
        })?;

        let total = match self.cursor.peek() {
            Some(count_line) => match count_line.single_integer() {
                Some(n) if n < 1 => {
                    return Err(self.error(
                        FormatErrorKind::BadUnionCount,
                        format!("{} union must have at least one part", kind),
                        &count_line,
                    ));
                }
                Some(n) => {
                    self.cursor.next_line();
                    n as usize
                }
                None => 1,
            },
            None => 1,
        };

        let mut union = RelationUnion::new();
        for part in 0..total {
            self.position = Some(UnionPosition { part, total });
            let relation = self.read_relation_part(kind)?;
            union.push(relation)?;
        }
        self.position = None;
        Ok(union)
    }

    fn read_relation_part(&mut self, kind: RelationKind) -> ScopResult<Relation> {
        let line = self.cursor.expect_line("relation header")?;
        let header = self.read_header(kind, &line)?;
        let mut relation = Relation::with_precision(
            kind,
            self.precision,
            0,
            header.nb_output_dims,
            header.nb_input_dims,
            header.nb_local_dims,
            header.nb_parameters,
        );
        for row in 0..header.nb_rows {
            let cells = self.read_row(header.nb_columns, header.nb_rows - row)?;
            relation.push_row(cells)?;
        }
        if kind == RelationKind::Scattering {
            relation.infer_dim_tags();
        }

        if let Some(next) = self.cursor.peek() {
            if next.data().trim() == EXTENSIONS_KEYWORD {
                self.cursor.next_line();
                let count = self.cursor.expect_count("number of relation extensions")?;
                for _ in 0..count {
                    let value = self.read_extension_block()?;
                    relation.extensions_mut().push(value);
                }
            }
        }
        trace!("read {} relation {}", kind, relation.layout_string());
        Ok(relation)
    }

    fn read_header(&self, kind: RelationKind, line: &Line<'_>) -> ScopResult<Header> {
        let values = line
            .tokens()
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| self.error(FormatErrorKind::MalformedHeader, "non-integer in relation header", line))?;

        let header = match values.as_slice() {
            &[rows, columns, outputs, inputs, locals, parameters] => {
                let counts = [rows, columns, outputs, inputs, locals, parameters];
                if counts.iter().any(|&v| v < 0) {
                    return Err(self.error(
                        FormatErrorKind::MalformedHeader,
                        "negative count in relation header",
                        line,
                    ));
                }
                let header = Header {
                    nb_rows: rows as usize,
                    nb_columns: columns as usize,
                    nb_output_dims: outputs as usize,
                    nb_input_dims: inputs as usize,
                    nb_local_dims: locals as usize,
                    nb_parameters: parameters as usize,
                };
                let expected = [
                    header.nb_output_dims,
                    header.nb_input_dims,
                    header.nb_local_dims,
                    header.nb_parameters,
                ]
                .iter()
                .try_fold(2usize, |sum, &n| sum.checked_add(n))
                .ok_or_else(|| {
                    self.error(
                        FormatErrorKind::MalformedHeader,
                        "dimension counts overflow",
                        line,
                    )
                })?;
                if header.nb_columns != expected {
                    return Err(self.error(
                        FormatErrorKind::MalformedHeader,
                        format!(
                            "{} columns do not match the dimensions (expected {})",
                            header.nb_columns, expected
                        ),
                        line,
                    ));
                }
                header
            }
            &[rows, columns] => self.matrix_header(kind, rows, columns, line)?,
            _ => {
                return Err(self.error(
                    FormatErrorKind::MalformedHeader,
                    "relation header must hold 2 or 6 integers",
                    line,
                ));
            }
        };
        if header.nb_columns > MAX_COLUMNS {
            return Err(self.error(
                FormatErrorKind::MalformedHeader,
                format!("{} columns exceed the limit of {}", header.nb_columns, MAX_COLUMNS),
                line,
            ));
        }
        Ok(header)
    }

    /// Resolve a legacy `rows columns` header.
    fn matrix_header(
        &self,
        kind: RelationKind,
        rows: i64,
        columns: i64,
        line: &Line<'_>,
    ) -> ScopResult<Header> {
        if rows < 0 || columns < 2 {
            return Err(self.error(
                FormatErrorKind::MalformedHeader,
                "matrix header needs a non-negative row count and at least 2 columns",
                line,
            ));
        }
        if columns as u64 > MAX_COLUMNS as u64 {
            return Err(self.error(
                FormatErrorKind::MalformedHeader,
                format!("{} columns exceed the limit of {}", columns, MAX_COLUMNS),
                line,
            ));
        }
        let free = columns - 2;
        let (outputs, inputs, parameters) = if kind == RelationKind::Context {
            (0, 0, free)
        } else {
            let hint = self.parameter_hint.ok_or_else(|| {
                self.error(
                    FormatErrorKind::MissingParameterHint,
                    format!("{} matrix header needs the number of parameters", kind),
                    line,
                )
            })?;
            // a hint beyond the column limit can never fit
            let parameters = hint.min(MAX_COLUMNS + 1) as i64;
            match kind {
                RelationKind::Scattering
                | RelationKind::Read
                | RelationKind::Write
                | RelationKind::MayWrite => (rows, (free - parameters).saturating_sub(rows), parameters),
                _ => (free - parameters, 0, parameters),
            }
        };
        if outputs < 0 || inputs < 0 {
            return Err(self.error(
                FormatErrorKind::MalformedHeader,
                format!(
                    "{} columns cannot hold a {} relation with {} parameter(s)",
                    columns, kind, parameters
                ),
                line,
            ));
        }
        debug!("matrix header {} {} read as {} out, {} in, {} param", rows, columns, outputs, inputs, parameters);
        Ok(Header {
            nb_rows: rows as usize,
            nb_columns: columns as usize,
            nb_output_dims: outputs as usize,
            nb_input_dims: inputs as usize,
            nb_local_dims: 0,
            nb_parameters: parameters as usize,
        })
    }

    /// Read one matrix row. A row starts on a fresh line and may continue
    /// on the following lines.
    fn read_row(&mut self, nb_columns: usize, rows_left: usize) -> ScopResult<Vec<Int>> {
        let mut cells = Vec::new();
        while cells.len() < nb_columns {
            let line = match self.cursor.next_line() {
                Some(line) => line,
                None => {
                    let mut message = format!("input ended with {} matrix row(s) missing", rows_left);
                    if let Some(position) = self.position {
                        message = format!("{} ({})", message, position);
                    }
                    return Err(FormatError::new(FormatErrorKind::TruncatedBody, message)
                        .at_line(self.cursor.line_number())
                        .into());
                }
            };
            for token in line.tokens() {
                if cells.len() == nb_columns {
                    return Err(self.error(
                        FormatErrorKind::MalformedRow,
                        format!("row has more than {} coefficients", nb_columns),
                        &line,
                    ));
                }
                match Int::parse(self.precision, token) {
                    Ok(value) => cells.push(value),
                    Err(_) if cells.is_empty() && !looks_numeric(token) => {
                        return Err(self.error(
                            FormatErrorKind::TruncatedBody,
                            format!("matrix body ended with {} row(s) missing", rows_left),
                            &line,
                        ));
                    }
                    Err(err) => return Err(at_line(err, line.number)),
                }
            }
        }
        Ok(cells)
    }

    // ---- Extensions ----

    /// Read one `<uri> ... </uri>` block: URI, inner text and line of the
    /// opening mark. One leading and one trailing newline of the inner text
    /// are dropped.
    fn read_mark(&mut self) -> ScopResult<(String, String, usize)> {
        let line = self.cursor.expect_line("extension block")?;
        let inner = match line.text.strip_prefix('<') {
            Some(rest) if !rest.starts_with('/') => rest,
            _ => {
                return Err(self.error(
                    FormatErrorKind::UnexpectedContent,
                    "expected an extension block",
                    &line,
                ));
            }
        };
        let end = inner.find('>').ok_or_else(|| {
            self.error(FormatErrorKind::UnexpectedContent, "malformed extension mark", &line)
        })?;
        let uri = &inner[..end];
        if uri.is_empty() || uri.contains(char::is_whitespace) {
            return Err(self.error(FormatErrorKind::UnexpectedContent, "malformed extension mark", &line));
        }
        let rest = &inner[end + 1..];
        let close = format!("</{}>", uri);

        if let Some(pos) = rest.find(&close) {
            return Ok((uri.to_string(), rest[..pos].to_string(), line.number));
        }

        let mut text = rest.to_string();
        loop {
            let raw = self.cursor.next_raw().ok_or_else(|| {
                ScopError::from(
                    FormatError::new(
                        FormatErrorKind::UnterminatedExtension,
                        format!("missing {}", close),
                    )
                    .at_line(line.number)
                    .with_found(line.text),
                )
            })?;
            text.push('\n');
            if let Some(pos) = raw.text.find(&close) {
                text.push_str(&raw.text[..pos]);
                break;
            }
            text.push_str(raw.text);
        }
        let text = text.strip_prefix('\n').unwrap_or(&text);
        let text = text.strip_suffix('\n').unwrap_or(text);
        Ok((uri.to_string(), text.to_string(), line.number))
    }

    /// Read one extension block and hand it to the registry.
    pub fn read_extension_block(&mut self) -> ScopResult<ExtensionValue> {
        let (uri, text, number) = self.read_mark()?;
        self.registry
            .parse(&uri, &text)
            .map_err(|err| at_line(err, number))
    }

    /// Read an extension count followed by that many blocks.
    pub fn read_extensions(&mut self) -> ScopResult<ExtensionList> {
        let count = self.cursor.expect_count("number of extensions")?;
        let mut list = ExtensionList::new();
        for _ in 0..count {
            let value = self.read_extension_block()?;
            list.push(value);
        }
        Ok(list)
    }
}
