//! Writer for the textual exchange format.
//!
//! Relations are always written with the six-number header
//! `rows columns outputs inputs locals parameters`. Rows use a fixed field
//! width of 4 and, when comments are enabled, end with `## <expression>`.

use super::names::{NameSources, NameTable};
use super::{END_TAG, EXTENSIONS_KEYWORD, START_TAG, STRINGS_URI};
use crate::config::ScopConfig;
use crate::extension::{ExtensionList, ExtensionValue};
use crate::relation::{Relation, RelationUnion};
use crate::scop::{Scop, Statement};
use crate::utils::errors::{invariant, InvariantErrorKind, ScopResult};
use log::debug;

/// Writer accumulating exchange-format text.
pub struct ScopWriter {
    /// Print `##` row comments and column headers
    print_comments: bool,
    /// Output buffer
    buffer: String,
}

impl Default for ScopWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self {
            print_comments: true,
            buffer: String::new(),
        }
    }

    /// Create a writer following `config`.
    pub fn with_config(config: &ScopConfig) -> Self {
        Self::new().with_comments(config.print_comments)
    }

    pub fn with_comments(mut self, print_comments: bool) -> Self {
        self.print_comments = print_comments;
        self
    }

    /// Get the output.
    pub fn output(&self) -> &str {
        &self.buffer
    }

    /// Take the output.
    pub fn take_output(self) -> String {
        self.buffer
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Write one relation as a single-part union.
    pub fn write_relation(&mut self, relation: &Relation, names: &NameTable) -> ScopResult<()> {
        self.line(relation.kind().keyword());
        self.write_relation_part(relation, names)
    }

    /// Write a union: its type keyword, its part count if above one, then each part.
    ///
    /// Each part is named from `names` on its own, parts may differ in locals.
    pub fn write_relation_union(
        &mut self,
        union: &RelationUnion,
        names: &NameSources<'_>,
    ) -> ScopResult<()> {
        let kind = union.kind().ok_or_else(|| {
            invariant(InvariantErrorKind::DimensionMismatch, "cannot write an empty union")
        })?;
        self.line(kind.keyword());
        if union.len() > 1 {
            self.line(&format!("{}", union.len()));
        }
        for (k, part) in union.iter().enumerate() {
            if union.len() > 1 {
                self.line(&format!("# Union part No.{}", k + 1));
            }
            self.write_relation_part(part, &names.table(part))?;
        }
        Ok(())
    }

    fn write_relation_part(&mut self, relation: &Relation, names: &NameTable) -> ScopResult<()> {
        self.line(&format!(
            "{} {} {} {} {} {}",
            relation.nb_rows(),
            relation.nb_columns(),
            relation.nb_output_dims(),
            relation.nb_input_dims(),
            relation.nb_local_dims(),
            relation.nb_parameters()
        ));
        if self.print_comments && relation.nb_rows() > 0 {
            self.line(&names.header());
        }
        for (r, row) in relation.rows().iter().enumerate() {
            let mut text = format!("{:>4}", row[0]);
            for cell in &row[1..] {
                text.push_str(&format!(" {:>4}", cell));
            }
            if self.print_comments {
                text.push_str("    ## ");
                text.push_str(&names.expression(relation, r)?);
            }
            self.line(&text);
        }
        if !relation.extensions().is_empty() {
            self.line(EXTENSIONS_KEYWORD);
            self.line("# Number of relation extensions");
            self.write_extension_list(relation.extensions());
        }
        Ok(())
    }

    /// Write one `<uri> ... </uri>` block.
    pub fn write_extension(&mut self, value: &ExtensionValue) {
        self.line(&format!("<{}>", value.uri()));
        self.line(&value.print());
        self.line(&format!("</{}>", value.uri()));
    }

    /// Write an extension count followed by the blocks.
    pub fn write_extension_list(&mut self, list: &ExtensionList) {
        self.line(&format!("{}", list.len()));
        for value in list {
            self.write_extension(value);
        }
    }

    /// Write a whole program.
    pub fn write_scop(&mut self, scop: &Scop) -> ScopResult<()> {
        debug!("writing scop with {} statement(s)", scop.statements.len());
        self.line(START_TAG);
        self.blank();
        self.line("# =============================================== Global");
        self.line("# Language");
        self.line(&scop.language);
        self.blank();

        self.line("# Context");
        let context_names = NameSources::new(None, None, Some(&scop.parameters));
        self.write_relation_union(&scop.context, &context_names)?;
        self.blank();

        if scop.parameters.is_empty() {
            self.line("# Parameters are not provided");
            self.line("0");
        } else {
            self.line("# Parameters are provided");
            self.line("1");
            self.line(&format!("<{}>", STRINGS_URI));
            self.line(&scop.parameters.join(" "));
            self.line(&format!("</{}>", STRINGS_URI));
        }
        self.blank();

        self.line("# Number of statements");
        self.line(&format!("{}", scop.statements.len()));
        self.blank();

        for (index, stmt) in scop.statements.iter().enumerate() {
            self.write_statement(scop, index, stmt)?;
        }

        self.line("# =============================================== Extensions");
        self.line("# Number of extensions");
        self.write_extension_list(&scop.extensions);
        self.blank();
        self.line(END_TAG);
        self.blank();
        Ok(())
    }

    /// Write several programs back to back.
    pub fn write_scops(&mut self, scops: &[Scop]) -> ScopResult<()> {
        for scop in scops {
            self.write_scop(scop)?;
        }
        Ok(())
    }

    fn write_statement(&mut self, scop: &Scop, index: usize, stmt: &Statement) -> ScopResult<()> {
        let number = index + 1;
        let iterators = stmt.iterators();
        let parameters = Some(scop.parameters.as_slice());

        self.line(&format!("# =============================================== Statement {}", number));
        self.line("# Number of relations describing the statement:");
        self.line(&format!("{}", stmt.nb_relations()));
        self.blank();

        let mut section = 1;
        self.line(&format!("# ----------------------------------------------  {}.{} Domain", number, section));
        self.write_relation_union(&stmt.domain, &NameSources::new(iterators, None, parameters))?;
        self.blank();

        if let Some(scattering) = &stmt.scattering {
            section += 1;
            self.line(&format!("# ----------------------------------------------  {}.{} Scattering", number, section));
            let names = NameSources::new(scop.scatnames(), iterators, parameters);
            self.write_relation_union(scattering, &names)?;
            self.blank();
        }

        if !stmt.accesses.is_empty() {
            section += 1;
            self.line(&format!("# ----------------------------------------------  {}.{} Access", number, section));
            let names = NameSources::new(None, iterators, parameters);
            for access in &stmt.accesses {
                self.write_relation_union(access, &names)?;
                self.blank();
            }
        }

        section += 1;
        self.line(&format!(
            "# ----------------------------------------------  {}.{} Statement Extensions",
            number, section
        ));
        self.line("# Number of Statement Extensions");
        self.write_extension_list(&stmt.extensions);
        self.blank();
        Ok(())
    }
}
