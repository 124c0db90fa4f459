//! Entry point: one [`Compiler`] per target database.

use crate::ast::{Delete, Insert, Select, Update, Values, Visible};
use crate::config::CompilerConfig;
use crate::context::StatementContext;
use crate::dialect::Dialect;
use crate::dml;
use crate::error::CompileResult;
use crate::generator::{Clock, FieldValueGenerator, GeneratorRegistry, ManagedValues, SystemClock};
use crate::row::RowAccessor;
use crate::stmt::{Stmt, StmtKind};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Compiles statement trees to SQL text plus parameters for one dialect.
///
/// A compiler holds no per-statement state and can be shared between threads.
///
/// # Example
/// ```ignore
/// let compiler = Compiler::new(CompilerConfig::new(Database::PostgreSql))?;
/// let stmt = Update::table(&user, "u")
///     .set(Assignment::set(user.field("name").unwrap(), "alice"))
///     .filter(Predicate::eq(Expr::field(user.id()), 1_i64));
/// let compiled = compiler.update(&stmt, Visible::OnlyVisible)?;
/// ```
pub struct Compiler {
    pub(crate) dialect: Box<dyn Dialect>,
    config: CompilerConfig,
    generators: GeneratorRegistry,
    pub(crate) managed: ManagedValues,
    pub(crate) clock: Arc<dyn Clock>,
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .field("generators", &self.generators)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Compiler {
    /// Create a compiler with the default generators and a system clock in the configured zone.
    pub fn new(config: CompilerConfig) -> CompileResult<Self> {
        let zone = config.zone()?;
        Ok(Self {
            dialect: config.database.dialect(),
            generators: GeneratorRegistry::with_defaults(),
            managed: ManagedValues::new(),
            clock: Arc::new(SystemClock::new(zone)),
            config,
        })
    }

    pub fn with_generators(mut self, generators: GeneratorRegistry) -> Self {
        self.generators = generators;
        self
    }

    /// Replace the clock of managed timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Generator of managed and Precede values for domain rows.
    pub fn field_generator(&self) -> FieldValueGenerator<'_> {
        FieldValueGenerator::new(&self.managed, &self.generators, self.clock.as_ref())
    }

    /// Empty context configured for this compiler, for hand-written statements.
    pub fn context(&self, kind: StmtKind, visible: Visible) -> StatementContext<'_> {
        StatementContext::new(self.dialect.as_ref(), kind)
            .with_quote_mode(self.config.identifier_quoting)
            .with_literal_mode(self.config.literal_mode)
            .with_visible(visible)
    }

    pub(crate) fn context_for(&self, kind: StmtKind, table: &str) -> StatementContext<'_> {
        self.context(kind, Visible::Both).for_table(table)
    }

    /// Compile an INSERT. Domain rows receive their generated and managed values.
    pub fn insert(&self, stmt: &mut Insert<'_>) -> CompileResult<Stmt> {
        let compiled = dml::insert::compile(self, stmt)?;
        self.log(&compiled);
        Ok(compiled)
    }

    pub fn update(&self, stmt: &Update, visible: Visible) -> CompileResult<Stmt> {
        let compiled = dml::update::compile(self, stmt, visible, None)?;
        self.log(&compiled);
        Ok(compiled)
    }

    /// Compile an UPDATE with named parameters bound once per row.
    pub fn update_batch(&self, stmt: &Update, visible: Visible, rows: &[&dyn RowAccessor]) -> CompileResult<Stmt> {
        let compiled = dml::update::compile(self, stmt, visible, Some(rows))?;
        self.log(&compiled);
        Ok(compiled)
    }

    pub fn delete(&self, stmt: &Delete, visible: Visible) -> CompileResult<Stmt> {
        let compiled = dml::delete::compile(self, stmt, visible, None)?;
        self.log(&compiled);
        Ok(compiled)
    }

    /// Compile a DELETE with named parameters bound once per row.
    pub fn delete_batch(&self, stmt: &Delete, visible: Visible, rows: &[&dyn RowAccessor]) -> CompileResult<Stmt> {
        let compiled = dml::delete::compile(self, stmt, visible, Some(rows))?;
        self.log(&compiled);
        Ok(compiled)
    }

    pub fn select(&self, stmt: &Select, visible: Visible) -> CompileResult<Stmt> {
        let mut ctx = self.context(StmtKind::Select, visible);
        ctx.append_select(stmt)?;
        let compiled = Stmt::Simple(ctx.build()?);
        self.log(&compiled);
        Ok(compiled)
    }

    /// Compile a standalone VALUES statement.
    pub fn values(&self, stmt: &Values) -> CompileResult<Stmt> {
        let mut ctx = self.context(StmtKind::Values, Visible::Both);
        ctx.append_values(stmt)?;
        let compiled = Stmt::Simple(ctx.build()?);
        self.log(&compiled);
        Ok(compiled)
    }

    fn log(&self, stmt: &Stmt) {
        match stmt {
            Stmt::Simple(s) => self.emit(s.kind(), s.table(), s.params().len(), None, s.sql()),
            Stmt::Batch(b) => self.emit(b.kind(), b.table(), b.param_count(), Some(b.rows().len()), b.sql()),
            Stmt::Pair(p) => {
                self.log(p.parent());
                self.log(p.child());
            }
        }
    }

    fn emit(&self, kind: StmtKind, table: Option<&str>, param_count: usize, rows: Option<usize>, sql: &str) {
        let sql = truncate_sql(sql, self.config.log_sql_max_len);
        debug!(
            target: "armsql.sql",
            dialect = self.dialect.name(),
            kind = %kind,
            table = table.unwrap_or("-"),
            param_count,
            rows,
            sql = %sql,
            "compiled"
        );
    }
}

/// Truncate `sql` to at most `max` bytes on a character boundary.
pub(crate) fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => {
            let mut end = max;
            while end > 0 && !sql.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &sql[..end])
        }
        _ => sql.to_string(),
    }
}
