//! [`SqlContext`]: the immutable per-call unit of work the guard validates.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::parser::{ParsedStatement, SqlDialect};

/// A bound parameter value attached to a context.
///
/// Most parameters are opaque values the rules never need to inspect.
/// Pagination-related parameters are the exception: several operational
/// rules (page size limits, deep-offset detection) need to ask "does this
/// value carry pagination bounds" without caring what concrete type the
/// host's query layer uses for its page objects. [`PaginationParam`] is the
/// capability a host opts a parameter type into, instead of the guard
/// sniffing the parameter's type name.
#[derive(Clone)]
pub enum ParamEntry {
    Value(serde_json::Value),
    Pagination(Arc<dyn PaginationParam>)
}

impl fmt::Debug for ParamEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "Value({v})"),
            Self::Pagination(p) => write!(f, "Pagination({:?})", p.row_bounds())
        }
    }
}

/// Capability implemented by a host's pagination-bearing parameter types
/// (page/size DTOs, cursor objects, ...) so the guard can read effective
/// row bounds without depending on any concrete pagination crate.
pub trait PaginationParam: Send + Sync {
    fn row_bounds(&self) -> RowBounds;
}

/// Effective row window a pagination parameter resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub offset: u64,
    pub limit:  Option<u64>
}

/// The execution layer a statement is being validated on behalf of.
/// Purely informational for now; rules may use it to vary behavior (e.g.
/// a direct-JDBC layer tolerating things an ORM-mediated query wouldn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionLayer {
    /// Statement was built by an ORM/query-builder layer.
    Orm,
    /// Statement reached the guard straight off a JDBC-style connection,
    /// bypassing any ORM.
    DirectJdbc
}

impl Default for ExecutionLayer {
    fn default() -> Self {
        Self::Orm
    }
}

/// The statement kind a [`SqlContext`] resolves to after parsing. Always
/// derivable from the `statement` field; `Other` covers everything that
/// didn't parse into exactly one classifiable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other
}

impl ParsedStatement {
    pub fn kind(&self) -> StatementKind {
        match self {
            ParsedStatement::Select(_) => StatementKind::Select,
            ParsedStatement::Insert(_) => StatementKind::Insert,
            ParsedStatement::Update(_) => StatementKind::Update,
            ParsedStatement::Delete(_) => StatementKind::Delete,
            ParsedStatement::Unparsed => StatementKind::Other
        }
    }
}

/// The immutable unit of work validated by the guard: one SQL statement,
/// its dialect, its already-parsed form, and any bound parameters.
///
/// There is a single `statement` field holding the parsed representation;
/// there is no separate "raw parsed blob" field duplicating it.
#[derive(Clone)]
pub struct SqlContext {
    sql:          String,
    dialect:      SqlDialect,
    statement:    ParsedStatement,
    layer:        ExecutionLayer,
    params:       IndexMap<String, ParamEntry>,
    statement_id: Option<String>
}

impl SqlContext {
    /// Build a context from raw SQL, parsing it leniently (never errors;
    /// unparseable input becomes [`ParsedStatement::Unparsed`]).
    ///
    /// # Panics
    ///
    /// Does not panic; returns `Err` instead if `sql` is empty, since an
    /// empty statement has no meaningful kind or risk to assess.
    pub fn new(sql: impl Into<String>, dialect: SqlDialect) -> Result<Self, EmptySqlError> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(EmptySqlError);
        }
        let statement = crate::parser::parse_lenient(&sql, dialect);
        Ok(Self {
            sql,
            dialect,
            statement,
            layer: ExecutionLayer::default(),
            params: IndexMap::new(),
            statement_id: None
        })
    }

    /// Build a context around a statement that has already been parsed
    /// (e.g. retrieved from the parse cache), skipping re-parsing.
    pub fn with_parsed(
        sql: impl Into<String>,
        dialect: SqlDialect,
        statement: ParsedStatement
    ) -> Result<Self, EmptySqlError> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(EmptySqlError);
        }
        Ok(Self {
            sql,
            dialect,
            statement,
            layer: ExecutionLayer::default(),
            params: IndexMap::new(),
            statement_id: None
        })
    }

    pub fn with_layer(mut self, layer: ExecutionLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: ParamEntry) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Attach the caller-supplied identifier (e.g. a mapper/statement id
    /// from an ORM) used to whitelist specific statements from rules that
    /// would otherwise flag them, such as missing-pagination detection.
    pub fn with_statement_id(mut self, id: impl Into<String>) -> Self {
        self.statement_id = Some(id.into());
        self
    }

    /// Return a new context with a different parsed statement/kind,
    /// keeping the same raw SQL, dialect, layer, params and statement id.
    pub fn reparsed(&self, statement: ParsedStatement) -> Self {
        Self {
            sql: self.sql.clone(),
            dialect: self.dialect,
            statement,
            layer: self.layer,
            params: self.params.clone(),
            statement_id: self.statement_id.clone()
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn statement(&self) -> &ParsedStatement {
        &self.statement
    }

    pub fn kind(&self) -> StatementKind {
        self.statement.kind()
    }

    pub fn layer(&self) -> ExecutionLayer {
        self.layer
    }

    pub fn params(&self) -> &IndexMap<String, ParamEntry> {
        &self.params
    }

    pub fn statement_id(&self) -> Option<&str> {
        self.statement_id.as_deref()
    }

    /// The first bound parameter implementing [`PaginationParam`], if any.
    pub fn pagination_param(&self) -> Option<&Arc<dyn PaginationParam>> {
        self.params.values().find_map(|p| match p {
            ParamEntry::Pagination(p) => Some(p),
            ParamEntry::Value(_) => None
        })
    }
}

/// Constructing a [`SqlContext`] from blank SQL is a caller error, not a
/// validation outcome: there's nothing for a rule to assess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySqlError;

impl fmt::Display for EmptySqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot build a SqlContext from empty SQL")
    }
}

impl std::error::Error for EmptySqlError {}
