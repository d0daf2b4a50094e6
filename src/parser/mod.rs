//! Dialect-aware SQL parsing facade.
//!
//! Wraps `sqlparser` behind two entry points: [`parse_lenient`], which never
//! fails (unparseable input becomes [`ParsedStatement::Unparsed`]), and
//! [`parse_strict`], which surfaces parse failures through [`AppResult`] for
//! callers that want them. The guard's own validation path always uses the
//! lenient form — per the error design, a SQL statement the parser can't
//! classify is still validated (text-scanning rules still run on it), it
//! just doesn't get AST-derived facts.

mod extract;
pub mod statements;

use compact_str::CompactString;
use indexmap::IndexSet;
use sqlparser::{
    dialect::{
        ClickHouseDialect, Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect
    },
    parser::Parser
};

use self::{
    extract::{ExtractionContext, extract_columns_from_expr, extract_from_set_expr},
    statements::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement}
};
use crate::error::{AppResult, query_parse_error};

/// SQL dialect to parse against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum SqlDialect {
    #[default]
    Generic,
    MySQL,
    PostgreSQL,
    SQLite,
    ClickHouse
}

impl SqlDialect {
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {}),
            Self::ClickHouse => Box::new(ClickHouseDialect {})
        }
    }
}

/// A statement, classified into the kind the rule catalog understands.
///
/// `Unparsed` covers everything that isn't exactly one classifiable
/// `SELECT`/`INSERT`/`UPDATE`/`DELETE`: zero statements, more than one
/// top-level statement, DDL, `SET`, metadata statements, or a genuine parse
/// failure under lenient parsing. Text-scanning rules still run against the
/// raw SQL in that case (see [`crate::rules::StatementVisitor::visit_any`]).
#[derive(Debug, Clone)]
pub enum ParsedStatement {
    Select(Box<SelectStatement>),
    Insert(Box<InsertStatement>),
    Update(Box<UpdateStatement>),
    Delete(Box<DeleteStatement>),
    Unparsed
}

/// Parse `sql` under `dialect`, never failing: anything that doesn't reduce
/// to exactly one classifiable statement becomes [`ParsedStatement::Unparsed`].
pub fn parse_lenient(sql: &str, dialect: SqlDialect) -> ParsedStatement {
    let parser_dialect = dialect.into_parser_dialect();
    match Parser::parse_sql(parser_dialect.as_ref(), sql) {
        Ok(mut statements) if statements.len() == 1 => classify(statements.remove(0)),
        _ => ParsedStatement::Unparsed
    }
}

/// Parse `sql` under `dialect`, surfacing the underlying parser error.
///
/// Unlike [`parse_lenient`], a SQL text containing zero or more than one
/// top-level statement is not an error here — it is still classified as
/// [`ParsedStatement::Unparsed`], since "multiple statements" is a rule
/// concern (see the multi-statement security rule), not a parse failure.
pub fn parse_strict(sql: &str, dialect: SqlDialect) -> AppResult<ParsedStatement> {
    let parser_dialect = dialect.into_parser_dialect();
    let mut statements =
        Parser::parse_sql(parser_dialect.as_ref(), sql).map_err(|e| query_parse_error(e.to_string()))?;
    if statements.len() == 1 {
        Ok(classify(statements.remove(0)))
    } else {
        Ok(ParsedStatement::Unparsed)
    }
}

fn classify(stmt: sqlparser::ast::Statement) -> ParsedStatement {
    use sqlparser::ast::Statement;
    match stmt {
        Statement::Query(query) => ParsedStatement::Select(Box::new(parse_select(*query))),
        Statement::Insert(insert) => ParsedStatement::Insert(Box::new(parse_insert(insert))),
        Statement::Update {
            table,
            selection,
            ..
        } => {
            let mut s = UpdateStatement::default();
            s.tables.push(table.relation.to_string().into());
            if let Some(sel) = selection {
                let mut cols = IndexSet::new();
                extract_columns_from_expr(&sel, &mut cols);
                s.where_cols = cols.into_iter().collect();
                s.where_raw = Some(sel.to_string());
            }
            ParsedStatement::Update(Box::new(s))
        }
        Statement::Delete(delete) => {
            let mut s = DeleteStatement::default();
            if let Some(sel) = &delete.selection {
                let mut cols = IndexSet::new();
                extract_columns_from_expr(sel, &mut cols);
                s.where_cols = cols.into_iter().collect();
                s.where_raw = Some(sel.to_string());
            }
            if let sqlparser::ast::FromTable::WithFromKeyword(from_items) = delete.from {
                for item in from_items {
                    s.tables.push(item.relation.to_string().into());
                }
            }
            ParsedStatement::Delete(Box::new(s))
        }
        _ => ParsedStatement::Unparsed
    }
}

fn parse_insert(insert: sqlparser::ast::Insert) -> InsertStatement {
    let from_select = insert
        .source
        .as_ref()
        .is_some_and(|q| !matches!(q.body.as_ref(), sqlparser::ast::SetExpr::Values(_)));
    InsertStatement {
        table: insert.table.to_string().into(),
        columns: insert
            .columns
            .iter()
            .map(|c| CompactString::from(c.value.as_str()))
            .collect(),
        from_select
    }
}

fn parse_select(query: sqlparser::ast::Query) -> SelectStatement {
    let mut s = SelectStatement::default();
    for cte in query.with.iter().flat_map(|w| &w.cte_tables) {
        s.cte_names.push(cte.alias.name.value.as_str().into());
    }
    if let Some(limit_clause) = &query.limit_clause {
        match limit_clause {
            sqlparser::ast::LimitClause::LimitOffset {
                limit,
                offset,
                ..
            } => {
                if let Some(sqlparser::ast::Expr::Value(val)) = limit
                    && let sqlparser::ast::Value::Number(n, _) = &val.value
                {
                    s.limit = n.parse().ok();
                }
                if let Some(offset_expr) = offset
                    && let sqlparser::ast::Expr::Value(val) = &offset_expr.value
                    && let sqlparser::ast::Value::Number(n, _) = &val.value
                {
                    s.offset = n.parse().ok();
                }
            }
            sqlparser::ast::LimitClause::OffsetCommaLimit {
                offset,
                limit,
                ..
            } => {
                if let sqlparser::ast::Expr::Value(val) = limit
                    && let sqlparser::ast::Value::Number(n, _) = &val.value
                {
                    s.limit = n.parse().ok();
                }
                if let sqlparser::ast::Expr::Value(val) = offset
                    && let sqlparser::ast::Value::Number(n, _) = &val.value
                {
                    s.offset = n.parse().ok();
                }
            }
        }
    }
    if let Some(order_by) = &query.order_by
        && let sqlparser::ast::OrderByKind::Expressions(exprs) = &order_by.kind
    {
        s.has_order_by = true;
        let mut cols = IndexSet::new();
        for expr in exprs {
            extract_columns_from_expr(&expr.expr, &mut cols);
        }
        s.order_cols = cols.into_iter().collect();
    }
    let mut tables = IndexSet::new();
    let mut where_cols = IndexSet::new();
    let mut join_cols = IndexSet::new();
    let mut group_cols = IndexSet::new();
    let mut having_cols = IndexSet::new();
    let mut function_calls = IndexSet::new();
    let mut window_funcs = Vec::new();
    let mut ctx = ExtractionContext {
        tables: &mut tables,
        where_cols: &mut where_cols,
        join_cols: &mut join_cols,
        group_cols: &mut group_cols,
        having_cols: &mut having_cols,
        function_calls: &mut function_calls,
        window_funcs: &mut window_funcs,
        has_union: &mut s.has_union,
        has_distinct: &mut s.has_distinct,
        has_subquery: &mut s.has_subquery
    };
    extract_from_set_expr(&query.body, &mut ctx);
    if let sqlparser::ast::SetExpr::Select(select) = query.body.as_ref()
        && let Some(selection) = &select.selection
    {
        s.where_raw = Some(selection.to_string());
    }
    s.tables = tables.into_iter().collect();
    s.where_cols = where_cols.into_iter().collect();
    s.join_cols = join_cols.into_iter().collect();
    s.group_cols = group_cols.into_iter().collect();
    s.having_cols = having_cols.into_iter().collect();
    s.function_calls = function_calls.into_iter().collect();
    s.window_funcs = window_funcs;
    s
}
