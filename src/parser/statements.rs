//! Narrowly-typed per-statement-kind facts, populated by [`super::extract`].

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

/// Small column-name vector; most clauses reference a handful of columns.
pub type ColumnVec = SmallVec<[CompactString; 8]>;

#[derive(Debug, Clone, Serialize)]
pub struct WindowFunction {
    pub name:           CompactString,
    pub partition_cols: Vec<CompactString>,
    pub order_cols:     Vec<CompactString>
}

/// Facts extracted from a `SELECT` (or set-operation / CTE built on one).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectStatement {
    pub tables:         Vec<CompactString>,
    pub cte_names:      Vec<CompactString>,
    pub where_cols:     ColumnVec,
    pub where_raw:      Option<String>,
    pub join_cols:      ColumnVec,
    pub order_cols:     ColumnVec,
    pub group_cols:     ColumnVec,
    pub having_cols:    ColumnVec,
    pub function_calls: ColumnVec,
    pub window_funcs:   Vec<WindowFunction>,
    pub limit:          Option<u64>,
    pub offset:         Option<u64>,
    pub has_union:      bool,
    pub has_distinct:   bool,
    pub has_subquery:   bool,
    pub has_order_by:   bool
}

/// Facts extracted from an `UPDATE`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStatement {
    pub tables:         Vec<CompactString>,
    pub where_cols:     ColumnVec,
    pub where_raw:      Option<String>,
    pub function_calls: ColumnVec,
    pub has_subquery:   bool
}

/// Facts extracted from a `DELETE`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteStatement {
    pub tables:         Vec<CompactString>,
    pub where_cols:     ColumnVec,
    pub where_raw:      Option<String>,
    pub function_calls: ColumnVec,
    pub has_subquery:   bool
}

/// Facts extracted from an `INSERT`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsertStatement {
    pub table:   CompactString,
    pub columns: Vec<CompactString>,
    /// True for `INSERT INTO ... SELECT ...` rather than a `VALUES` list.
    pub from_select: bool
}
