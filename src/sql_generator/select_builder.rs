//! The SELECT builder: a fluent clause accumulator.
//!
//! The emitter drives this builder; it holds no schema knowledge of its own.
//! Joins arrive fully resolved (target table, alias, ON condition) and
//! predicates arrive as rendered fragments with their named parameters.
//!
//! Rendering projects every selected column as `alias.field AS alias_field`,
//! so output columns are uniquely named by their relation path even when two
//! joined entities share bare column names.

use std::collections::HashMap;
use std::fmt::Write;

use crate::utils::push_unique;

/// Separator used when deriving child aliases, projection names and
/// placeholder names from relation paths.
pub const ALIAS_SEPARATOR: &str = "_";

/// A bound query parameter.
///
/// Placeholders render as `:name`; list values bind under a single name and
/// are expanded to driver placeholders by the execution layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    TextList(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    /// Lenient parse of an inbound direction string. `None` for anything
    /// unrecognized; callers drop such entries silently.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(OrderDirection::Ascending),
            "desc" | "descending" => Some(OrderDirection::Descending),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASC",
            OrderDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
struct JoinClause {
    table: String,
    alias: String,
    on: String,
}

/// The finished query: rendered text plus bound parameters.
///
/// `sql` carries no pagination; [`SelectQuery::paginated_sql`] appends
/// LIMIT/OFFSET. Keeping the window separate lets an executor fetch a page
/// and derive the total count from the same statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub sql: String,
    pub params: HashMap<String, SqlParam>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl SelectQuery {
    /// The statement with the pagination window applied.
    pub fn paginated_sql(&self) -> String {
        let mut sql = self.sql.clone();
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }
        sql
    }
}

/// Fluent accumulator for one SELECT statement.
#[derive(Debug, Clone)]
pub struct SelectQueryBuilder {
    table: String,
    root_alias: String,
    selections: Vec<String>,
    joins: Vec<JoinClause>,
    conditions: Vec<String>,
    params: HashMap<String, SqlParam>,
    order_by: Vec<(String, OrderDirection)>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl SelectQueryBuilder {
    pub fn new(table: impl Into<String>, root_alias: impl Into<String>) -> Self {
        SelectQueryBuilder {
            table: table.into(),
            root_alias: root_alias.into(),
            selections: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            params: HashMap::new(),
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Add an `alias.field` projection. The first call replaces the default
    /// `*` projection; duplicates collapse, keeping first-occurrence order.
    pub fn select(&mut self, column_path: &str) -> &mut Self {
        push_unique(&mut self.selections, column_path.to_string());
        self
    }

    /// Left outer join `table AS alias ON on`. Left, always: rows missing an
    /// optional relation must not drop out of the result set; filtering is
    /// expressed through WHERE, not the join type.
    pub fn left_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> &mut Self {
        self.joins.push(JoinClause {
            table: table.into(),
            alias: alias.into(),
            on: on.into(),
        });
        self
    }

    /// AND a rendered condition fragment, binding `value` under `name`.
    pub fn and_where(
        &mut self,
        fragment: impl Into<String>,
        name: impl Into<String>,
        value: SqlParam,
    ) -> &mut Self {
        self.conditions.push(fragment.into());
        self.params.insert(name.into(), value);
        self
    }

    pub fn order_by(&mut self, column_path: impl Into<String>, direction: OrderDirection) -> &mut Self {
        self.order_by.push((column_path.into(), direction));
        self
    }

    pub fn offset(&mut self, offset: Option<u64>) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.limit = limit;
        self
    }

    /// Render the accumulated clauses.
    pub fn build(self) -> SelectQuery {
        let mut sql = String::with_capacity(256);

        sql.push_str("SELECT ");
        if self.selections.is_empty() {
            // Default projection; emit paths always replace it.
            sql.push('*');
        } else {
            for (index, column_path) in self.selections.iter().enumerate() {
                if index > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(column_path);
                sql.push_str(" AS ");
                sql.push_str(&column_path.replace('.', ALIAS_SEPARATOR));
            }
        }

        let _ = write!(sql, " FROM {} {}", self.table, self.root_alias);

        for join in &self.joins {
            let _ = write!(sql, " LEFT JOIN {} {} ON {}", join.table, join.alias, join.on);
        }

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (index, (column_path, direction)) in self.order_by.iter().enumerate() {
                if index > 0 {
                    sql.push_str(", ");
                }
                let _ = write!(sql, "{} {}", column_path, direction.as_sql());
            }
        }

        SelectQuery {
            sql,
            params: self.params,
            offset: self.offset,
            limit: self.limit,
        }
    }
}
