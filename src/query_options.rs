//! Inbound request types.
//!
//! A query is described declaratively: which fields and relations to select,
//! which predicates to apply and how to order, all addressed by property
//! names. Nested properties use dot-separated paths (`"articles.price"`),
//! never physical column or table names.

use serde::{Deserialize, Serialize};

/// Separator for nested property paths in selections, filters and ordering.
pub const PATH_SEPARATOR: char = '.';

/// Selection token meaning "all table-level fields of this entity".
pub const WILDCARD: &str = "*";

/// Comparison operators supported in filter predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    /// Value is a comma-separated list; each element is bound individually.
    InList,
    Contains,
    StartsWith,
    EndsWith,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

/// A single filter predicate on a (possibly nested) property path.
///
/// All predicates across all levels are AND-combined; there is no OR support
/// and no per-level grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

/// An ordering entry on a (possibly nested) property path.
///
/// `direction` is free-form on input: `asc`/`ascending` and
/// `desc`/`descending` (case-insensitive) are recognized, anything else is
/// silently dropped at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: String,
    pub direction: String,
}

/// The declarative description of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Property paths to select. `None`/empty means "select defaults":
    /// all table fields plus eligible relations.
    #[serde(default)]
    pub selections: Option<Vec<String>>,
    #[serde(default, rename = "where")]
    pub where_predicates: Vec<Predicate>,
    #[serde(default)]
    pub ordering: Vec<OrderSpec>,
}

/// Behavior switches for relation traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// When true (the default), only eager relations are selected by default;
    /// when false, every relation is.
    #[serde(default = "default_only_eager")]
    pub only_eager: bool,
    /// Entity identifiers that may be re-entered once per listed occurrence
    /// along a single relation path. An empty list forbids all cycles.
    #[serde(default)]
    pub allow_recursively: Vec<String>,
}

fn default_only_eager() -> bool {
    true
}

impl Default for FindOptions {
    fn default() -> Self {
        FindOptions {
            only_eager: true,
            allow_recursively: Vec::new(),
        }
    }
}

/// Offset/limit pagination window for `find` and `find_and_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Page {
    /// A page with neither offset nor limit - the whole result set.
    pub fn unbounded() -> Self {
        Page::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }
}
