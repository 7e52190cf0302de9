//! relquery - dynamic query building over a relational object mapper
//!
//! This crate turns a declarative request (selected fields/relations as
//! dot-separated property paths, filter predicates, ordering) against a named
//! entity into a single SQL query through:
//! - Entity catalog definitions over existing tables
//! - Recursive query-tree construction mirroring entity relations
//! - SQL emission with path-derived aliases and left joins
//! - A repository facade (find / find_and_count / find_one)

pub mod entity_catalog;
pub mod query_options;
pub mod query_tree;
pub mod repository;
pub mod sql_generator;
pub mod utils;

pub use entity_catalog::{CatalogError, EntityCatalog, EntitySchema};
pub use query_options::{FilterOperator, FindOptions, OrderSpec, Page, Predicate, QueryOptions};
pub use query_tree::{build_query_tree, QueryNode, QueryTreeError};
pub use repository::{ExecutionError, QueryExecutor, Repository, RepositoryError, Row};
pub use sql_generator::{SelectQuery, SelectQueryBuilder, SqlParam};
