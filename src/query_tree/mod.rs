pub mod builder;
pub mod errors;
pub mod node;

pub use builder::build_query_tree;
pub use errors::QueryTreeError;
pub use node::{NodeClauses, QueryNode, CLAUSES_KEY};
