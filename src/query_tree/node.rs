//! The query tree: a transient, per-request representation of which fields
//! and relations a query touches, mirroring the entity relation hierarchy.
//!
//! Built once per call, consumed immediately by the SQL emitter, then
//! discarded.

use serde_json::{Map, Value};

use crate::query_options::{OrderSpec, Predicate};

/// Reserved key for clauses in the debug projection; distinct from any
/// property name a schema could reasonably declare.
pub const CLAUSES_KEY: &str = "__clauses";

/// Filters and ordering scoped to one node's table level.
///
/// Clauses attached to a node apply at that node's alias only, never at a
/// descendant's scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeClauses {
    pub where_predicates: Vec<Predicate>,
    pub ordering: Vec<OrderSpec>,
}

impl NodeClauses {
    pub fn is_empty(&self) -> bool {
        self.where_predicates.is_empty() && self.ordering.is_empty()
    }
}

/// One node of the query tree.
///
/// The root node's name is the entity identifier; every other node is named
/// after the field or relation property it represents. A node is a relation
/// node iff it has children: the builder only ever constructs relation nodes
/// through the recursive relation path, and a relation subtree always selects
/// at least one target column, so the classification is unambiguous.
///
/// Sibling names are unique (duplicate selections collapse during
/// construction).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryNode {
    pub name: String,
    pub clauses: Option<NodeClauses>,
    pub children: Vec<QueryNode>,
}

impl QueryNode {
    /// A leaf field node.
    pub fn leaf(name: impl Into<String>) -> Self {
        QueryNode {
            name: name.into(),
            clauses: None,
            children: Vec::new(),
        }
    }

    pub fn is_relation(&self) -> bool {
        !self.children.is_empty()
    }

    /// Direct child lookup by name.
    pub fn child(&self, name: &str) -> Option<&QueryNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Recursive plain-object projection for diagnostics: leaf fields map to
    /// `null`, relations to nested objects, clauses nest under
    /// [`CLAUSES_KEY`]. Never used for emission.
    pub fn to_debug_value(&self) -> Value {
        let mut object = Map::new();
        if let Some(clauses) = &self.clauses {
            let mut clause_object = Map::new();
            if !clauses.where_predicates.is_empty() {
                clause_object.insert(
                    "where".to_string(),
                    serde_json::to_value(&clauses.where_predicates).unwrap_or(Value::Null),
                );
            }
            if !clauses.ordering.is_empty() {
                clause_object.insert(
                    "ordering".to_string(),
                    serde_json::to_value(&clauses.ordering).unwrap_or(Value::Null),
                );
            }
            object.insert(CLAUSES_KEY.to_string(), Value::Object(clause_object));
        }
        for child in &self.children {
            if child.is_relation() {
                object.insert(child.name.clone(), child.to_debug_value());
            } else {
                object.insert(child.name.clone(), Value::Null);
            }
        }
        Value::Object(object)
    }
}
