//! Recursive query-tree construction.
//!
//! Transforms the flat, dot-path-addressed selection/filter/ordering
//! specification into a tree mirroring the entity relation hierarchy. Each
//! level partitions its entries into this-level fields and clauses versus
//! per-relation accumulators, validates everything against the entity's
//! schema, then recurses into the accumulated relations.
//!
//! Cycle handling: the visited list is per path, cloned at every branch
//! point and seeded with the root entity, so one branch's traversal never
//! suppresses a sibling's independent relation to the same target. An entity
//! on the visited path is only re-entered by consuming one occurrence of its
//! identifier from the `allow_recursively` list, which bounds recursion depth
//! to the number of listed allowances.

use std::collections::HashMap;

use crate::entity_catalog::{EntityCatalog, EntitySchema};
use crate::query_options::{
    FindOptions, OrderSpec, Predicate, QueryOptions, PATH_SEPARATOR, WILDCARD,
};
use crate::utils::push_unique;

use super::errors::QueryTreeError;
use super::node::{NodeClauses, QueryNode};

/// Build the query tree for `entity` from a declarative request.
///
/// Fails fast with a [`QueryTreeError`] on any unknown entity, field or
/// relation reference; no SQL is built for an invalid request.
pub fn build_query_tree(
    catalog: &EntityCatalog,
    entity: &str,
    options: &QueryOptions,
    find: &FindOptions,
) -> Result<QueryNode, QueryTreeError> {
    let schema = catalog
        .get(entity)
        .ok_or_else(|| QueryTreeError::UnknownEntity {
            entity: entity.to_string(),
        })?;
    let selections = options.selections.as_deref().unwrap_or(&[]);
    let visited = vec![schema.name.clone()];
    build_node(
        catalog,
        &schema,
        &schema.name,
        selections,
        &options.where_predicates,
        &options.ordering,
        find,
        &find.allow_recursively,
        &visited,
    )
}

/// Build one tree level. `visited` is this path's ancestry (entity
/// identifiers from the root down to and including this level);
/// `allowances` is what remains of `allow_recursively` on this path.
#[allow(clippy::too_many_arguments)]
fn build_node(
    catalog: &EntityCatalog,
    schema: &EntitySchema,
    node_name: &str,
    selections: &[String],
    predicates: &[Predicate],
    ordering: &[OrderSpec],
    find: &FindOptions,
    allowances: &[String],
    visited: &[String],
) -> Result<QueryNode, QueryTreeError> {
    let mut selected_fields: Vec<String> = Vec::new();
    // Accumulated relations, in first-mention order. The maps hold the
    // entries routed down to each relation subtree.
    let mut relation_order: Vec<String> = Vec::new();
    let mut nested_selections: HashMap<String, Vec<String>> = HashMap::new();
    let mut nested_predicates: HashMap<String, Vec<Predicate>> = HashMap::new();
    let mut nested_ordering: HashMap<String, Vec<OrderSpec>> = HashMap::new();

    // An empty selection list means "select defaults". A `*` entry expands
    // to all table fields and additionally enables default relation
    // selection at this level.
    let mut select_default_relations = selections.is_empty();
    if selections.is_empty() {
        for column in &schema.columns {
            selected_fields.push(column.property_name.clone());
        }
    } else {
        for entry in selections {
            if entry == WILDCARD {
                for column in &schema.columns {
                    push_unique(&mut selected_fields, column.property_name.clone());
                }
                select_default_relations = true;
            } else if let Some((head, rest)) = entry.split_once(PATH_SEPARATOR) {
                if !schema.is_relation(head) {
                    return Err(QueryTreeError::UnknownRelation {
                        relation: head.to_string(),
                        entity: schema.name.clone(),
                    });
                }
                nested_selections
                    .entry(head.to_string())
                    .or_default()
                    .push(rest.to_string());
                push_unique(&mut relation_order, head.to_string());
            } else if schema.is_relation(entry) {
                // Bare relation name: select it in full; the empty nested
                // selection makes the subtree use defaults.
                nested_selections.entry(entry.clone()).or_default();
                push_unique(&mut relation_order, entry.clone());
            } else if schema.has_table_field(entry) {
                push_unique(&mut selected_fields, entry.clone());
            } else {
                return Err(QueryTreeError::UnknownField {
                    field: entry.clone(),
                    entity: schema.name.clone(),
                });
            }
        }
    }

    if select_default_relations {
        for relation in &schema.relations {
            if find.only_eager && !relation.is_eager {
                continue;
            }
            nested_selections
                .entry(relation.property_name.clone())
                .or_default();
            push_unique(&mut relation_order, relation.property_name.clone());
        }
    }

    // Filters: this-level entries are validated and force-added to the
    // selection (an unselected column cannot be filtered on in the emitted
    // SQL); dotted entries are routed to their relation's subtree.
    let mut level_predicates: Vec<Predicate> = Vec::new();
    for predicate in predicates {
        if let Some((head, rest)) = predicate.field.split_once(PATH_SEPARATOR) {
            if !schema.is_relation(head) {
                return Err(QueryTreeError::UnknownRelation {
                    relation: head.to_string(),
                    entity: schema.name.clone(),
                });
            }
            let mut routed = predicate.clone();
            routed.field = rest.to_string();
            nested_predicates
                .entry(head.to_string())
                .or_default()
                .push(routed);
            push_unique(&mut relation_order, head.to_string());
        } else {
            if !schema.has_table_field(&predicate.field) {
                return Err(QueryTreeError::UnknownFilterField {
                    field: predicate.field.clone(),
                    entity: schema.name.clone(),
                });
            }
            push_unique(&mut selected_fields, predicate.field.clone());
            level_predicates.push(predicate.clone());
        }
    }

    // Ordering: same routing and force-select rules as filters.
    let mut level_ordering: Vec<OrderSpec> = Vec::new();
    for order in ordering {
        if let Some((head, rest)) = order.field.split_once(PATH_SEPARATOR) {
            if !schema.is_relation(head) {
                return Err(QueryTreeError::UnknownRelation {
                    relation: head.to_string(),
                    entity: schema.name.clone(),
                });
            }
            let mut routed = order.clone();
            routed.field = rest.to_string();
            nested_ordering
                .entry(head.to_string())
                .or_default()
                .push(routed);
            push_unique(&mut relation_order, head.to_string());
        } else {
            if !schema.has_table_field(&order.field) {
                return Err(QueryTreeError::UnknownOrderField {
                    field: order.field.clone(),
                    entity: schema.name.clone(),
                });
            }
            push_unique(&mut selected_fields, order.field.clone());
            level_ordering.push(order.clone());
        }
    }

    let mut children: Vec<QueryNode> = selected_fields.into_iter().map(QueryNode::leaf).collect();

    for relation_name in &relation_order {
        let relation = match schema.relation(relation_name) {
            Some(relation) => relation,
            // Accumulated entries were validated as relations above.
            None => continue,
        };
        let target =
            catalog
                .get(&relation.target_entity)
                .ok_or_else(|| QueryTreeError::UnknownEntity {
                    entity: relation.target_entity.clone(),
                })?;

        // Cycle rule: an already-visited target is skipped unless one
        // allowance for it remains on this path.
        let mut child_allowances = allowances.to_vec();
        if visited.iter().any(|seen| seen == &target.name) {
            match child_allowances
                .iter()
                .position(|allowed| allowed == &target.name)
            {
                Some(position) => {
                    child_allowances.remove(position);
                }
                None => {
                    let has_clauses = nested_predicates
                        .get(relation_name)
                        .is_some_and(|routed| !routed.is_empty())
                        || nested_ordering
                            .get(relation_name)
                            .is_some_and(|routed| !routed.is_empty());
                    if has_clauses {
                        log::warn!(
                            "suppressing cyclic relation `{}` on `{}`: filters/ordering routed to it are dropped",
                            relation_name,
                            schema.name
                        );
                    }
                    continue;
                }
            }
        }

        let mut child_visited = visited.to_vec();
        child_visited.push(target.name.clone());

        let child = build_node(
            catalog,
            &target,
            relation_name,
            nested_selections
                .get(relation_name)
                .map_or(&[][..], |entries| entries.as_slice()),
            nested_predicates
                .get(relation_name)
                .map_or(&[][..], |entries| entries.as_slice()),
            nested_ordering
                .get(relation_name)
                .map_or(&[][..], |entries| entries.as_slice()),
            find,
            &child_allowances,
            &child_visited,
        )?;
        children.push(child);
    }

    let clauses = NodeClauses {
        where_predicates: level_predicates,
        ordering: level_ordering,
    };
    Ok(QueryNode {
        name: node_name.to_string(),
        clauses: (!clauses.is_empty()).then_some(clauses),
        children,
    })
}
