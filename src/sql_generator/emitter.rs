//! SQL emission: walk the query tree depth-first and drive the SELECT
//! builder.
//!
//! Emission trusts the tree. Construction already validated every name
//! against the same catalog snapshot, so an integrity mismatch here (a tree
//! relation with no metadata counterpart) is not re-raised: the subtree is
//! skipped with a warning and the rest of the query still renders.

use crate::entity_catalog::{EntityCatalog, EntitySchema, RelationSchema};
use crate::query_options::{FilterOperator, Predicate};
use crate::query_tree::QueryNode;
use crate::utils::push_unique;

use super::select_builder::{OrderDirection, SelectQueryBuilder, SqlParam, ALIAS_SEPARATOR};

/// Emit joins, clauses and selections for `node` and its subtree.
///
/// `selection_acc` collects `alias.field` projections across the whole walk
/// (deduplicated, first-occurrence order); the caller applies it to the
/// builder once the walk is complete. `alias` is this node's table scope,
/// derived from the relation path; the root alias is the table identifier.
pub fn emit(
    catalog: &EntityCatalog,
    node: &QueryNode,
    schema: &EntitySchema,
    builder: &mut SelectQueryBuilder,
    selection_acc: &mut Vec<String>,
    alias: &str,
) {
    for child in node.children.iter().filter(|child| !child.is_relation()) {
        push_unique(selection_acc, format!("{alias}.{}", child.name));
    }

    if let Some(clauses) = &node.clauses {
        for order in &clauses.ordering {
            match OrderDirection::parse(&order.direction) {
                Some(direction) => {
                    builder.order_by(format!("{alias}.{}", order.field), direction);
                }
                None => {
                    log::debug!(
                        "dropping ORDER BY on `{}.{}`: unrecognized direction `{}`",
                        alias,
                        order.field,
                        order.direction
                    );
                }
            }
        }
        for predicate in &clauses.where_predicates {
            let placeholder = format!("{alias}{ALIAS_SEPARATOR}{}", predicate.field);
            let (fragment, value) = compile_predicate(alias, &placeholder, predicate);
            builder.and_where(fragment, placeholder, value);
        }
    }

    for child in node.children.iter().filter(|child| child.is_relation()) {
        let Some(relation) = schema.relation(&child.name) else {
            log::warn!(
                "relation `{}` not found in metadata for `{}`; skipping subtree (schema integrity mismatch)",
                child.name,
                schema.name
            );
            continue;
        };
        let Some(target) = catalog.get(&relation.target_entity) else {
            log::warn!(
                "target entity `{}` of relation `{}.{}` not found in catalog; skipping subtree",
                relation.target_entity,
                schema.name,
                child.name
            );
            continue;
        };

        let child_alias = format!("{alias}{ALIAS_SEPARATOR}{}", child.name);

        // Join-key columns on both sides (and of the inverse side, when
        // declared) go into the selection before the join: the mapper cannot
        // hydrate the relation from result rows without them.
        for column in &relation.join_columns {
            push_unique(selection_acc, format!("{alias}.{column}"));
        }
        for column in &relation.inverse_join_columns {
            push_unique(selection_acc, format!("{child_alias}.{column}"));
        }
        if let Some(inverse) = &relation.inverse {
            for column in &inverse.join_columns {
                push_unique(selection_acc, format!("{child_alias}.{column}"));
            }
            for column in &inverse.inverse_join_columns {
                push_unique(selection_acc, format!("{alias}.{column}"));
            }
        }

        log::debug!(
            "joining `{}.{}` ({:?}) as `{}`",
            alias,
            child.name,
            relation.cardinality,
            child_alias
        );
        builder.left_join(
            target.table_name.clone(),
            child_alias.clone(),
            join_condition(alias, &child_alias, relation),
        );

        emit(catalog, child, &target, builder, selection_acc, &child_alias);
    }
}

/// `parent.owning_col = child.target_col` for every join-column pair.
fn join_condition(parent_alias: &str, child_alias: &str, relation: &RelationSchema) -> String {
    relation
        .join_columns
        .iter()
        .zip(relation.inverse_join_columns.iter())
        .map(|(owning, target)| format!("{parent_alias}.{owning} = {child_alias}.{target}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Compile one predicate into a condition fragment and its bound value.
///
/// Placeholder names are namespaced by the full path alias, so the same
/// field name filtered at different join levels binds distinct parameters.
fn compile_predicate(
    alias: &str,
    placeholder: &str,
    predicate: &Predicate,
) -> (String, SqlParam) {
    let column = format!("{alias}.{}", predicate.field);
    let value = predicate.value.clone();
    match predicate.operator {
        FilterOperator::Equals => (
            format!("{column} = :{placeholder}"),
            SqlParam::Text(value),
        ),
        FilterOperator::NotEquals => (
            format!("{column} != :{placeholder}"),
            SqlParam::Text(value),
        ),
        FilterOperator::LessThan => (
            format!("{column} < :{placeholder}"),
            SqlParam::Text(value),
        ),
        FilterOperator::LessOrEqual => (
            format!("{column} <= :{placeholder}"),
            SqlParam::Text(value),
        ),
        FilterOperator::GreaterThan => (
            format!("{column} > :{placeholder}"),
            SqlParam::Text(value),
        ),
        FilterOperator::GreaterOrEqual => (
            format!("{column} >= :{placeholder}"),
            SqlParam::Text(value),
        ),
        FilterOperator::InList => {
            let items = value
                .split(',')
                .map(|item| item.trim().to_string())
                .collect();
            (
                format!("{column} IN (:{placeholder})"),
                SqlParam::TextList(items),
            )
        }
        FilterOperator::Contains => (
            format!("{column} LIKE :{placeholder}"),
            SqlParam::Text(format!("%{value}%")),
        ),
        FilterOperator::StartsWith => (
            format!("{column} LIKE :{placeholder}"),
            SqlParam::Text(format!("{value}%")),
        ),
        FilterOperator::EndsWith => (
            format!("{column} LIKE :{placeholder}"),
            SqlParam::Text(format!("%{value}")),
        ),
    }
}
