//! Emission behavior: joins, selections, clause compilation, leniency.

use test_case::test_case;

use relquery::query_options::{FilterOperator, OrderSpec, Predicate};
use relquery::sql_generator::{emit, SelectQueryBuilder, SqlParam};
use relquery::{build_query_tree, EntityCatalog, FindOptions, QueryOptions, SelectQuery};

fn shop_catalog() -> EntityCatalog {
    EntityCatalog::from_yaml_str(
        r#"
entities:
  - name: order
    table: orders
    columns:
      - name: id
      - name: customer_id
        foreign_key: true
      - name: price
    relations:
      - property: articles
        target: article
        cardinality: one_to_many
        join_columns: [id]
        inverse_join_columns: [order_id]
        inverse:
          join_columns: [order_id]
          inverse_join_columns: [id]
  - name: article
    table: articles
    columns:
      - name: id
      - name: order_id
        foreign_key: true
      - name: name
      - name: price
"#,
    )
    .unwrap()
}

/// Build the tree and emit it the way the repository does.
fn emit_query(catalog: &EntityCatalog, options: &QueryOptions) -> SelectQuery {
    let schema = catalog.entity("order").unwrap();
    let tree = build_query_tree(catalog, "order", options, &FindOptions::default()).unwrap();
    let root_alias = schema.table_name.clone();
    let mut builder = SelectQueryBuilder::new(schema.table_name.clone(), root_alias.clone());
    let mut selection = Vec::new();
    emit(catalog, &tree, &schema, &mut builder, &mut selection, &root_alias);
    for column_path in &selection {
        builder.select(column_path);
    }
    builder.build()
}

#[test]
fn test_filter_on_lazy_relation_joins_and_compares_on_child_alias() {
    let catalog = shop_catalog();
    let options = QueryOptions {
        where_predicates: vec![Predicate {
            field: "articles.price".to_string(),
            operator: FilterOperator::GreaterThan,
            value: "10".to_string(),
        }],
        ..QueryOptions::default()
    };
    let query = emit_query(&catalog, &options);

    assert!(query
        .sql
        .contains("LEFT JOIN articles orders_articles ON orders.id = orders_articles.order_id"));
    assert!(query
        .sql
        .contains("WHERE orders_articles.price > :orders_articles_price"));
    assert_eq!(
        query.params.get("orders_articles_price"),
        Some(&SqlParam::Text("10".to_string()))
    );
    // Default-eligible fields on both levels still selected.
    assert!(query.sql.contains("orders.customer_id AS orders_customer_id"));
    assert!(query.sql.contains("orders_articles.name AS orders_articles_name"));
}

#[test]
fn test_join_key_columns_always_selected_even_for_empty_subselection() {
    let catalog = shop_catalog();
    let options = QueryOptions {
        selections: Some(vec!["id".to_string(), "articles.name".to_string()]),
        ..QueryOptions::default()
    };
    let query = emit_query(&catalog, &options);

    // Owning side, target side, and the inverse relation's columns; the
    // selection stays deduplicated even though the inverse names the same
    // physical columns.
    assert!(query.sql.contains("orders.id AS orders_id"));
    assert!(query
        .sql
        .contains("orders_articles.order_id AS orders_articles_order_id"));
    assert_eq!(query.sql.matches("orders.id AS orders_id").count(), 1);
    assert_eq!(
        query
            .sql
            .matches("orders_articles.order_id AS orders_articles_order_id")
            .count(),
        1
    );
}

#[test]
fn test_placeholders_are_namespaced_per_level() {
    // The same field name filtered at two join levels must bind two
    // distinct parameters.
    let catalog = shop_catalog();
    let options = QueryOptions {
        where_predicates: vec![
            Predicate {
                field: "price".to_string(),
                operator: FilterOperator::GreaterOrEqual,
                value: "5".to_string(),
            },
            Predicate {
                field: "articles.price".to_string(),
                operator: FilterOperator::LessThan,
                value: "100".to_string(),
            },
        ],
        ..QueryOptions::default()
    };
    let query = emit_query(&catalog, &options);

    assert_eq!(
        query.params.get("orders_price"),
        Some(&SqlParam::Text("5".to_string()))
    );
    assert_eq!(
        query.params.get("orders_articles_price"),
        Some(&SqlParam::Text("100".to_string()))
    );
    assert!(query.sql.contains("orders.price >= :orders_price"));
    assert!(query.sql.contains("orders_articles.price < :orders_articles_price"));
}

#[test]
fn test_ordering_is_scoped_to_its_level_and_unknown_direction_dropped() {
    let catalog = shop_catalog();
    let options = QueryOptions {
        ordering: vec![
            OrderSpec {
                field: "articles.price".to_string(),
                direction: "DESC".to_string(),
            },
            OrderSpec {
                field: "id".to_string(),
                direction: "sideways".to_string(),
            },
        ],
        ..QueryOptions::default()
    };
    let query = emit_query(&catalog, &options);

    assert!(query.sql.contains("ORDER BY orders_articles.price DESC"));
    assert!(!query.sql.contains("orders.id ASC"));
    assert!(!query.sql.contains("sideways"));
}

#[test]
fn test_missing_metadata_relation_is_skipped_leniently() {
    // Build the tree against the full catalog, emit against one whose
    // `order` schema lost the `articles` relation: the subtree is skipped,
    // the rest of the query still renders, nothing panics.
    let catalog = shop_catalog();
    let bare_catalog = EntityCatalog::from_yaml_str(
        r#"
entities:
  - name: order
    table: orders
    columns:
      - name: id
      - name: customer_id
      - name: price
"#,
    )
    .unwrap();

    let options = QueryOptions {
        selections: Some(vec!["id".to_string(), "articles.name".to_string()]),
        ..QueryOptions::default()
    };
    let schema = bare_catalog.entity("order").unwrap();
    let tree = build_query_tree(&catalog, "order", &options, &FindOptions::default()).unwrap();
    let mut builder = SelectQueryBuilder::new("orders", "orders");
    let mut selection = Vec::new();
    emit(&bare_catalog, &tree, &schema, &mut builder, &mut selection, "orders");
    for column_path in &selection {
        builder.select(column_path);
    }
    let query = builder.build();

    assert!(!query.sql.contains("LEFT JOIN"));
    assert!(!query.sql.contains("orders_articles"));
    assert!(query.sql.contains("orders.id AS orders_id"));
}

#[test_case(FilterOperator::Equals, "42", "orders.price = :orders_price", SqlParam::Text("42".into()); "equals")]
#[test_case(FilterOperator::NotEquals, "42", "orders.price != :orders_price", SqlParam::Text("42".into()); "not equals")]
#[test_case(FilterOperator::LessThan, "42", "orders.price < :orders_price", SqlParam::Text("42".into()); "less than")]
#[test_case(FilterOperator::LessOrEqual, "42", "orders.price <= :orders_price", SqlParam::Text("42".into()); "less or equal")]
#[test_case(FilterOperator::GreaterThan, "42", "orders.price > :orders_price", SqlParam::Text("42".into()); "greater than")]
#[test_case(FilterOperator::GreaterOrEqual, "42", "orders.price >= :orders_price", SqlParam::Text("42".into()); "greater or equal")]
#[test_case(FilterOperator::InList, "1, 2,3", "orders.price IN (:orders_price)", SqlParam::TextList(vec!["1".into(), "2".into(), "3".into()]); "in list")]
#[test_case(FilterOperator::Contains, "4", "orders.price LIKE :orders_price", SqlParam::Text("%4%".into()); "contains")]
#[test_case(FilterOperator::StartsWith, "4", "orders.price LIKE :orders_price", SqlParam::Text("4%".into()); "starts with")]
#[test_case(FilterOperator::EndsWith, "4", "orders.price LIKE :orders_price", SqlParam::Text("%4".into()); "ends with")]
fn test_operator_compilation(
    operator: FilterOperator,
    value: &str,
    expected_fragment: &str,
    expected_param: SqlParam,
) {
    let catalog = shop_catalog();
    let options = QueryOptions {
        where_predicates: vec![Predicate {
            field: "price".to_string(),
            operator,
            value: value.to_string(),
        }],
        ..QueryOptions::default()
    };
    let query = emit_query(&catalog, &options);
    assert!(
        query.sql.contains(expected_fragment),
        "missing `{}` in `{}`",
        expected_fragment,
        query.sql
    );
    assert_eq!(query.params.get("orders_price"), Some(&expected_param));
}
