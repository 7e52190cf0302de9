//! Repository flows: find / find_one / find_and_count against a mock
//! execution resource, verifying dispatch counts and emitted queries.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::function;

use relquery::query_options::{FilterOperator, Predicate};
use relquery::sql_generator::SelectQuery;
use relquery::{
    EntityCatalog, ExecutionError, FindOptions, Page, QueryExecutor, QueryOptions, Repository,
    RepositoryError, Row,
};

mock! {
    Executor {}

    #[async_trait]
    impl QueryExecutor for Executor {
        async fn fetch_one(&self, query: &SelectQuery) -> Result<Option<Row>, ExecutionError>;
        async fn fetch_all(&self, query: &SelectQuery) -> Result<Vec<Row>, ExecutionError>;
        async fn fetch_and_count(
            &self,
            query: &SelectQuery,
        ) -> Result<(Vec<Row>, u64), ExecutionError>;
    }
}

fn shop_catalog() -> Arc<EntityCatalog> {
    Arc::new(
        EntityCatalog::from_yaml_str(
            r#"
entities:
  - name: order
    table: orders
    columns:
      - name: id
      - name: customer_id
        foreign_key: true
    relations:
      - property: articles
        target: article
        cardinality: one_to_many
        join_columns: [id]
        inverse_join_columns: [order_id]
  - name: article
    table: articles
    columns:
      - name: id
      - name: order_id
        foreign_key: true
      - name: price
"#,
        )
        .unwrap(),
    )
}

fn row(pairs: &[(&str, &str)]) -> Row {
    let mut row = Row::new();
    for (key, value) in pairs {
        row.insert(key.to_string(), serde_json::json!(value));
    }
    row
}

#[tokio::test]
async fn test_find_one_zero_matches_is_none_not_error() {
    let mut executor = MockExecutor::new();
    executor
        .expect_fetch_one()
        .times(1)
        .returning(|_| Ok(None));
    let repository = Repository::new(shop_catalog(), executor);

    let result = repository
        .find_one("order", &QueryOptions::default(), &FindOptions::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_find_applies_pagination_window() -> anyhow::Result<()> {
    let mut executor = MockExecutor::new();
    executor
        .expect_fetch_all()
        .with(function(|query: &SelectQuery| {
            query.offset == Some(20)
                && query.limit == Some(10)
                && query.paginated_sql().ends_with("LIMIT 10 OFFSET 20")
        }))
        .times(1)
        .returning(|_| Ok(vec![]));
    let repository = Repository::new(shop_catalog(), executor);

    let rows = repository
        .find(
            "order",
            &QueryOptions::default(),
            &FindOptions::default(),
            Page {
                offset: Some(20),
                limit: Some(10),
            },
        )
        .await?;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_find_and_count_without_pagination_counts_locally() {
    let mut executor = MockExecutor::new();
    executor
        .expect_fetch_all()
        .times(1)
        .returning(|_| Ok(vec![row(&[("orders_id", "1")]), row(&[("orders_id", "2")])]));
    // A second round trip would hit the unmocked expectation and panic.
    executor.expect_fetch_and_count().times(0);
    let repository = Repository::new(shop_catalog(), executor);

    let (rows, total) = repository
        .find_and_count(
            "order",
            &QueryOptions::default(),
            &FindOptions::default(),
            Page::unbounded(),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_find_and_count_with_pagination_is_a_single_combined_dispatch() {
    let mut executor = MockExecutor::new();
    executor
        .expect_fetch_and_count()
        .times(1)
        .returning(|_| Ok((vec![row(&[("orders_id", "3")])], 41)));
    executor.expect_fetch_all().times(0);
    let repository = Repository::new(shop_catalog(), executor);

    let (rows, total) = repository
        .find_and_count(
            "order",
            &QueryOptions::default(),
            &FindOptions::default(),
            Page {
                offset: None,
                limit: Some(1),
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(total, 41);
}

#[tokio::test]
async fn test_invalid_request_fails_before_any_dispatch() {
    let mut executor = MockExecutor::new();
    executor.expect_fetch_all().times(0);
    let repository = Repository::new(shop_catalog(), executor);

    let options = QueryOptions {
        selections: Some(vec!["bogus".to_string()]),
        ..QueryOptions::default()
    };
    let err = repository
        .find(
            "order",
            &options,
            &FindOptions::default(),
            Page::unbounded(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidQuery(_)));
    assert!(err.to_string().contains("bogus"));
}

#[tokio::test]
async fn test_execution_failure_propagates_unchanged() {
    let mut executor = MockExecutor::new();
    executor
        .expect_fetch_one()
        .times(1)
        .returning(|_| Err(ExecutionError::new("connection reset")));
    let repository = Repository::new(shop_catalog(), executor);

    let err = repository
        .find_one("order", &QueryOptions::default(), &FindOptions::default())
        .await
        .unwrap_err();
    match err {
        RepositoryError::Execution(inner) => {
            assert_eq!(inner.message, "connection reset");
        }
        other => panic!("expected execution failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_filtered_find_emits_join_and_scoped_predicate() {
    let mut executor = MockExecutor::new();
    executor
        .expect_fetch_all()
        .with(function(|query: &SelectQuery| {
            query.sql.contains(
                "LEFT JOIN articles orders_articles ON orders.id = orders_articles.order_id",
            ) && query
                .sql
                .contains("WHERE orders_articles.price > :orders_articles_price")
                && query.params.contains_key("orders_articles_price")
        }))
        .times(1)
        .returning(|_| Ok(vec![]));
    let repository = Repository::new(shop_catalog(), executor);

    let options = QueryOptions {
        where_predicates: vec![Predicate {
            field: "articles.price".to_string(),
            operator: FilterOperator::GreaterThan,
            value: "10".to_string(),
        }],
        ..QueryOptions::default()
    };
    repository
        .find("order", &options, &FindOptions::default(), Page::unbounded())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_entity_is_invalid_query() {
    let executor = MockExecutor::new();
    let repository = Repository::new(shop_catalog(), executor);

    let err = repository
        .find_one(
            "invoice",
            &QueryOptions::default(),
            &FindOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invoice"));
}
