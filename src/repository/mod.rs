//! The repository facade: orchestrates tree construction, SQL emission and
//! execution for the three read operations.
//!
//! Stateless per call: every invocation re-derives the tree and query from
//! scratch against the shared read-only catalog. Concurrent calls share
//! nothing else.

pub mod errors;
pub mod executor;

use std::sync::Arc;

use crate::entity_catalog::EntityCatalog;
use crate::query_options::{FindOptions, Page, QueryOptions};
use crate::query_tree::{build_query_tree, QueryTreeError};
use crate::sql_generator::{emit, SelectQuery, SelectQueryBuilder};

pub use errors::RepositoryError;
pub use executor::{ExecutionError, QueryExecutor, Row};

pub struct Repository<E> {
    catalog: Arc<EntityCatalog>,
    executor: E,
}

impl<E: QueryExecutor> Repository<E> {
    pub fn new(catalog: Arc<EntityCatalog>, executor: E) -> Self {
        Repository { catalog, executor }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Validate the request (implicitly, via tree construction), emit the
    /// builder state and render the final query.
    fn prepare(
        &self,
        entity: &str,
        options: &QueryOptions,
        find: &FindOptions,
        page: Page,
    ) -> Result<SelectQuery, RepositoryError> {
        let schema =
            self.catalog
                .get(entity)
                .ok_or_else(|| QueryTreeError::UnknownEntity {
                    entity: entity.to_string(),
                })?;
        let tree = build_query_tree(&self.catalog, entity, options, find)?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("query tree for `{}`: {}", entity, tree.to_debug_value());
        }

        // Root alias is the table identifier; child aliases derive from it
        // along the relation path.
        let root_alias = schema.table_name.clone();
        let mut builder = SelectQueryBuilder::new(schema.table_name.clone(), root_alias.clone());
        let mut selection: Vec<String> = Vec::new();
        emit(
            &self.catalog,
            &tree,
            &schema,
            &mut builder,
            &mut selection,
            &root_alias,
        );
        for column_path in &selection {
            builder.select(column_path);
        }
        builder.offset(page.offset).limit(page.limit);

        let query = builder.build();
        log::debug!(
            "emitted SQL for `{}`: {} | params: {:?}",
            entity,
            query.paginated_sql(),
            query.params
        );
        Ok(query)
    }

    /// Fetch at most one row. Zero matches is `Ok(None)`, never an error.
    pub async fn find_one(
        &self,
        entity: &str,
        options: &QueryOptions,
        find: &FindOptions,
    ) -> Result<Option<Row>, RepositoryError> {
        let query = self.prepare(entity, options, find, Page::unbounded())?;
        let row = self.executor.fetch_one(&query).await?;
        match &row {
            Some(row) => log::debug!("find_one `{}` row: {:?}", entity, row),
            None => log::debug!("find_one `{}` matched no row", entity),
        }
        Ok(row)
    }

    /// Fetch the ordered result sequence for the requested page.
    pub async fn find(
        &self,
        entity: &str,
        options: &QueryOptions,
        find: &FindOptions,
        page: Page,
    ) -> Result<Vec<Row>, RepositoryError> {
        let query = self.prepare(entity, options, find, page)?;
        let rows = self.executor.fetch_all(&query).await?;
        if let Some(first) = rows.first() {
            log::debug!("find `{}` first row: {:?}", entity, first);
        }
        Ok(rows)
    }

    /// Fetch a page plus the total matching count.
    ///
    /// Without a pagination window the full result set is fetched once and
    /// the count derived locally, saving a round trip; with one, a single
    /// combined dispatch returns both.
    pub async fn find_and_count(
        &self,
        entity: &str,
        options: &QueryOptions,
        find: &FindOptions,
        page: Page,
    ) -> Result<(Vec<Row>, u64), RepositoryError> {
        if page.is_unbounded() {
            let rows = self.find(entity, options, find, page).await?;
            let total = rows.len() as u64;
            return Ok((rows, total));
        }
        let query = self.prepare(entity, options, find, page)?;
        let (rows, total) = self.executor.fetch_and_count(&query).await?;
        Ok((rows, total))
    }
}
