//! Catalog configuration loading.
//!
//! Entity catalogs are defined in YAML (or JSON, which YAML subsumes) with
//! the following structure:
//!
//! ```yaml
//! entities:
//!   - name: order              # Entity identifier
//!     table: orders            # Physical table
//!     columns:
//!       - name: id
//!       - name: customer_id
//!         foreign_key: true
//!     relations:
//!       - property: articles   # Property name on the entity
//!         target: article      # Target entity identifier
//!         cardinality: one_to_many
//!         eager: false
//!         join_columns: [id]             # Owning-side columns
//!         inverse_join_columns: [order_id]  # Target-side columns
//!         inverse:                       # Optional inverse side
//!           join_columns: [order_id]
//!           inverse_join_columns: [id]
//! ```
//!
//! Loading validates structure before the catalog is handed out: duplicate
//! entity names, dangling relation targets and empty join-column lists are
//! all rejected with a [`CatalogError`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::entity_schema::{
    ColumnSchema, EntityCatalog, EntitySchema, InverseRelationSchema, RelationCardinality,
    RelationSchema,
};
use super::errors::CatalogError;

/// Top-level catalog configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub entities: Vec<EntityDefinition>,
}

/// One entity definition in a catalog config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub foreign_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDefinition {
    pub property: String,
    pub target: String,
    #[serde(default)]
    pub eager: bool,
    #[serde(default = "default_cardinality")]
    pub cardinality: RelationCardinality,
    pub join_columns: Vec<String>,
    pub inverse_join_columns: Vec<String>,
    #[serde(default)]
    pub inverse: Option<InverseRelationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverseRelationDefinition {
    pub join_columns: Vec<String>,
    pub inverse_join_columns: Vec<String>,
}

fn default_cardinality() -> RelationCardinality {
    RelationCardinality::ManyToOne
}

impl CatalogConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(content).map_err(|e| CatalogError::ConfigParse {
            error: e.to_string(),
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::ConfigRead {
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build and validate the catalog from this configuration.
    pub fn into_catalog(self) -> Result<EntityCatalog, CatalogError> {
        let mut catalog = EntityCatalog::new();
        for entity in self.entities {
            catalog.register(EntitySchema {
                name: entity.name,
                table_name: entity.table,
                columns: entity
                    .columns
                    .into_iter()
                    .map(|column| ColumnSchema {
                        property_name: column.name,
                        is_foreign_key: column.foreign_key,
                    })
                    .collect(),
                relations: entity
                    .relations
                    .into_iter()
                    .map(|relation| RelationSchema {
                        property_name: relation.property,
                        is_eager: relation.eager,
                        cardinality: relation.cardinality,
                        target_entity: relation.target,
                        join_columns: relation.join_columns,
                        inverse_join_columns: relation.inverse_join_columns,
                        inverse: relation.inverse.map(|inverse| InverseRelationSchema {
                            join_columns: inverse.join_columns,
                            inverse_join_columns: inverse.inverse_join_columns,
                        }),
                    })
                    .collect(),
            })?;
        }
        catalog.validate()?;
        Ok(catalog)
    }
}

impl EntityCatalog {
    /// Load a validated catalog straight from YAML content.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        CatalogConfig::from_yaml_str(content)?.into_catalog()
    }

    /// Load a validated catalog from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        CatalogConfig::from_yaml_file(path)?.into_catalog()
    }
}
