use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::CatalogError;

/// Relation cardinality as declared by the mapping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationCardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// A table-level (non-relation) column of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub property_name: String,
    pub is_foreign_key: bool,
}

/// Join-column pairs of the inverse side of a bidirectional relation.
///
/// When present, both sides of these columns are force-selected alongside the
/// owning relation's own join columns so the mapper can hydrate either
/// direction from the result rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverseRelationSchema {
    pub join_columns: Vec<String>,
    pub inverse_join_columns: Vec<String>,
}

/// A relation from one entity to another.
///
/// `target_entity` is an identifier resolved through the [`EntityCatalog`],
/// never a nested schema: relation graphs can contain cycles, and identifier
/// indirection keeps the catalog a plain string-keyed arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSchema {
    pub property_name: String,
    pub is_eager: bool,
    pub cardinality: RelationCardinality,
    pub target_entity: String,
    /// Physical columns on the owning (parent) side of the join.
    pub join_columns: Vec<String>,
    /// Physical columns on the target (child) side of the join.
    pub inverse_join_columns: Vec<String>,
    pub inverse: Option<InverseRelationSchema>,
}

/// Read-only metadata for one entity: its table, columns and relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity identifier, e.g. `"order"`. Keys the catalog and the
    /// cycle-detection visited list.
    pub name: String,
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
    pub relations: Vec<RelationSchema>,
}

impl EntitySchema {
    /// Names of all table-level (non-relation) fields, in declaration order.
    pub fn table_field_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|column| column.property_name.as_str())
            .collect()
    }

    pub fn has_table_field(&self, name: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.property_name == name)
    }

    pub fn relation(&self, property_name: &str) -> Option<&RelationSchema> {
        self.relations
            .iter()
            .find(|relation| relation.property_name == property_name)
    }

    pub fn is_relation(&self, property_name: &str) -> bool {
        self.relation(property_name).is_some()
    }
}

/// The schema catalog: entity identifier -> schema.
///
/// Shared read-only across concurrent calls; schemas are handed out as
/// `Arc` clones so recursive tree construction can hold several levels at
/// once without copying metadata.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: HashMap<String, Arc<EntitySchema>>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        EntityCatalog::default()
    }

    /// Register an entity schema. Fails on duplicate identifiers.
    pub fn register(&mut self, schema: EntitySchema) -> Result<(), CatalogError> {
        if self.entities.contains_key(&schema.name) {
            return Err(CatalogError::DuplicateEntity {
                entity: schema.name,
            });
        }
        self.entities.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    pub fn get(&self, entity: &str) -> Option<Arc<EntitySchema>> {
        self.entities.get(entity).cloned()
    }

    pub fn entity(&self, entity: &str) -> Result<Arc<EntitySchema>, CatalogError> {
        self.get(entity).ok_or_else(|| CatalogError::UnknownEntity {
            entity: entity.to_string(),
        })
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|name| name.as_str()).collect()
    }

    /// Cross-entity integrity checks: every relation target must resolve and
    /// both join-column lists must be non-empty.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for schema in self.entities.values() {
            for relation in &schema.relations {
                if !self.entities.contains_key(&relation.target_entity) {
                    return Err(CatalogError::UnknownTargetEntity {
                        entity: schema.name.clone(),
                        relation: relation.property_name.clone(),
                        target: relation.target_entity.clone(),
                    });
                }
                if relation.join_columns.is_empty() || relation.inverse_join_columns.is_empty() {
                    return Err(CatalogError::EmptyJoinColumns {
                        entity: schema.name.clone(),
                        relation: relation.property_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
