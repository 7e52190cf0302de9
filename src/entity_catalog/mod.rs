pub mod config;
pub mod entity_schema;
pub mod errors;


pub use config::{CatalogConfig, EntityDefinition};
pub use entity_schema::{
    ColumnSchema, EntityCatalog, EntitySchema, InverseRelationSchema, RelationCardinality,
    RelationSchema,
};
pub use errors::CatalogError;
