use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("No entity schema found for `{entity}`")]
    UnknownEntity { entity: String },
    #[error("Entity `{entity}` is defined more than once")]
    DuplicateEntity { entity: String },
    #[error("Relation `{relation}` on entity `{entity}` targets unknown entity `{target}` (define the target entity before the relation)")]
    UnknownTargetEntity {
        entity: String,
        relation: String,
        target: String,
    },
    #[error("Relation `{relation}` on entity `{entity}` has an empty join-column list (both sides of the join must name at least one column)")]
    EmptyJoinColumns { entity: String, relation: String },
    #[error("Failed to read catalog configuration: {error}")]
    ConfigRead { error: String },
    #[error("Failed to parse catalog configuration: {error}")]
    ConfigParse { error: String },
}
