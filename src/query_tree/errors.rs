use thiserror::Error;

/// Invalid-argument failures raised during tree construction.
///
/// All of these are fatal to the call and surface before any SQL is built;
/// the caller must fix the request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryTreeError {
    #[error("Unknown field or relation `{field}` for entity `{entity}` (check the selection list)")]
    UnknownField { field: String, entity: String },
    #[error("Unknown relation `{relation}` for entity `{entity}` (nested paths must start with a relation property)")]
    UnknownRelation { relation: String, entity: String },
    #[error("Filter references unknown field `{field}` on entity `{entity}`")]
    UnknownFilterField { field: String, entity: String },
    #[error("Ordering references unknown field `{field}` on entity `{entity}`")]
    UnknownOrderField { field: String, entity: String },
    #[error("No entity schema found for `{entity}`")]
    UnknownEntity { entity: String },
}
