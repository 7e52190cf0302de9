pub mod emitter;
pub mod select_builder;

pub use emitter::emit;
pub use select_builder::{
    OrderDirection, SelectQuery, SelectQueryBuilder, SqlParam, ALIAS_SEPARATOR,
};
