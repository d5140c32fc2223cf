pub mod catalog;
pub mod kind;

pub use catalog::{MethodSchemaCatalog, ParamSchema};
pub use kind::Kind;
