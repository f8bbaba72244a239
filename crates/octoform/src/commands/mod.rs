pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod schema;
pub mod state;
pub mod validate;
