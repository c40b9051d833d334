pub mod collection;
pub mod common;
pub mod document;
pub mod schema;

pub use collection::*;
pub use common::*;
pub use document::*;
pub use schema::*;
