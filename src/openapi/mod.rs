//! OpenAPI/Swagger spec loading

pub mod document;
pub mod loader;
pub mod resolver;

pub use document::{MediaType, Operation, PathItem, ResponseSpec, SpecDocument, SpecVersion};
pub use loader::{document_from_value, load_spec};
pub use resolver::{dereference, Resolver};
