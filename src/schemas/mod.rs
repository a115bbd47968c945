//! JSON schema support for model payloads.

pub mod schema;
pub mod validation;

pub use schema::{apply_doc_comments, CompletionSchema, SchemaHandle, SchemaMeta};
pub use validation::schema_violations;
