mod completion_schema;
mod schema_extraction;

use proc_macro::TokenStream;

/// Implements `trip_planner::schema::CompletionSchema` for a named struct.
///
/// The struct and field doc comments (keyed by their serde names) are passed
/// to `SchemaHandle::for_type`, and the resulting handle, compiled validator
/// included, is built once per type.
///
/// Accepts optional `name = "..."` and `description = "..."` overrides.
#[proc_macro_attribute]
pub fn completion_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    completion_schema::completion_schema(attr, item)
}
