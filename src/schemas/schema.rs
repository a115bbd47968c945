use jsonschema::{Draft, JSONSchema};
use schemars::{
    schema::{ObjectValidation, RootSchema, Schema, SchemaObject},
    JsonSchema,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, sync::Arc};

/// What `#[completion_schema]` captured from the struct definition.
#[derive(Clone, Copy, Debug)]
pub struct SchemaMeta {
    pub name: &'static str,
    pub type_name: &'static str,
    pub description: Option<&'static str>,
    /// `(serialized field name, doc text)`
    pub field_docs: &'static [(&'static str, &'static str)],
}

/// JSON schema for a model payload type, with its compiled validator.
#[derive(Clone)]
pub struct SchemaHandle {
    schema_name: &'static str,
    type_name: &'static str,
    schema_json: Arc<Value>,
    validator: std::result::Result<Arc<JSONSchema>, String>,
}

impl fmt::Debug for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHandle")
            .field("schema_name", &self.schema_name)
            .field("type_name", &self.type_name)
            .field("compiled", &self.validator.is_ok())
            .finish_non_exhaustive()
    }
}

impl SchemaHandle {
    /// Generate, annotate and compile the schema of `T`.
    pub fn for_type<T: JsonSchema>(meta: SchemaMeta) -> Self {
        let mut root = schemars::schema_for!(T);
        apply_doc_comments(&mut root, meta.name, meta.description, meta.field_docs);
        Self::from_root_schema(meta.name, meta.type_name, root)
    }

    pub fn from_root_schema(
        schema_name: &'static str,
        type_name: &'static str,
        root: RootSchema,
    ) -> Self {
        // RootSchema is plain data; serializing it cannot fail.
        let schema_json = serde_json::to_value(root).unwrap_or_default();
        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map(Arc::new)
            .map_err(|err| err.to_string());

        Self {
            schema_name,
            type_name,
            schema_json: Arc::new(schema_json),
            validator,
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    /// The compiled Draft-7 validator, or why compilation failed.
    pub fn validator(&self) -> std::result::Result<&JSONSchema, &str> {
        match &self.validator {
            Ok(validator) => Ok(validator.as_ref()),
            Err(reason) => Err(reason.as_str()),
        }
    }

    /// `response_format` body for OpenAI-compatible chat endpoints.
    pub fn response_format(&self) -> Value {
        serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.schema_name,
                "schema": self.schema_json.as_ref(),
            }
        })
    }
}

/// Implemented by `#[completion_schema]`.
pub trait CompletionSchema: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}

/// Copy struct and field docs into the schema metadata, keeping what schemars already set.
pub fn apply_doc_comments(
    root: &mut RootSchema,
    title: &'static str,
    description: Option<&'static str>,
    field_docs: &[(&'static str, &'static str)],
) {
    let schema_object = &mut root.schema;
    apply_struct_metadata(schema_object, title, description);

    if let Some(object_validation) = schema_object.object.as_mut() {
        apply_field_metadata(object_validation.as_mut(), field_docs);
    }
}

fn apply_struct_metadata(
    schema_object: &mut SchemaObject,
    title: &'static str,
    description: Option<&'static str>,
) {
    let metadata = schema_object.metadata();
    metadata.title.get_or_insert_with(|| title.to_string());
    if let Some(description) = description {
        metadata
            .description
            .get_or_insert_with(|| description.to_string());
    }
}

fn apply_field_metadata(
    object_validation: &mut ObjectValidation,
    field_docs: &[(&'static str, &'static str)],
) {
    for (field, doc) in field_docs {
        if let Some(Schema::Object(field_object)) = object_validation.properties.get_mut(*field) {
            field_object
                .metadata()
                .description
                .get_or_insert_with(|| (*doc).to_string());
        }
    }
}
