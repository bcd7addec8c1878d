//! OpenAPI document structs for serde deserialization.
//!
//! This module models the subset of OpenAPI 3 the generator walks: paths with
//! their `get`/`put`/`post`/`delete` operations, parameters, JSON bodies and
//! component schemas carrying the Beamable `x-beamable-*` extensions.
//! Maps are `BTreeMap`s so iteration order never depends on source key order.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::GenError;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Root OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct OpenApiDocument {
    /// Document metadata. The title drives service naming.
    pub info: Info,
    /// Routes by path template.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable component schemas.
    #[serde(default)]
    pub components: Option<Components>,
}

/// Document metadata.
#[derive(Debug, Deserialize)]
pub struct Info {
    /// Service title, for example `"inventory basic"`.
    pub title: String,
    /// Service version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Components section containing reusable schemas.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    /// Named schemas.
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

/// HTTP verbs the generator binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl HttpVerb {
    /// Capitalized verb, used as endpoint name prefix.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Put => "Put",
            Self::Post => "Post",
            Self::Delete => "Delete",
        }
    }

    /// Upper-case verb as used on the wire.
    pub const fn as_upper(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Declared operations in the fixed order Get, Put, Post, Delete.
    pub fn operations(&self) -> impl Iterator<Item = (HttpVerb, &Operation)> {
        [
            (HttpVerb::Get, self.get.as_ref()),
            (HttpVerb::Put, self.put.as_ref()),
            (HttpVerb::Post, self.post.as_ref()),
            (HttpVerb::Delete, self.delete.as_ref()),
        ]
        .into_iter()
        .filter_map(|(verb, op)| op.map(|op| (verb, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Free-form description.
    pub description: Option<String>,
    /// Path, query, header and cookie parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request body.
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    /// Security requirements. Each entry maps a scheme name to its scopes.
    #[serde(default)]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Path template segment.
    Path,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

/// An operation parameter.
#[derive(Debug, Deserialize)]
pub struct Parameter {
    /// Parameter name as sent on the wire.
    pub name: String,
    /// Location of the parameter.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter must be present.
    #[serde(default)]
    pub required: bool,
    /// Free-form description, used as the property brief.
    pub description: Option<String>,
    /// Parameter schema.
    pub schema: Option<Schema>,
    /// Retyping hint for `objectId` path parameters.
    #[serde(rename = "x-beamable-object-id")]
    pub object_id: Option<ObjectIdType>,
}

impl Parameter {
    /// Path parameters are always required, whatever the document says.
    pub fn is_required(&self) -> bool {
        self.required || self.location == ParameterLocation::Path
    }
}

/// Type and format an `objectId` parameter should be bound as.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectIdType {
    /// OpenAPI type name.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// OpenAPI format.
    pub format: Option<String>,
}

/// A request body definition.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    /// Content by media type.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Default, Deserialize)]
pub struct Response {
    /// Free-form description.
    pub description: Option<String>,
    /// Content by media type.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
}

/// Value of the `additionalProperties` keyword.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows any value, `false` forbids extra keys.
    Bool(bool),
    /// Schema every value must match.
    Schema(Box<Schema>),
}

/// JSON Schema object (subset).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// `type` keyword.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// `format` keyword.
    pub format: Option<String>,
    /// `$ref` to a component schema.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Object properties.
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,
    /// Required property names.
    #[serde(default)]
    pub required: Vec<String>,
    /// Array element schema.
    pub items: Option<Box<Schema>>,
    /// Enum values.
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<serde_json::Value>,
    /// Polymorphic branches.
    #[serde(default)]
    pub one_of: Vec<Schema>,
    /// Map value schema or flag.
    pub additional_properties: Option<AdditionalProperties>,
    /// Default value.
    pub default: Option<serde_json::Value>,
    /// Free-form description.
    pub description: Option<String>,
    /// Domain primitive tag (`Cid`, `Gamertag`, ...).
    #[serde(rename = "x-beamable-semantic-type")]
    pub semantic_type: Option<String>,
    /// Marks an untyped JSON blob.
    #[serde(rename = "x-beamable-json-object")]
    pub json_object: Option<bool>,
}

impl Schema {
    /// Name of the referenced component, if this schema is a `$ref`.
    pub fn ref_name(&self) -> Option<&str> {
        self.reference.as_deref().map(ref_name)
    }

    /// Whether extra keys are allowed. Absent or `true` allows them.
    pub fn additional_properties_allowed(&self) -> bool {
        !matches!(self.additional_properties, Some(AdditionalProperties::Bool(false)))
    }

    /// Schema constraining map values, when one is given.
    pub fn additional_properties_schema(&self) -> Option<&Schema> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    /// String enum values, in declaration order.
    pub fn string_enum_values(&self) -> Vec<&str> {
        self.enum_values
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect()
    }

    /// Whether the schema declares enum values.
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// Last segment of a `$ref`.
pub fn ref_name(reference: &str) -> &str {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .unwrap_or_else(|| reference.rsplit('/').next().unwrap_or(reference))
}

impl OpenApiDocument {
    /// Parse a JSON document. `document` labels the input in errors.
    pub fn from_json(document: &str, content: &str) -> Result<Self, GenError> {
        serde_json::from_str(content).map_err(|e| GenError::Parse {
            document: document.to_string(),
            message: format!("Failed to parse OpenAPI document: {e}"),
        })
    }

    /// Parse a YAML document. `document` labels the input in errors.
    pub fn from_yaml(document: &str, content: &str) -> Result<Self, GenError> {
        serde_yaml::from_str(content).map_err(|e| GenError::Parse {
            document: document.to_string(),
            message: format!("Failed to parse OpenAPI document: {e}"),
        })
    }

    /// Component schemas, empty when the document declares none.
    pub fn schemas(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.components.iter().flat_map(|c| c.schemas.iter())
    }

    /// Look up a `$ref` in this document.
    pub fn resolve_ref(&self, reference: &str) -> Result<&Schema, GenError> {
        let name = ref_name(reference);
        self.components
            .as_ref()
            .and_then(|c| c.schemas.get(name))
            .ok_or_else(|| GenError::UnknownRef {
                reference: reference.to_string(),
                document: self.info.title.clone(),
            })
    }

    /// Follow a `$ref` if the schema is one, otherwise return the schema itself.
    pub fn effective<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, GenError> {
        match &schema.reference {
            Some(reference) => self.resolve_ref(reference),
            None => Ok(schema),
        }
    }
}

/// A component schema together with the document that declares it.
#[derive(Debug, Clone, Copy)]
pub struct NamedSchema<'a> {
    /// Component name.
    pub name: &'a str,
    /// The schema.
    pub schema: &'a Schema,
    /// Index of the owning document.
    pub document: usize,
}

/// Every component schema of every document, in document order then name order.
pub fn ordered_schemas(documents: &[OpenApiDocument]) -> Vec<NamedSchema<'_>> {
    documents
        .iter()
        .enumerate()
        .flat_map(|(document, doc)| {
            doc.schemas().map(move |(name, schema)| NamedSchema {
                name,
                schema,
                document,
            })
        })
        .collect()
}
