//! Schema to Unreal type resolution.
//!
//! [`Resolver::resolve`] walks one schema node and returns both the public
//! (overridden) and the structural form of its Unreal type. The cases are tried
//! in a fixed order and the first match wins:
//!
//! 1. semantic tag
//! 2. untyped JSON blob
//! 3. hand-written replacement types
//! 4. `oneOf` unions
//! 5. `date-time` and `uuid` strings
//! 6. `$ref`
//! 7. maps
//! 8. arrays
//! 9. primitives
//!
//! Anything else resolves to `None` and the caller skips the field.

use std::collections::BTreeMap;

use unreal_apigen_common::{GenerationMode, GenerationPassMemo, GeneratorConfig};

use crate::error::GenError;
use crate::openapi::spec::{NamedSchema, OpenApiDocument, Schema};

use super::collisions::{
    field_handle, parameter_owner, EndpointNaming, RequiredFields, SchemaNamer, ServiceNaming,
};
use super::types::{Primitive, ResolvedType, SemanticKind, UnionMember, UnrealType};
use super::utils::{capitalize, include_statement, sanitize};

/// Switches that suppress parts of the resolution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveFlags {
    /// Ignore the required map and never produce an optional.
    pub never_optional: bool,
    /// Skip the semantic tag case and resolve the underlying primitive.
    pub never_semantic: bool,
}

impl ResolveFlags {
    /// Honour every case.
    pub const NONE: Self = Self {
        never_optional: false,
        never_semantic: false,
    };

    /// Resolve the value type of a field.
    pub const NON_OPTIONAL: Self = Self {
        never_optional: true,
        never_semantic: false,
    };

    /// Resolve the wire type of a semantically tagged field.
    pub const SERIALIZATION: Self = Self {
        never_optional: true,
        never_semantic: true,
    };
}

/// Header a generated type is emitted to, relative to the output root.
pub fn generated_header_path(config: &GeneratorConfig, ty: &UnrealType) -> Option<String> {
    let hdr = &config.header_path;
    let ns = ty.namespaced();
    match ty {
        UnrealType::Enum(_) => Some(format!("{hdr}AutoGen/Enums/{ns}.h")),
        UnrealType::Optional(_) => Some(format!("{hdr}AutoGen/Optionals/{ns}.h")),
        UnrealType::ArrayWrapper(_) => Some(format!("{hdr}AutoGen/Arrays/{ns}.h")),
        UnrealType::MapWrapper(_) => Some(format!("{hdr}AutoGen/Maps/{ns}.h")),
        UnrealType::Object(_) | UnrealType::Union(_) => Some(format!("{hdr}AutoGen/{ns}.h")),
        UnrealType::Primitive(_)
        | UnrealType::Semantic(_)
        | UnrealType::ClientPermission
        | UnrealType::JsonObject
        | UnrealType::PlainTextResponse
        | UnrealType::Array(_)
        | UnrealType::Map(_) => None,
    }
}

/// Resolves schemas of any document against the shared naming state.
#[derive(Debug)]
pub struct Resolver<'a> {
    documents: &'a [OpenApiDocument],
    config: &'a GeneratorConfig,
    memo: &'a GenerationPassMemo,
    namer: &'a SchemaNamer<'a>,
    required: &'a RequiredFields,
}

impl<'a> Resolver<'a> {
    /// Bundle the inputs resolution depends on.
    pub fn new(
        documents: &'a [OpenApiDocument],
        config: &'a GeneratorConfig,
        memo: &'a GenerationPassMemo,
        namer: &'a SchemaNamer<'a>,
        required: &'a RequiredFields,
    ) -> Self {
        Self {
            documents,
            config,
            memo,
            namer,
            required,
        }
    }

    /// The generator configuration.
    pub const fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    /// The schema namer.
    pub const fn namer(&self) -> &'a SchemaNamer<'a> {
        self.namer
    }

    /// Document by index.
    pub fn document(&self, document: usize) -> &'a OpenApiDocument {
        &self.documents[document]
    }

    /// Resolve `schema`, declared in `document` at field `handle`.
    ///
    /// The handle selects the required flag; pass `""` for nodes that are
    /// not fields (union branches, container values).
    pub fn resolve(
        &self,
        document: usize,
        handle: &str,
        schema: &Schema,
        flags: ResolveFlags,
    ) -> Result<Option<ResolvedType>, GenError> {
        let doc = self.document(document);
        let optional = !flags.never_optional && self.required.is_optional(handle);
        let wrap = |resolved: ResolvedType| {
            if optional {
                resolved.map(|ty| UnrealType::Optional(Box::new(ty)))
            } else {
                resolved
            }
        };

        // A `$ref` node stands for its target plus the target's name.
        let target = doc.effective(schema)?;
        let ref_name = schema.ref_name();

        // A tag on the field itself wins over one on the referenced schema.
        if !flags.never_semantic
            && let Some(tag) = schema
                .semantic_type
                .as_deref()
                .or(target.semantic_type.as_deref())
        {
            match SemanticKind::from_tag(tag) {
                Some(kind) => {
                    return Ok(Some(wrap(ResolvedType::same(UnrealType::Semantic(kind)))));
                }
                None => {
                    tracing::debug!(handle, tag, "Unknown semantic type, resolving the underlying type.");
                }
            }
        }

        if target.json_object == Some(true) {
            return Ok(Some(ResolvedType::same(UnrealType::JsonObject)));
        }

        if ref_name.is_some_and(|name| name.eq_ignore_ascii_case("ClientPermission")) {
            return Ok(Some(wrap(ResolvedType::same(UnrealType::ClientPermission))));
        }

        if !target.one_of.is_empty() {
            return self.resolve_union(document, handle, target).map(|r| Some(wrap(r)));
        }

        let schema_type = target.schema_type.as_deref();
        let format = target.format.as_deref();

        match (schema_type, format) {
            (Some("string"), Some("date-time")) => {
                return Ok(Some(wrap(ResolvedType::same(UnrealType::Primitive(Primitive::DateTime)))));
            }
            (Some("string"), Some("uuid")) => {
                return Ok(Some(wrap(ResolvedType::same(UnrealType::Primitive(Primitive::Guid)))));
            }
            _ => {}
        }

        if let Some(name) = ref_name {
            let ns = self.namer.schema_name(document, name, false);
            let ty = if target.is_enum() {
                UnrealType::Enum(ns)
            } else {
                UnrealType::Object(capitalize(&ns))
            };
            return Ok(Some(wrap(ResolvedType::same(ty))));
        }

        if schema_type == Some("object") {
            if !target.additional_properties_allowed() {
                return Err(GenError::ObjectWithoutShape {
                    handle: handle.to_string(),
                    document: doc.info.title.clone(),
                });
            }
            let value = match target.additional_properties_schema() {
                Some(value) => match self.resolve(document, "", value, ResolveFlags::NON_OPTIONAL)? {
                    Some(value) => value,
                    None => return Ok(None),
                },
                None => ResolvedType::same(UnrealType::STRING),
            };
            let value = check_single_level(value.map(UnrealType::into_wrapped), handle)?;
            return Ok(Some(wrap(value.map(|v| UnrealType::Map(Box::new(v))))));
        }

        if schema_type == Some("array") {
            let Some(items) = target.items.as_deref() else {
                tracing::warn!(handle, document = %doc.info.title, "Array without items, skipping.");
                return Ok(None);
            };
            let element_flags = if optional {
                ResolveFlags::NON_OPTIONAL
            } else {
                ResolveFlags {
                    never_optional: flags.never_optional,
                    never_semantic: false,
                }
            };
            let element_handle = if optional { "" } else { handle };
            let Some(element) = self.resolve(document, element_handle, items, element_flags)? else {
                return Ok(None);
            };
            let element = check_single_level(element.map(UnrealType::into_wrapped), handle)?;
            return Ok(Some(wrap(element.map(|e| UnrealType::Array(Box::new(e))))));
        }

        let primitive = match (schema_type, format) {
            (Some("number"), Some("float")) => Primitive::Float,
            (Some("number"), _) => Primitive::Double,
            (Some("boolean"), _) => Primitive::Bool,
            (Some("string"), Some("byte")) => Primitive::Int8,
            (Some("string" | "System.String"), _) => Primitive::String,
            (Some("integer"), Some("int16")) => Primitive::Int16,
            (Some("integer"), Some("int64")) => Primitive::Int64,
            (Some("integer"), _) => Primitive::Int32,
            _ => return Ok(None),
        };
        Ok(Some(wrap(ResolvedType::same(UnrealType::Primitive(primitive)))))
    }

    /// Resolve with the optional case disabled.
    pub fn resolve_non_optional(
        &self,
        document: usize,
        schema: &Schema,
    ) -> Result<Option<ResolvedType>, GenError> {
        self.resolve(document, "", schema, ResolveFlags::NON_OPTIONAL)
    }

    fn resolve_union(
        &self,
        document: usize,
        handle: &str,
        schema: &Schema,
    ) -> Result<ResolvedType, GenError> {
        let doc = self.document(document);
        let mut members = Vec::with_capacity(schema.one_of.len());
        for branch in &schema.one_of {
            let Some(resolved) = self.resolve(document, "", branch, ResolveFlags::NON_OPTIONAL)? else {
                tracing::warn!(handle, "Union branch resolves to no type, skipping branch.");
                continue;
            };
            let target = doc.effective(branch)?;
            let tag = target
                .properties
                .get("type")
                .and_then(|ty| ty.default.as_ref())
                .and_then(serde_json::Value::as_str)
                .map_or_else(
                    || sanitize(branch.ref_name().unwrap_or_default().trim_start_matches('$')),
                    str::to_string,
                );
            members.push(UnionMember {
                ty: resolved.structural,
                tag,
            });
        }

        let structural = UnrealType::Union(members);
        let spelled = structural.to_string();
        let Some(wrapper) = self.config.union_overrides.get(&spelled) else {
            return Err(GenError::UnregisteredUnion {
                handle: handle.to_string(),
                structural: spelled,
                document: doc.info.title.clone(),
            });
        };
        let Some(ns) = wrapper.strip_prefix('U').and_then(|w| w.strip_suffix('*')) else {
            return Err(GenError::InvalidUnionOverride {
                structural: spelled,
                wrapper: wrapper.clone(),
            });
        };

        Ok(ResolvedType {
            overridden: UnrealType::Object(ns.to_string()),
            structural,
        })
    }

    /// `#include` line for a type, or `""` when none is needed.
    ///
    /// Generated types use the memo's header when it knows the type.
    pub fn include_for(&self, ty: &UnrealType) -> String {
        match ty {
            UnrealType::Primitive(_) => String::new(),
            UnrealType::PlainTextResponse => {
                include_statement("Serialization/BeamPlainTextResponseBody.h")
            }
            UnrealType::Semantic(kind) => include_statement(&format!(
                "BeamBackend/SemanticTypes/{}.h",
                kind.namespaced()
            )),
            UnrealType::ClientPermission => {
                include_statement("BeamBackend/ReplacementTypes/BeamClientPermission.h")
            }
            UnrealType::JsonObject => include_statement("Dom/JsonObject.h"),
            UnrealType::Array(inner) | UnrealType::Map(inner) => self.include_for(inner),
            UnrealType::Enum(_)
            | UnrealType::Object(_)
            | UnrealType::Union(_)
            | UnrealType::ArrayWrapper(_)
            | UnrealType::MapWrapper(_)
            | UnrealType::Optional(_) => {
                if let Some(path) = self.memo.header_path(&ty.namespaced()) {
                    return include_statement(path);
                }
                generated_header_path(self.config, ty)
                    .map(|path| include_statement(&path))
                    .unwrap_or_default()
            }
        }
    }
}

/// Wrapper values must not themselves hold a wrapper or a raw container.
fn check_single_level(value: ResolvedType, handle: &str) -> Result<ResolvedType, GenError> {
    for ty in [&value.overridden, &value.structural] {
        if let UnrealType::ArrayWrapper(inner) | UnrealType::MapWrapper(inner) = ty
            && matches!(
                **inner,
                UnrealType::Array(_)
                    | UnrealType::Map(_)
                    | UnrealType::ArrayWrapper(_)
                    | UnrealType::MapWrapper(_)
            )
        {
            return Err(GenError::NestedContainer {
                unreal_type: ty.to_string(),
                handle: handle.to_string(),
            });
        }
    }
    Ok(value)
}

// ============================================================================
// Semantic serialization types
// ============================================================================

/// Wire primitive of every semantically tagged field, keyed by field handle.
#[derive(Debug, Default)]
pub struct SemanticFields {
    types: BTreeMap<String, String>,
}

impl SemanticFields {
    /// Scan schema properties and operation parameters of every document.
    pub fn build(
        resolver: &Resolver<'_>,
        documents: &[OpenApiDocument],
        schemas: &[NamedSchema<'_>],
        endpoints: &EndpointNaming,
        mode: GenerationMode,
    ) -> Result<Self, GenError> {
        let mut types = BTreeMap::new();

        for named in schemas {
            let owner = resolver
                .namer()
                .schema_name(named.document, named.name, false);
            for (field, schema) in &named.schema.properties {
                if let Some(wire) = serialization_type(resolver, named.document, schema)? {
                    types.entry(field_handle(&owner, field)).or_insert(wire);
                }
            }
        }

        for (index, doc) in documents.iter().enumerate() {
            let service = ServiceNaming::from_title(&doc.info.title, mode);
            for (path, item) in &doc.paths {
                for (verb, op) in item.operations() {
                    let Some(names) = endpoints.get(index, path, verb) else {
                        continue;
                    };
                    let owner = parameter_owner(&service.name, &names.global);
                    for param in &op.parameters {
                        let Some(schema) = param.schema.as_ref() else {
                            continue;
                        };
                        if let Some(wire) = serialization_type(resolver, index, schema)? {
                            types.entry(field_handle(&owner, &param.name)).or_insert(wire);
                        }
                    }
                }
            }
        }

        tracing::debug!(fields = types.len(), "Collected semantic fields.");
        Ok(Self { types })
    }

    /// Wire primitive spelling for a handle.
    pub fn get(&self, handle: &str) -> Option<&str> {
        self.types.get(handle).map(String::as_str)
    }
}

/// Wire type of a field whose value, element or map value carries a semantic tag.
fn serialization_type(
    resolver: &Resolver<'_>,
    document: usize,
    field: &Schema,
) -> Result<Option<String>, GenError> {
    let doc = resolver.document(document);
    let declared = field;
    let field = doc.effective(declared)?;
    let schema_type = field.schema_type.as_deref();

    let tagged = if schema_type == Some("array") {
        match field.items.as_deref() {
            Some(items) => Some(doc.effective(items)?),
            None => None,
        }
    } else if schema_type == Some("object")
        && field.reference.is_none()
        && field.additional_properties_allowed()
    {
        match field.additional_properties_schema() {
            Some(value) => Some(doc.effective(value)?),
            None => None,
        }
    } else {
        None
    };

    let candidate = match tagged {
        Some(inner) if inner.semantic_type.is_some() => inner,
        _ if declared.semantic_type.is_some() || field.semantic_type.is_some() => declared,
        _ => return Ok(None),
    };

    Ok(resolver
        .resolve(document, "", candidate, ResolveFlags::SERIALIZATION)?
        .map(|resolved| resolved.overridden.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::spec::ordered_schemas;

    const DOC: &str = r##"{
  "info": { "title": "scheduler basic" },
  "paths": {
    "/basic/scheduler/jobs": {
      "get": {
        "parameters": [
          { "name": "owner", "in": "query", "schema": { "type": "string", "x-beamable-semantic-type": "Gamertag" } }
        ]
      }
    }
  },
  "components": {
    "schemas": {
      "Job": {
        "type": "object",
        "required": ["id", "trigger", "tags", "status", "players", "stamp", "scores", "nested"],
        "properties": {
          "id": { "type": "string" },
          "count": { "type": "integer" },
          "ratio": { "type": "number", "format": "float" },
          "trigger": { "oneOf": [
            { "$ref": "#/components/schemas/CronTrigger" },
            { "$ref": "#/components/schemas/ExactTrigger" }
          ] },
          "tags": { "type": "object", "additionalProperties": { "type": "string" } },
          "labels": { "type": "object" },
          "status": { "$ref": "#/components/schemas/Status" },
          "players": { "type": "array", "items": { "type": "integer", "format": "int64", "x-beamable-semantic-type": "Gamertag" } },
          "owner": { "type": "string", "x-beamable-semantic-type": "Cid" },
          "stamp": { "type": "string", "format": "date-time" },
          "scores": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } },
          "nested": { "type": "array", "items": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } } },
          "permission": { "$ref": "#/components/schemas/ClientPermission" },
          "blob": { "type": "object", "x-beamable-json-object": true },
          "closed": { "type": "object", "additionalProperties": false },
          "mystery": { "type": "file" },
          "account": { "$ref": "#/components/schemas/AccountRef", "x-beamable-semantic-type": "Pid" },
          "author": { "$ref": "#/components/schemas/AuthorRef" }
        }
      },
      "AccountRef": { "type": "string" },
      "AuthorRef": { "type": "string", "x-beamable-semantic-type": "Cid" },
      "CronTrigger": { "type": "object", "properties": { "type": { "type": "string", "default": "cron" } } },
      "ExactTrigger": { "type": "object", "properties": { "at": { "type": "integer" } } },
      "Status": { "type": "string", "enum": ["active", "done"] },
      "ClientPermission": { "type": "object", "properties": { "write_self": { "type": "boolean" } } }
    }
  }
}"##;

    struct Fixture {
        docs: Vec<OpenApiDocument>,
        config: GeneratorConfig,
        memo: GenerationPassMemo,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                docs: vec![OpenApiDocument::from_json("scheduler.json", DOC).unwrap()],
                config: GeneratorConfig::default(),
                memo: GenerationPassMemo::new(),
            }
        }

        fn field(&self, name: &str) -> Result<Option<ResolvedType>, GenError> {
            let schemas = ordered_schemas(&self.docs);
            let namer = SchemaNamer::new(&self.docs, &schemas, &self.config);
            let endpoints = EndpointNaming::build(&self.docs, &self.config).unwrap();
            let required =
                RequiredFields::build(&self.docs, &schemas, &namer, &endpoints, self.config.mode);
            let resolver = Resolver::new(&self.docs, &self.config, &self.memo, &namer, &required);
            let job = self.docs[0].resolve_ref("#/components/schemas/Job").unwrap();
            resolver.resolve(0, &format!("Job.{name}"), &job.properties[name], ResolveFlags::NONE)
        }

        fn spelled(&self, name: &str) -> String {
            self.field(name).unwrap().unwrap().overridden.to_string()
        }
    }

    #[test]
    fn test_resolution_cases() {
        let fixture = Fixture::new();
        let cases = [
            ("id", "FString"),
            ("count", "FOptionalInt32"),
            ("ratio", "FOptionalFloat"),
            ("tags", "TMap<FString, FString>"),
            ("labels", "FOptionalMapOfString"),
            ("status", "EStatus"),
            ("players", "TArray<FBeamGamerTag>"),
            ("owner", "FOptionalBeamCid"),
            ("stamp", "FDateTime"),
            ("scores", "TArray<FArrayOfInt32>"),
            ("permission", "FOptionalBeamClientPermission"),
            ("blob", "TSharedPtr<FJsonObject>"),
            ("account", "FOptionalBeamPid"),
            ("author", "FOptionalBeamCid"),
        ];
        for (field, expected) in cases {
            assert_eq!(fixture.spelled(field), expected, "Job.{field}");
        }
        assert!(fixture.field("mystery").unwrap().is_none());
    }

    #[test]
    fn test_union_is_overridden() {
        let fixture = Fixture::new();
        let trigger = fixture.field("trigger").unwrap().unwrap();
        assert_eq!(trigger.overridden.to_string(), "UBeamJobTrigger*");
        assert_eq!(trigger.structural.to_string(), "UOneOf_UCronTrigger_UExactTrigger*");

        let members = trigger.structural.find_union().unwrap();
        let tags: Vec<&str> = members.iter().map(|m| m.tag.as_str()).collect();
        assert_eq!(tags, vec!["cron", "ExactTrigger"]);
    }

    #[test]
    fn test_unregistered_union_names_the_field() {
        let mut fixture = Fixture::new();
        fixture.config.union_overrides.clear();
        let err = fixture.field("trigger").unwrap_err();
        assert!(
            matches!(
                &err,
                GenError::UnregisteredUnion { handle, structural, document }
                    if handle == "Job.trigger"
                        && structural == "UOneOf_UCronTrigger_UExactTrigger*"
                        && document == "scheduler basic"
            ),
            "{err}"
        );
    }

    #[test]
    fn test_invalid_union_override() {
        let mut fixture = Fixture::new();
        fixture.config.union_overrides.insert(
            "UOneOf_UCronTrigger_UExactTrigger*".to_string(),
            "FBeamJobTrigger".to_string(),
        );
        assert!(matches!(
            fixture.field("trigger").unwrap_err(),
            GenError::InvalidUnionOverride { .. }
        ));
    }

    #[test]
    fn test_shape_errors() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture.field("closed").unwrap_err(),
            GenError::ObjectWithoutShape { ref handle, .. } if handle == "Job.closed"
        ));
        assert!(matches!(
            fixture.field("nested").unwrap_err(),
            GenError::NestedContainer { ref unreal_type, .. } if unreal_type == "FArrayOfArrayOfInt32"
        ));
    }

    #[test]
    fn test_include_statements() {
        let mut fixture = Fixture::new();
        fixture
            .memo
            .insert("OptionalInt32", "Core/Public/Legacy/OptionalInt32.h");

        let schemas = ordered_schemas(&fixture.docs);
        let namer = SchemaNamer::new(&fixture.docs, &schemas, &fixture.config);
        let required = RequiredFields::default();
        let resolver = Resolver::new(
            &fixture.docs,
            &fixture.config,
            &fixture.memo,
            &namer,
            &required,
        );

        let int32 = UnrealType::Primitive(Primitive::Int32);
        let cases = [
            (int32.clone(), ""),
            (
                UnrealType::Optional(Box::new(int32.clone())),
                "#include \"Core/Public/Legacy/OptionalInt32.h\"",
            ),
            (
                UnrealType::Array(Box::new(UnrealType::ArrayWrapper(Box::new(int32)))),
                "#include \"BeamableCore/Public/AutoGen/Arrays/ArrayOfInt32.h\"",
            ),
            (
                UnrealType::Enum("Status".into()),
                "#include \"BeamableCore/Public/AutoGen/Enums/Status.h\"",
            ),
            (
                UnrealType::Map(Box::new(UnrealType::Object("Job".into()))),
                "#include \"BeamableCore/Public/AutoGen/Job.h\"",
            ),
            (
                UnrealType::Semantic(SemanticKind::Gamertag),
                "#include \"BeamBackend/SemanticTypes/BeamGamerTag.h\"",
            ),
            (UnrealType::JsonObject, "#include \"Dom/JsonObject.h\""),
        ];
        for (ty, expected) in cases {
            assert_eq!(resolver.include_for(&ty), expected, "{ty}");
        }
    }

    #[test]
    fn test_semantic_fields() {
        let fixture = Fixture::new();
        let schemas = ordered_schemas(&fixture.docs);
        let namer = SchemaNamer::new(&fixture.docs, &schemas, &fixture.config);
        let endpoints = EndpointNaming::build(&fixture.docs, &fixture.config).unwrap();
        let required = RequiredFields::build(
            &fixture.docs,
            &schemas,
            &namer,
            &endpoints,
            fixture.config.mode,
        );
        let resolver = Resolver::new(
            &fixture.docs,
            &fixture.config,
            &fixture.memo,
            &namer,
            &required,
        );
        let semantic = SemanticFields::build(
            &resolver,
            &fixture.docs,
            &schemas,
            &endpoints,
            fixture.config.mode,
        )
        .unwrap();

        assert_eq!(semantic.get("Job.players"), Some("int64"));
        assert_eq!(semantic.get("Job.owner"), Some("FString"));
        assert_eq!(semantic.get("Scheduler_GetJobs.owner"), Some("FString"));
        assert_eq!(semantic.get("Job.account"), Some("FString"));
        assert_eq!(semantic.get("Job.author"), Some("FString"));
        assert_eq!(semantic.get("Job.id"), None);
    }
}
