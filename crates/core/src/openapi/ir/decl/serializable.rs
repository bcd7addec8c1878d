//! Serializable UObject declarations: component schemas, union wrappers and
//! primitive response wrappers.

use std::collections::{BTreeMap, BTreeSet};

use unreal_apigen_common::GeneratorConfig;

use crate::error::GenError;
use crate::openapi::ir::collisions::field_handle;
use crate::openapi::ir::emit::{render, Replacements};
use crate::openapi::ir::resolve::{ResolveFlags, Resolver, SemanticFields};
use crate::openapi::ir::templates::{BREAK_DECLARATION, BREAK_DEFINITION};
use crate::openapi::ir::types::UnrealType;
use crate::openapi::ir::utils::capitalize;
use crate::openapi::ir::wrappers::{PolymorphicWrapper, WrapperSynthesizer};
use crate::openapi::spec::NamedSchema;

use super::containers::EnumDeclaration;
use super::property::PropertyDeclaration;

const JSON_UTILS_INCLUDE: &str = "#include \"Serialization/BeamJsonUtils.h\"";
const DEFAULT_VALUE_HELPERS_INCLUDE: &str = "#include \"Misc/DefaultValueHelper.h\"";
const RESPONSE_BODY_INCLUDE: &str = "#include \"BeamBackend/BeamBaseResponseBodyInterface.h\"";

/// How a type is used as the body of an HTTP response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseBody {
    /// Never returned by an endpoint.
    #[default]
    None,
    /// Deserialized from a JSON object.
    Json,
    /// Wraps a single non-object value returned as the whole body.
    PrimitiveWrapper,
}

/// A `U{ns}` class with JSON (de)serialization and Blueprint make/break helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializableDeclaration {
    /// `U{ns}*`
    pub ty: UnrealType,
    /// Properties in declaration order.
    pub properties: Vec<PropertyDeclaration>,
    /// Include statements of the property types, sorted.
    pub includes: BTreeSet<String>,
    /// Whether the source needs `BeamJsonUtils`.
    pub json_utils: bool,
    /// Whether the source needs `FDefaultValueHelper`.
    pub default_value_helpers: bool,
    /// Response body role.
    pub response_body: ResponseBody,
    /// Union wrappers serialize exactly one of their members.
    pub polymorphic: bool,
}

impl SerializableDeclaration {
    /// A plain serializable. Properties are sorted and includes normalized.
    pub fn new(
        ty: UnrealType,
        mut properties: Vec<PropertyDeclaration>,
        includes: impl IntoIterator<Item = String>,
        self_include: &str,
    ) -> Self {
        properties.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let default_value_helpers = properties.iter().any(|p| p.ty.is_numeric());
        Self {
            json_utils: !properties.is_empty(),
            includes: normalize_includes(includes, self_include),
            ty,
            properties,
            default_value_helpers,
            response_body: ResponseBody::None,
            polymorphic: false,
        }
    }

    /// The designed wrapper of a union: one UObject slot per member, named
    /// after its discriminator.
    pub fn polymorphic(resolver: &Resolver<'_>, wrapper: &PolymorphicWrapper) -> Self {
        let properties: Vec<_> = wrapper
            .members
            .iter()
            .map(|member| PropertyDeclaration::union_member(&member.tag, member.ty.clone()))
            .collect();
        let includes = wrapper.members.iter().map(|m| resolver.include_for(&m.ty));
        Self {
            includes: normalize_includes(includes, &resolver.include_for(&wrapper.ty)),
            ty: wrapper.ty.clone(),
            properties,
            json_utils: true,
            default_value_helpers: false,
            response_body: ResponseBody::None,
            polymorphic: true,
        }
    }

    /// `U{Endpoint}Response` holding the whole non-object response as `Value`.
    pub fn primitive_response(resolver: &Resolver<'_>, ns: &str, value: UnrealType) -> Self {
        let ty = UnrealType::Object(ns.to_string());
        let include = resolver.include_for(&value);
        let property = PropertyDeclaration::new("Value", value, None);
        let mut declaration = Self::new(ty.clone(), vec![property], [include], &resolver.include_for(&ty));
        declaration.json_utils = true;
        declaration.response_body = ResponseBody::PrimitiveWrapper;
        declaration
    }

    /// `{ns}` without the `U` prefix and pointer.
    pub fn namespaced(&self) -> String {
        self.ty.namespaced()
    }

    fn blueprint_properties(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.properties.iter().filter(|p| p.is_blueprint_compatible())
    }

    fn serialization(&self) -> (String, String) {
        if !self.polymorphic {
            let serialize: Vec<_> = self.properties.iter().map(PropertyDeclaration::serialize).collect();
            let deserialize: Vec<_> = self.properties.iter().map(PropertyDeclaration::deserialize).collect();
            return (serialize.join("\n\t"), deserialize.join("\n\t"));
        }

        let mut serialize = String::from("const auto Type = GetCurrentType();\n\t");
        let mut deserialize = String::from("const auto Type = Bag->GetStringField(\"type\");\n\t");
        for member in &self.properties {
            let tag = &member.raw_field_name;
            let name = &member.name;
            serialize.push_str(&format!(
                "if (Type.Equals(TEXT(\"{tag}\")))\n\t\tUBeamJsonUtils::SerializeUObject({name}, Serializer);\n\t"
            ));
            deserialize.push_str(&format!(
                "if (Type.Equals(TEXT(\"{tag}\")))\n\t\tUBeamJsonUtils::DeserializeUObject(TEXT(\"\"), Bag, {name}, OuterOwner);\n\t"
            ));
        }
        (serialize, deserialize)
    }

    /// `GetCurrentType` definition of a union wrapper.
    fn current_type_definition(&self) -> String {
        let ns = self.namespaced();
        let count = self.properties.len();
        let mut check = String::from("checkf(");
        let mut body = String::from("\t");
        for (i, member) in self.properties.iter().enumerate() {
            check.push('(');
            check.push_str(&member.name);
            for (j, other) in self.properties.iter().enumerate() {
                if i != j {
                    check.push_str(&format!(" && !{}", other.name));
                }
            }
            if i + 1 == count {
                check.push_str(
                    "), TEXT(\"You should always only have one of these set. Set the others as nullptr.\"))",
                );
            } else {
                check.push_str(") || \n\t\t");
            }
            body.push_str(&format!(
                "if ({}) return TEXT(\"{}\");\n\t",
                member.name, member.raw_field_name
            ));
        }
        format!("FString U{ns}::GetCurrentType() const\n{{\n\t{check}\n\n{body}\n\treturn TEXT(\"\");\n}}")
    }

    fn response_body_definition(&self) -> String {
        let ns = self.namespaced();
        let header = format!("\nvoid U{ns}::DeserializeRequestResponse(UObject* RequestData, FString ResponseContent)\n");
        match self.response_body {
            ResponseBody::None => String::new(),
            ResponseBody::Json => {
                format!("{header}{{\n\tOuterOwner = RequestData;\n\tBeamDeserialize(ResponseContent);\t\n}}")
            }
            ResponseBody::PrimitiveWrapper => {
                let (ty, name) = self
                    .properties
                    .first()
                    .map(|p| (p.ty.to_string(), p.name.as_str()))
                    .unwrap_or_default();
                format!(
                    "{header}{{\n\tOuterOwner = RequestData;\n\tUBeamJsonUtils::DeserializeRawPrimitive<{ty}>(ResponseContent, {name}, OuterOwner);\n}}"
                )
            }
        }
    }

    /// Token table for the header, source and library templates.
    pub fn replacements(&self, config: &GeneratorConfig) -> Result<Replacements, GenError> {
        let declarations = self
            .properties
            .iter()
            .map(|p| p.declaration(config))
            .collect::<Result<Vec<_>, _>>()?;
        let (serialize, deserialize) = self.serialization();
        let is_response = self.response_body != ResponseBody::None;

        let mut make_params = String::new();
        let mut make_optional = String::new();
        let mut make_assignments = String::new();
        let mut break_params = String::new();
        let mut break_assignments = String::new();
        for property in self.blueprint_properties() {
            let (ty, name) = (&property.ty, &property.name);
            make_params.push_str(&format!("{ty} {name}, "));
            if ty.is_optional() {
                make_optional.push_str(&format!("{name}, "));
            }
            make_assignments.push_str(&format!("Serializable->{name} = {name};\n\t"));
            break_params.push_str(&format!(", {ty}& {name}"));
            break_assignments.push_str(&format!("{name} = Serializable->{name};\n\t"));
        }

        let flag = |set: bool, text: &str| if set { text.to_string() } else { String::new() };
        let mut table = Replacements::from([
            ("exportMacro", config.export_macro.clone()),
            ("includeStatementPrefix", config.header_path.clone()),
            ("NamespacedTypeName", self.namespaced()),
            ("PropertyIncludes", self.includes.iter().cloned().collect::<Vec<_>>().join("\n")),
            ("UPropertyDeclarations", declarations.join("\n\t")),
            ("JsonUtilsInclude", flag(self.json_utils, JSON_UTILS_INCLUDE)),
            ("DefaultValueHelpersInclude", flag(self.default_value_helpers, DEFAULT_VALUE_HELPERS_INCLUDE)),
            ("_uPropertySerialize", serialize),
            ("_uPropertyDeserialize", deserialize),
            ("_responseBodyIncludes", flag(is_response, RESPONSE_BODY_INCLUDE)),
            ("_inheritResponseBodyInterface", flag(is_response, ", public IBeamBaseResponseBodyInterface")),
            (
                "_declareResponseBodyInterface",
                flag(
                    is_response,
                    "virtual void DeserializeRequestResponse(UObject* RequestData, FString ResponseContent) override;",
                ),
            ),
            ("_defineResponseBodyInterface", self.response_body_definition()),
            ("_declarePolyWrapperGetType", flag(self.polymorphic, "FString GetCurrentType() const;")),
            (
                "_definePolyWrapperGetType",
                if self.polymorphic { self.current_type_definition() } else { String::new() },
            ),
            ("_makeParams", make_params),
            ("_makeOptionalParamNames", make_optional),
            ("_makeAssignments", make_assignments),
            ("_breakParams", break_params),
            ("_breakAssignments", break_assignments),
        ]);

        let (break_declaration, break_definition) = if self.properties.is_empty() {
            (String::new(), String::new())
        } else {
            (render(&BREAK_DECLARATION, &table)?, render(&BREAK_DEFINITION, &table)?)
        };
        table.insert("BREAK_UTILITY_DECLARATION", break_declaration);
        table.insert("BREAK_UTILITY_DEFINITION", break_definition);
        Ok(table)
    }
}

fn normalize_includes(includes: impl IntoIterator<Item = String>, self_include: &str) -> BTreeSet<String> {
    includes
        .into_iter()
        .filter(|include| !include.is_empty() && include != self_include)
        .collect()
}

// ============================================================================
// Component schemas
// ============================================================================

/// Declare every component schema in order, registering enums and helper
/// types with `synth` along the way. Duplicate namespaced names keep the
/// first declaration.
pub fn build_schema_types(
    resolver: &Resolver<'_>,
    schemas: &[NamedSchema<'_>],
    semantic: &SemanticFields,
    synth: &mut WrapperSynthesizer,
    responses: &BTreeMap<String, ResponseBody>,
) -> Result<Vec<SerializableDeclaration>, GenError> {
    let mut declared = BTreeSet::new();
    let mut declarations = Vec::new();

    for named in schemas {
        let document = resolver.document(named.document);
        let ns = resolver.namer().schema_name(named.document, named.name, false);

        if named.schema.is_enum() {
            synth.register_enum(EnumDeclaration {
                ty: UnrealType::Enum(ns),
                values: named
                    .schema
                    .string_enum_values()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            });
            continue;
        }
        if named.name == "ClientPermission" {
            continue;
        }
        if !declared.insert(ns.clone()) {
            tracing::debug!(ns = %ns, "Schema already declared, skipping.");
            continue;
        }

        let mut properties = Vec::with_capacity(named.schema.properties.len());
        let mut includes = Vec::with_capacity(named.schema.properties.len());
        for (field, schema) in &named.schema.properties {
            let handle = field_handle(&ns, field);
            let Some(resolved) = resolver.resolve(named.document, &handle, schema, ResolveFlags::NONE)? else {
                tracing::warn!(handle = %handle, "Field matches no supported shape, skipping.");
                continue;
            };
            synth.register_field(resolver, &handle, &resolved, &document.info.title)?;

            let ty = resolved.overridden;
            includes.push(resolver.include_for(&ty));
            let wire = semantic.get(&handle).map(str::to_string);
            properties.push(PropertyDeclaration::new(field, ty, wire).with_comment(schema.description.as_deref()));
        }

        // Spelled the way the resolver spells references to this schema.
        let ty = UnrealType::Object(capitalize(&ns));
        let self_include = resolver.include_for(&ty);
        let response_body = responses.get(&ty.namespaced()).copied().unwrap_or_default();
        let mut declaration = SerializableDeclaration::new(ty, properties, includes, &self_include);
        declaration.response_body = response_body;
        declarations.push(declaration);
    }

    Ok(declarations)
}
