//! One field of a serializable type and its JSON (de)serialization code.

use unreal_apigen_common::GeneratorConfig;

use crate::error::GenError;
use crate::openapi::ir::emit::{render, ReplacementTable, Replacements};
use crate::openapi::ir::templates::{PROPERTY_FIELD, PROPERTY_UPROPERTY};
use crate::openapi::ir::types::UnrealType;
use crate::openapi::ir::utils::{capitalize, property_field_name, space_out_on_upper_case};

/// A property of a generated UObject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    /// Name of the field on the wire.
    pub raw_field_name: String,
    /// Declared property type.
    pub ty: UnrealType,
    /// C++ member name.
    pub name: String,
    /// Editor display name.
    pub display_name: String,
    /// The property type with any optional removed.
    pub non_optional: UnrealType,
    /// Wire primitive of semantic values, when the field carries one.
    pub semantic_wire: Option<String>,
    /// Schema description, if any.
    pub brief_comment: String,
}

impl PropertyDeclaration {
    /// A property for the raw field `field` of type `ty`.
    pub fn new(field: &str, ty: UnrealType, semantic_wire: Option<String>) -> Self {
        let name = property_field_name(&ty, field);
        Self {
            raw_field_name: field.to_string(),
            display_name: space_out_on_upper_case(&name),
            non_optional: ty.non_optional().clone(),
            ty,
            name,
            semantic_wire,
            brief_comment: String::new(),
        }
    }

    /// A union member slot of a polymorphic wrapper, named after its tag.
    pub fn union_member(tag: &str, ty: UnrealType) -> Self {
        let name = capitalize(tag);
        Self {
            raw_field_name: tag.to_string(),
            display_name: name.clone(),
            non_optional: ty.clone(),
            ty,
            name,
            semantic_wire: None,
            brief_comment: String::new(),
        }
    }

    /// Attach the schema description.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<&str>) -> Self {
        self.brief_comment = comment.unwrap_or_default().to_string();
        self
    }

    /// JSON blobs are invisible to Blueprint and left out of Make/Break.
    pub const fn is_blueprint_compatible(&self) -> bool {
        !self.ty.is_json()
    }

    /// Element of an array or value of a map, after removing the optional.
    pub fn template_param(&self) -> Option<&UnrealType> {
        self.non_optional.container_value()
    }

    fn template_param_spelled(&self) -> String {
        self.template_param().map(ToString::to_string).unwrap_or_default()
    }

    fn semantic_wire(&self) -> &str {
        self.semantic_wire.as_deref().unwrap_or("FString")
    }

    /// Sort key: plain, array, map, optional, optional array, optional map,
    /// then by name without a leading `b`.
    pub fn sort_key(&self) -> (u8, &str) {
        let tier = match &self.ty {
            UnrealType::Array(_) | UnrealType::ArrayWrapper(_) => 1,
            UnrealType::Map(_) | UnrealType::MapWrapper(_) => 2,
            UnrealType::Optional(inner) => match **inner {
                UnrealType::Array(_) => 4,
                UnrealType::Map(_) => 5,
                _ => 3,
            },
            _ => 0,
        };
        (tier, self.name.strip_prefix('b').unwrap_or(&self.name))
    }

    /// Member declaration inside the class body.
    pub fn declaration(&self, config: &GeneratorConfig) -> Result<String, GenError> {
        let template = if self.is_blueprint_compatible() {
            &PROPERTY_UPROPERTY
        } else {
            &PROPERTY_FIELD
        };
        render(template, &self.replacements(config))
    }

    /// Statement writing this property into `Serializer`.
    pub fn serialize(&self) -> String {
        let raw = &self.raw_field_name;
        let name = &self.name;
        let ty = &self.ty;
        let sem = self.semantic_wire();
        let semantic = ty.contains_semantic();

        if ty.is_optional() {
            let value = &self.non_optional;
            return match (ty.is_optional_container(), semantic) {
                (true, true) => format!(
                    "UBeamJsonUtils::SerializeOptional<{value}, {}, {sem}>(TEXT(\"{raw}\"), &{name}, Serializer);",
                    self.template_param_spelled()
                ),
                (true, false) => format!(
                    "UBeamJsonUtils::SerializeOptional<{value}, {}>(TEXT(\"{raw}\"), &{name}, Serializer);",
                    self.template_param_spelled()
                ),
                (false, true) => format!(
                    "UBeamJsonUtils::SerializeOptional<{value}, {sem}>(TEXT(\"{raw}\"), &{name}, Serializer);"
                ),
                (false, false) => {
                    format!("UBeamJsonUtils::SerializeOptional<{value}>(TEXT(\"{raw}\"), &{name}, Serializer);")
                }
            };
        }
        if ty.is_enum() {
            return format!(
                "Serializer->WriteValue(TEXT(\"{raw}\"), UBeamJsonUtils::EnumToSerializationName({name}));"
            );
        }
        if ty.is_map() || ty.is_array() {
            let kind = if ty.is_map() { "Map" } else { "Array" };
            let param = self.template_param_spelled();
            return if semantic {
                format!("UBeamJsonUtils::Serialize{kind}<{param}, {sem}>(TEXT(\"{raw}\"), {name}, Serializer);")
            } else {
                format!("UBeamJsonUtils::Serialize{kind}<{param}>(TEXT(\"{raw}\"), {name}, Serializer);")
            };
        }
        if ty.is_json() {
            return format!("UBeamJsonUtils::SerializeJsonObject(TEXT(\"{raw}\"), {name}, Serializer);");
        }
        if ty.is_semantic() {
            return format!("UBeamJsonUtils::SerializeSemanticType<{sem}>(TEXT(\"{raw}\"), &{name}, Serializer);");
        }
        if ty.is_uobject() {
            return format!("UBeamJsonUtils::SerializeUObject<{ty}>(\"{raw}\", {name}, Serializer);");
        }
        if ty.is_ustruct() {
            return format!("UBeamJsonUtils::SerializeUStruct<{ty}>(\"{raw}\", {name}, Serializer);");
        }
        format!("UBeamJsonUtils::SerializeRawPrimitive(TEXT(\"{raw}\"), {name}, Serializer);")
    }

    /// Statement reading this property out of `Bag`.
    pub fn deserialize(&self) -> String {
        let raw = &self.raw_field_name;
        let name = &self.name;
        let ty = &self.ty;
        let sem = self.semantic_wire();
        let semantic = ty.contains_semantic();

        if ty.is_optional() {
            let value = &self.non_optional;
            return match (ty.is_optional_container(), semantic) {
                (true, true) => format!(
                    "UBeamJsonUtils::DeserializeOptional<{value}, {}, {sem}>(\"{raw}\", Bag, {name}, OuterOwner);",
                    self.template_param_spelled()
                ),
                (true, false) => format!(
                    "UBeamJsonUtils::DeserializeOptional<{value}, {}>(\"{raw}\", Bag, {name}, OuterOwner);",
                    self.template_param_spelled()
                ),
                (false, true) => format!(
                    "UBeamJsonUtils::DeserializeOptional<{value}, {sem}>(\"{raw}\", Bag, {name}, OuterOwner);"
                ),
                (false, false) => {
                    format!("UBeamJsonUtils::DeserializeOptional<{value}>(\"{raw}\", Bag, {name}, OuterOwner);")
                }
            };
        }
        if ty.is_enum() || ty.is_raw_primitive() {
            return format!("UBeamJsonUtils::DeserializeRawPrimitive(TEXT(\"{raw}\"), Bag, {name});");
        }
        if ty.is_map() || ty.is_array() {
            let kind = if ty.is_map() { "Map" } else { "Array" };
            let param = self.template_param_spelled();
            return if semantic {
                format!("UBeamJsonUtils::Deserialize{kind}<{param}, {sem}>(TEXT(\"{raw}\"), Bag, {name}, OuterOwner);")
            } else {
                format!("UBeamJsonUtils::Deserialize{kind}<{param}>(TEXT(\"{raw}\"), Bag, {name}, OuterOwner);")
            };
        }
        if ty.is_json() {
            return format!("UBeamJsonUtils::DeserializeJsonObject(TEXT(\"{raw}\"), Bag, {name}, OuterOwner);");
        }
        if ty.is_semantic() {
            return format!(
                "UBeamJsonUtils::DeserializeSemanticType<{sem}>(TEXT(\"{raw}\"), Bag, {name}, OuterOwner);"
            );
        }
        if ty.is_uobject() {
            return format!("UBeamJsonUtils::DeserializeUObject<{ty}>(\"{raw}\", Bag, {name}, OuterOwner);");
        }
        if ty.is_ustruct() {
            return format!("UBeamJsonUtils::DeserializeUStruct<{ty}>(\"{raw}\", Bag, {name}, OuterOwner);");
        }
        format!("{name} = Bag->GetStringField(TEXT(\"{raw}\"));")
    }
}

impl ReplacementTable for PropertyDeclaration {
    fn replacements(&self, _config: &GeneratorConfig) -> Replacements {
        Replacements::from([
            ("PropertyUnrealType", self.ty.to_string()),
            ("PropertyNamespacedType", self.ty.namespaced()),
            ("PropertyName", self.name.clone()),
            ("PropertyDisplayName", self.display_name.clone()),
            ("RawFieldName", self.raw_field_name.clone()),
            ("NonOptionalTypeName", self.non_optional.to_string()),
            ("NonOptionalTypeNameRelevantTemplateParam", self.template_param_spelled()),
            ("SemTypeSerializationType", self.semantic_wire().to_string()),
            ("BriefCommentString", self.brief_comment.clone()),
        ])
    }
}
