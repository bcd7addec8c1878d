//! Enum, optional and container wrapper declarations.

use unreal_apigen_common::GeneratorConfig;

use crate::openapi::ir::emit::{ReplacementTable, Replacements};
use crate::openapi::ir::types::UnrealType;
use crate::openapi::ir::utils::{capitalize, space_out_on_upper_case};

/// A `UENUM` generated from a string enum schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDeclaration {
    /// `E{ns}`
    pub ty: UnrealType,
    /// Wire values in declaration order.
    pub values: Vec<String>,
}

impl EnumDeclaration {
    /// `Value UMETA(DisplayName="...", SerializationName="value")` lines.
    fn enum_values(&self) -> String {
        self.values
            .iter()
            .map(|value| {
                format!(
                    "{} UMETA(DisplayName=\"{}\", SerializationName=\"{value}\")",
                    capitalize(value),
                    space_out_on_upper_case(value)
                )
            })
            .collect::<Vec<_>>()
            .join(",\n\t")
    }
}

impl ReplacementTable for EnumDeclaration {
    fn replacements(&self, config: &GeneratorConfig) -> Replacements {
        Replacements::from([
            ("exportMacro", config.export_macro.clone()),
            ("UnrealTypeName", self.ty.to_string()),
            ("NamespacedTypeName", self.ty.namespaced()),
            ("EnumValues", self.enum_values()),
        ])
    }
}

/// An `FOptional{ns}` struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalDeclaration {
    /// The optional itself.
    pub ty: UnrealType,
    /// Include of the optional's own header.
    pub include: String,
    /// Include of the wrapped value type.
    pub value_include: String,
}

impl OptionalDeclaration {
    /// Wrapped value type.
    pub fn value(&self) -> &UnrealType {
        self.ty.non_optional()
    }

    /// Default member initializer for `Val`.
    fn value_initializer(&self) -> String {
        let value = self.value();
        if value.is_uobject() {
            "nullptr".to_string()
        } else {
            format!("{value}()")
        }
    }
}

impl ReplacementTable for OptionalDeclaration {
    fn replacements(&self, config: &GeneratorConfig) -> Replacements {
        let value = self.value();
        Replacements::from([
            ("exportMacro", config.export_macro.clone()),
            ("UnrealTypeName", self.ty.to_string()),
            ("NamespacedTypeName", self.ty.namespaced()),
            ("ValueUnrealTypeName", value.to_string()),
            ("ValueNamespacedTypeName", value.namespaced()),
            ("UnrealTypeIncludeStatement", self.include.clone()),
            ("ValueUnrealTypeIncludeStatement", self.value_include.clone()),
            ("_valueInitializerStatement", self.value_initializer()),
        ])
    }
}

/// An `FArrayOf{ns}` or `FMapOf{ns}` struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperDeclaration {
    /// `ArrayWrapper` or `MapWrapper`.
    pub ty: UnrealType,
    /// The value held by the wrapper.
    pub value: UnrealType,
    /// Include of the wrapper's own header.
    pub include: String,
    /// Include of the value type.
    pub value_include: String,
}

impl WrapperDeclaration {
    /// Whether this is an array wrapper.
    pub const fn is_array(&self) -> bool {
        matches!(self.ty, UnrealType::ArrayWrapper(_))
    }
}

impl ReplacementTable for WrapperDeclaration {
    fn replacements(&self, config: &GeneratorConfig) -> Replacements {
        Replacements::from([
            ("exportMacro", config.export_macro.clone()),
            ("UnrealTypeName", self.ty.to_string()),
            ("NamespacedTypeName", self.ty.namespaced()),
            ("ValueUnrealTypeName", self.value.to_string()),
            ("UnrealTypeIncludeStatement", self.include.clone()),
            ("ValueUnrealTypeIncludeStatement", self.value_include.clone()),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::emit::render;
    use crate::openapi::ir::templates::{
        ARRAY_HEADER, ARRAY_SOURCE, ENUM_HEADER, MAP_HEADER, MAP_SOURCE, OPTIONAL_HEADER,
        OPTIONAL_LIBRARY_HEADER, OPTIONAL_LIBRARY_SOURCE, OPTIONAL_SOURCE,
    };
    use crate::openapi::ir::types::Primitive;

    #[test]
    fn test_enum_values() {
        let decl = EnumDeclaration {
            ty: UnrealType::Enum("MailState".into()),
            values: vec!["unread".into(), "readOnce".into()],
        };
        let header = render(&ENUM_HEADER, &decl.replacements(&GeneratorConfig::default())).unwrap();
        assert!(header.contains("enum class EMailState : uint8"));
        assert!(header.contains(
            "Unread UMETA(DisplayName=\"Unread\", SerializationName=\"unread\"),\n\tReadOnce UMETA(DisplayName=\"Read Once\", SerializationName=\"readOnce\")"
        ));
    }

    #[test]
    fn test_optional_initializer() {
        let config = GeneratorConfig::default();
        let int_optional = OptionalDeclaration {
            ty: UnrealType::Optional(Box::new(UnrealType::Primitive(Primitive::Int32))),
            include: "#include \"AutoGen/Optionals/OptionalInt32.h\"".into(),
            value_include: String::new(),
        };
        let source = render(&OPTIONAL_SOURCE, &int_optional.replacements(&config)).unwrap();
        assert!(source.contains("Val = int32();"));

        let object_optional = OptionalDeclaration {
            ty: UnrealType::Optional(Box::new(UnrealType::Object("Mail".into()))),
            include: String::new(),
            value_include: String::new(),
        };
        let table = object_optional.replacements(&config);
        assert_eq!(table["_valueInitializerStatement"], "nullptr");
        for template in [OPTIONAL_HEADER, OPTIONAL_LIBRARY_HEADER, OPTIONAL_LIBRARY_SOURCE] {
            render(&template, &table).unwrap();
        }
    }

    #[test]
    fn test_wrapper_tables_cover_templates() {
        let config = GeneratorConfig::default();
        let string = UnrealType::STRING;
        let array = WrapperDeclaration {
            ty: UnrealType::ArrayWrapper(Box::new(string.clone())),
            value: string.clone(),
            include: String::new(),
            value_include: String::new(),
        };
        let map = WrapperDeclaration {
            ty: UnrealType::MapWrapper(Box::new(string.clone())),
            value: string,
            include: String::new(),
            value_include: String::new(),
        };
        assert!(array.is_array());
        assert!(!map.is_array());

        let header = render(&ARRAY_HEADER, &array.replacements(&config)).unwrap();
        assert!(header.contains("struct BEAMABLECORE_API FArrayOfString : public FBeamArray"));
        render(&ARRAY_SOURCE, &array.replacements(&config)).unwrap();
        render(&MAP_HEADER, &map.replacements(&config)).unwrap();
        render(&MAP_SOURCE, &map.replacements(&config)).unwrap();
    }
}
