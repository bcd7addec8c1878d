//! Unreal source templates compiled into the binary.

/// A named template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Path below `templates/unreal/`, used in errors.
    pub name: &'static str,
    /// Template text with `₢Token₢` holes.
    pub text: &'static str,
}

macro_rules! template {
    ($path:literal) => {
        Template {
            name: $path,
            text: include_str!(concat!("../../../templates/unreal/", $path)),
        }
    };
}

// ============================================================================
// Types
// ============================================================================

/// `UENUM` header.
pub const ENUM_HEADER: Template = template!("enum/header.h.tmpl");

/// Optional struct header.
pub const OPTIONAL_HEADER: Template = template!("optional/header.h.tmpl");
/// Optional struct implementation.
pub const OPTIONAL_SOURCE: Template = template!("optional/source.cpp.tmpl");
/// Optional Blueprint library header.
pub const OPTIONAL_LIBRARY_HEADER: Template = template!("optional/library.h.tmpl");
/// Optional Blueprint library implementation.
pub const OPTIONAL_LIBRARY_SOURCE: Template = template!("optional/library.cpp.tmpl");

/// `FArrayOf` wrapper header.
pub const ARRAY_HEADER: Template = template!("wrappers/array.h.tmpl");
/// `FArrayOf` wrapper implementation.
pub const ARRAY_SOURCE: Template = template!("wrappers/array.cpp.tmpl");
/// `FMapOf` wrapper header.
pub const MAP_HEADER: Template = template!("wrappers/map.h.tmpl");
/// `FMapOf` wrapper implementation.
pub const MAP_SOURCE: Template = template!("wrappers/map.cpp.tmpl");

/// Blueprint-visible property.
pub const PROPERTY_UPROPERTY: Template = template!("property/uproperty.tmpl");
/// Plain C++ field, for types Blueprint cannot see.
pub const PROPERTY_FIELD: Template = template!("property/field.tmpl");

/// Serializable UObject header.
pub const SERIALIZABLE_HEADER: Template = template!("serializable/header.h.tmpl");
/// Serializable UObject implementation.
pub const SERIALIZABLE_SOURCE: Template = template!("serializable/source.cpp.tmpl");
/// Make/Break library header.
pub const SERIALIZABLE_LIBRARY_HEADER: Template = template!("serializable/library.h.tmpl");
/// Make/Break library implementation.
pub const SERIALIZABLE_LIBRARY_SOURCE: Template = template!("serializable/library.cpp.tmpl");
/// `Break` declaration, only present when the type has Blueprint properties.
pub const BREAK_DECLARATION: Template = template!("serializable/break_declaration.tmpl");
/// `Break` definition.
pub const BREAK_DEFINITION: Template = template!("serializable/break_definition.tmpl");

// ============================================================================
// Endpoints
// ============================================================================

/// Request UObject header.
pub const REQUEST_HEADER: Template = template!("endpoint/request.h.tmpl");
/// Request UObject implementation.
pub const REQUEST_SOURCE: Template = template!("endpoint/request.cpp.tmpl");
/// K2 node header.
pub const NODE_HEADER: Template = template!("endpoint/node.h.tmpl");
/// K2 node implementation.
pub const NODE_SOURCE: Template = template!("endpoint/node.cpp.tmpl");
/// Body of `BuildBody` for one body parameter.
pub const BUILD_BODY: Template = template!("endpoint/build_body.tmpl");

// ============================================================================
// Subsystems
// ============================================================================

/// Engine subsystem header.
pub const SUBSYSTEM_HEADER: Template = template!("subsystem/api.h.tmpl");
/// Engine subsystem implementation.
pub const SUBSYSTEM_SOURCE: Template = template!("subsystem/api.cpp.tmpl");

/// Private Blueprint request implementation, declaration.
pub const RAW_BP_DECLARATION: Template = template!("subsystem/raw_bp_declaration.tmpl");
/// Private C++ request implementation, declaration.
pub const RAW_CPP_DECLARATION: Template = template!("subsystem/raw_cpp_declaration.tmpl");
/// Authenticated private Blueprint request implementation, declaration.
pub const RAW_AUTH_BP_DECLARATION: Template = template!("subsystem/raw_auth_bp_declaration.tmpl");
/// Authenticated private C++ request implementation, declaration.
pub const RAW_AUTH_CPP_DECLARATION: Template = template!("subsystem/raw_auth_cpp_declaration.tmpl");
/// Private Blueprint request implementation.
pub const RAW_BP_DEFINITION: Template = template!("subsystem/raw_bp_definition.tmpl");
/// Private C++ request implementation.
pub const RAW_CPP_DEFINITION: Template = template!("subsystem/raw_cpp_definition.tmpl");
/// Authenticated private Blueprint request implementation.
pub const RAW_AUTH_BP_DEFINITION: Template = template!("subsystem/raw_auth_bp_definition.tmpl");
/// Authenticated private C++ request implementation.
pub const RAW_AUTH_CPP_DEFINITION: Template = template!("subsystem/raw_auth_cpp_definition.tmpl");
/// Private Blueprint request implementation for microservice clients.
pub const RAW_MS_BP_DEFINITION: Template = template!("subsystem/raw_ms_bp_definition.tmpl");
/// Private C++ request implementation for microservice clients.
pub const RAW_MS_CPP_DEFINITION: Template = template!("subsystem/raw_ms_cpp_definition.tmpl");
/// Authenticated private Blueprint request implementation for microservice clients.
pub const RAW_MS_AUTH_BP_DEFINITION: Template =
    template!("subsystem/raw_ms_auth_bp_definition.tmpl");
/// Authenticated private C++ request implementation for microservice clients.
pub const RAW_MS_AUTH_CPP_DEFINITION: Template =
    template!("subsystem/raw_ms_auth_cpp_definition.tmpl");

/// `CPP_` entry point taking a lambda-bindable handler, declaration.
pub const LAMBDA_DECLARATION: Template = template!("subsystem/lambda_declaration.tmpl");
/// Authenticated `CPP_` entry point, declaration.
pub const LAMBDA_AUTH_DECLARATION: Template = template!("subsystem/lambda_auth_declaration.tmpl");
/// `CPP_` entry point.
pub const LAMBDA_DEFINITION: Template = template!("subsystem/lambda_definition.tmpl");
/// Authenticated `CPP_` entry point.
pub const LAMBDA_AUTH_DEFINITION: Template = template!("subsystem/lambda_auth_definition.tmpl");

/// Blueprint-callable entry point, declaration.
pub const UFUNCTION_DECLARATION: Template = template!("subsystem/ufunction_declaration.tmpl");
/// Authenticated Blueprint-callable entry point, declaration.
pub const UFUNCTION_AUTH_DECLARATION: Template =
    template!("subsystem/ufunction_auth_declaration.tmpl");
/// Blueprint-callable entry point.
pub const UFUNCTION_DEFINITION: Template = template!("subsystem/ufunction_definition.tmpl");
/// Authenticated Blueprint-callable entry point.
pub const UFUNCTION_AUTH_DEFINITION: Template =
    template!("subsystem/ufunction_auth_definition.tmpl");

/// Every template, for coverage checks.
#[cfg(test)]
pub const ALL: &[Template] = &[
    ENUM_HEADER,
    OPTIONAL_HEADER,
    OPTIONAL_SOURCE,
    OPTIONAL_LIBRARY_HEADER,
    OPTIONAL_LIBRARY_SOURCE,
    ARRAY_HEADER,
    ARRAY_SOURCE,
    MAP_HEADER,
    MAP_SOURCE,
    PROPERTY_UPROPERTY,
    PROPERTY_FIELD,
    SERIALIZABLE_HEADER,
    SERIALIZABLE_SOURCE,
    SERIALIZABLE_LIBRARY_HEADER,
    SERIALIZABLE_LIBRARY_SOURCE,
    BREAK_DECLARATION,
    BREAK_DEFINITION,
    REQUEST_HEADER,
    REQUEST_SOURCE,
    NODE_HEADER,
    NODE_SOURCE,
    BUILD_BODY,
    SUBSYSTEM_HEADER,
    SUBSYSTEM_SOURCE,
    RAW_BP_DECLARATION,
    RAW_CPP_DECLARATION,
    RAW_AUTH_BP_DECLARATION,
    RAW_AUTH_CPP_DECLARATION,
    RAW_BP_DEFINITION,
    RAW_CPP_DEFINITION,
    RAW_AUTH_BP_DEFINITION,
    RAW_AUTH_CPP_DEFINITION,
    RAW_MS_BP_DEFINITION,
    RAW_MS_CPP_DEFINITION,
    RAW_MS_AUTH_BP_DEFINITION,
    RAW_MS_AUTH_CPP_DEFINITION,
    LAMBDA_DECLARATION,
    LAMBDA_AUTH_DECLARATION,
    LAMBDA_DEFINITION,
    LAMBDA_AUTH_DEFINITION,
    UFUNCTION_DECLARATION,
    UFUNCTION_AUTH_DECLARATION,
    UFUNCTION_DEFINITION,
    UFUNCTION_AUTH_DEFINITION,
];

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::emit::{tokens, TOKEN_SENTINEL};

    #[test]
    fn test_sentinels_are_balanced() {
        for template in ALL {
            let count = template.text.matches(TOKEN_SENTINEL).count();
            assert_eq!(count % 2, 0, "{}", template.name);
        }
    }

    #[test]
    fn test_token_names_are_identifiers() {
        for template in ALL {
            for token in tokens(template.text) {
                assert!(
                    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
                    "{}: {token:?}",
                    template.name
                );
            }
        }
    }
}
