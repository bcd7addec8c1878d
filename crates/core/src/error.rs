//! Fatal generation errors.
//!
//! Every variant names the offending identifier and the document or service it
//! came from. Conditions the generator can recover from are logged instead.

use thiserror::Error;

/// Errors that abort a generation run before any file is produced.
#[derive(Debug, Error)]
pub enum GenError {
    /// An input document could not be parsed.
    #[error("failed to parse document '{document}': {message}")]
    Parse {
        /// File name or label of the document.
        document: String,
        /// Parser message.
        message: String,
    },
    /// A `$ref` points at a schema the document does not declare.
    #[error("unknown reference '{reference}' in document '{document}'")]
    UnknownRef {
        /// The reference as written.
        reference: String,
        /// Title of the owning document.
        document: String,
    },
    /// A union has no designed wrapper type in the union override table.
    #[error(
        "union '{structural}' used by '{handle}' in document '{document}' has no registered wrapper type"
    )]
    UnregisteredUnion {
        /// Field handle the union was found on.
        handle: String,
        /// Structural spelling of the union.
        structural: String,
        /// Title of the owning document.
        document: String,
    },
    /// The same union member was given two different discriminator values.
    #[error(
        "union member '{member}' has conflicting discriminators '{first}' and '{second}' in document '{document}'"
    )]
    ConflictingUnionTag {
        /// Unreal spelling of the member.
        member: String,
        /// Discriminator seen first.
        first: String,
        /// Conflicting discriminator.
        second: String,
        /// Title of the owning document.
        document: String,
    },
    /// An inline `type: object` schema forbids additional properties and has no reference.
    #[error("field '{handle}' in document '{document}' is an object without a declared shape")]
    ObjectWithoutShape {
        /// Field handle.
        handle: String,
        /// Title of the owning document.
        document: String,
    },
    /// A path parameter has a type the route builder cannot format.
    #[error("path parameter '{parameter}' of '{endpoint}' has unsupported type '{unreal_type}'")]
    UnsupportedPathParam {
        /// Parameter name.
        parameter: String,
        /// Global endpoint name.
        endpoint: String,
        /// Unreal spelling of the parameter type.
        unreal_type: String,
    },
    /// A query parameter has a type the route builder cannot format.
    #[error("query parameter '{parameter}' of '{endpoint}' has unsupported type '{unreal_type}'")]
    UnsupportedQueryParam {
        /// Parameter name.
        parameter: String,
        /// Global endpoint name.
        endpoint: String,
        /// Unreal spelling of the parameter type.
        unreal_type: String,
    },
    /// Two endpoints ended up with the same global name.
    #[error("endpoint name '{name}' is declared more than once (service '{service}', route '{route}')")]
    GlobalEndpointCollision {
        /// The colliding global name.
        name: String,
        /// Service declaring the second occurrence.
        service: String,
        /// Route of the second occurrence.
        route: String,
    },
    /// Two endpoints of one subsystem ended up with the same subsystem-local name.
    #[error("subsystem '{subsystem}' declares endpoint '{name}' more than once (route '{route}')")]
    SubsystemEndpointCollision {
        /// The colliding subsystem-local name.
        name: String,
        /// Owning subsystem.
        subsystem: String,
        /// Route of the second occurrence.
        route: String,
    },
    /// Appending path parameters did not make an endpoint name unique within its service.
    #[error("endpoint '{name}' of service '{service}' is still ambiguous after path-parameter suffixing")]
    LocalEndpointCollision {
        /// The ambiguous name.
        name: String,
        /// Owning service.
        service: String,
    },
    /// Wrapper synthesis was asked to wrap a type that is not a container.
    #[error("'{unreal_type}' on '{handle}' is not an array or map")]
    NotAContainer {
        /// Unreal spelling of the offending type.
        unreal_type: String,
        /// Field handle.
        handle: String,
    },
    /// A container wrapper would wrap another raw container.
    #[error("'{unreal_type}' on '{handle}' nests containers more than one level deep")]
    NestedContainer {
        /// Unreal spelling of the offending type.
        unreal_type: String,
        /// Field handle.
        handle: String,
    },
    /// A template references a token its replacement table does not provide.
    #[error("template '{template}' references missing token '{token}'")]
    MissingTemplateToken {
        /// Template name.
        template: String,
        /// Token name.
        token: String,
    },
    /// A union override value is not a UObject pointer spelling.
    #[error("union override '{structural}' maps to '{wrapper}', which is not a UObject pointer")]
    InvalidUnionOverride {
        /// Structural union spelling used as key.
        structural: String,
        /// Configured wrapper spelling.
        wrapper: String,
    },
    /// The updated generation-pass memo could not be serialized.
    #[error("failed to serialize generation-pass memo: {message}")]
    Memo {
        /// Underlying serializer message.
        message: String,
    },
}
