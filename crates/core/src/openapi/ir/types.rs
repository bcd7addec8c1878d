//! Unreal-side type model.
//!
//! `UnrealType` is a closed variant over every shape a schema can resolve to.
//! Its `Display` impl produces the exact Unreal spelling (`TArray<FString>`,
//! `FOptionalMapOfInt32`, `UOneOf_UCronTrigger_UExactTrigger*`), and
//! [`UnrealType::namespaced`] produces the identifier used for file names and
//! nested type names. Containers, wrappers and optionals carry the wrapped type
//! itself, so unwrapping never has to re-parse a spelling.

use std::fmt;

/// Scalar types that map onto Unreal built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// `FString`
    String,
    /// `int8` (`string/byte`)
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `bool`
    Bool,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `FGuid` (`string/uuid`)
    Guid,
    /// `FDateTime` (`string/date-time`)
    DateTime,
}

impl Primitive {
    /// Unreal spelling.
    pub const fn unreal_name(self) -> &'static str {
        match self {
            Self::String => "FString",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Double => "double",
            Self::Guid => "FGuid",
            Self::DateTime => "FDateTime",
        }
    }

    /// Namespaced name used inside wrapper and optional names.
    pub const fn namespaced(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Bool => "Bool",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Guid => "Guid",
            Self::DateTime => "DateTime",
        }
    }

    /// Numeric types, which need `FDefaultValueHelper` to parse from strings.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float | Self::Double
        )
    }
}

/// Domain primitives tagged with `x-beamable-semantic-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticKind {
    /// Customer id.
    Cid,
    /// Project id.
    Pid,
    /// Account id.
    AccountId,
    /// Player gamer tag.
    Gamertag,
    /// Content manifest id.
    ContentManifestId,
    /// Content id.
    ContentId,
    /// Stats type.
    StatsType,
}

impl SemanticKind {
    /// Parse the extension value.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Cid" => Some(Self::Cid),
            "Pid" => Some(Self::Pid),
            "AccountId" => Some(Self::AccountId),
            "Gamertag" => Some(Self::Gamertag),
            "ContentManifestId" => Some(Self::ContentManifestId),
            "ContentId" => Some(Self::ContentId),
            "StatsType" => Some(Self::StatsType),
            _ => None,
        }
    }

    /// Namespaced name, `Beam{Kind}`.
    pub const fn namespaced(self) -> &'static str {
        match self {
            Self::Cid => "BeamCid",
            Self::Pid => "BeamPid",
            Self::AccountId => "BeamAccountId",
            Self::Gamertag => "BeamGamerTag",
            Self::ContentManifestId => "BeamContentManifestId",
            Self::ContentId => "BeamContentId",
            Self::StatsType => "BeamStatsType",
        }
    }
}

/// One branch of a polymorphic union with the discriminator value selecting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionMember {
    /// Branch type.
    pub ty: UnrealType,
    /// Expected value of the payload's `type` field.
    pub tag: String,
}

/// A resolved Unreal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnrealType {
    /// Built-in scalar.
    Primitive(Primitive),
    /// Domain primitive struct, `FBeam{Kind}`.
    Semantic(SemanticKind),
    /// Hand-written replacement struct `FBeamClientPermission`.
    ClientPermission,
    /// Untyped JSON blob, `TSharedPtr<FJsonObject>`.
    JsonObject,
    /// Plain-text response body, `UBeamPlainTextResponseBody*`.
    PlainTextResponse,
    /// Generated enum, `E{ns}`.
    Enum(String),
    /// Generated UObject, `U{ns}*`.
    Object(String),
    /// Structural form of a polymorphic union, `UOneOf_{A}_{B}*`.
    Union(Vec<UnionMember>),
    /// `TArray<E>`
    Array(Box<UnrealType>),
    /// `TMap<FString, V>`
    Map(Box<UnrealType>),
    /// Array wrapper struct `FArrayOf{ns}` holding `TArray<E>`.
    ArrayWrapper(Box<UnrealType>),
    /// Map wrapper struct `FMapOf{ns}` holding `TMap<FString, V>`.
    MapWrapper(Box<UnrealType>),
    /// Optional struct `FOptional{ns}`.
    Optional(Box<UnrealType>),
}

impl UnrealType {
    /// `FString`, the most common leaf.
    pub const STRING: Self = Self::Primitive(Primitive::String);

    /// Identifier used in file names and inside wrapper names.
    pub fn namespaced(&self) -> String {
        match self {
            Self::Primitive(p) => p.namespaced().to_string(),
            Self::Semantic(kind) => kind.namespaced().to_string(),
            Self::ClientPermission => "BeamClientPermission".to_string(),
            Self::JsonObject => "JsonObject".to_string(),
            Self::PlainTextResponse => "BeamPlainTextResponseBody".to_string(),
            Self::Enum(ns) | Self::Object(ns) => ns.clone(),
            Self::Union(members) => {
                let names: Vec<String> = members.iter().map(|m| m.ty.pointerless()).collect();
                format!("OneOf_{}", names.join("_"))
            }
            Self::Array(inner) | Self::ArrayWrapper(inner) => format!("ArrayOf{}", inner.namespaced()),
            Self::Map(inner) | Self::MapWrapper(inner) => format!("MapOf{}", inner.namespaced()),
            Self::Optional(inner) => format!("Optional{}", inner.namespaced()),
        }
    }

    /// Unreal spelling with any trailing `*` removed.
    pub fn pointerless(&self) -> String {
        let spelled = self.to_string();
        match spelled.strip_suffix('*') {
            Some(stripped) => stripped.to_string(),
            None => spelled,
        }
    }

    /// The wrapped value of an optional, otherwise the type itself.
    pub fn non_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// Element of an array or value of a map.
    pub fn container_value(&self) -> Option<&Self> {
        match self {
            Self::Array(inner) | Self::Map(inner) => Some(inner),
            _ => None,
        }
    }

    /// Replace a raw container by its wrapper struct. Other types are unchanged.
    pub fn into_wrapped(self) -> Self {
        match self {
            Self::Array(inner) => Self::ArrayWrapper(inner),
            Self::Map(inner) => Self::MapWrapper(inner),
            other => other,
        }
    }

    /// Whether this is an optional.
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Optional wrapping an array or map.
    pub fn is_optional_container(&self) -> bool {
        match self {
            Self::Optional(inner) => matches!(**inner, Self::Array(_) | Self::Map(_)),
            _ => false,
        }
    }

    /// `TArray`
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// `TMap`
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Generated enum.
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    /// Untyped JSON blob.
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::JsonObject)
    }

    /// `bool` or `FOptionalBool`.
    pub fn is_bool_like(&self) -> bool {
        matches!(self.non_optional(), Self::Primitive(Primitive::Bool))
    }

    /// Scalars serialized with the raw-primitive helpers. `FString` is not one of them.
    pub const fn is_raw_primitive(&self) -> bool {
        match self {
            Self::Primitive(p) => !matches!(p, Primitive::String),
            _ => false,
        }
    }

    /// Numeric scalar.
    pub const fn is_numeric(&self) -> bool {
        match self {
            Self::Primitive(p) => p.is_numeric(),
            _ => false,
        }
    }

    /// Domain primitive.
    pub const fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic(_))
    }

    /// Whether a semantic type appears anywhere inside this type.
    pub fn contains_semantic(&self) -> bool {
        match self {
            Self::Semantic(_) => true,
            Self::Array(inner)
            | Self::Map(inner)
            | Self::ArrayWrapper(inner)
            | Self::MapWrapper(inner)
            | Self::Optional(inner) => inner.contains_semantic(),
            Self::Union(members) => members.iter().any(|m| m.ty.contains_semantic()),
            Self::Primitive(_)
            | Self::ClientPermission
            | Self::JsonObject
            | Self::PlainTextResponse
            | Self::Enum(_)
            | Self::Object(_) => false,
        }
    }

    /// UObject pointer types.
    pub const fn is_uobject(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Union(_) | Self::PlainTextResponse)
    }

    /// Generated or hand-written `USTRUCT`s serialized through `SerializeUStruct`.
    pub const fn is_ustruct(&self) -> bool {
        matches!(
            self,
            Self::ClientPermission | Self::ArrayWrapper(_) | Self::MapWrapper(_)
        )
    }

    /// Array and map wrapper structs.
    pub const fn is_wrapper(&self) -> bool {
        matches!(self, Self::ArrayWrapper(_) | Self::MapWrapper(_))
    }

    /// The union this type holds directly, as array element or as map value.
    pub fn find_union(&self) -> Option<&[UnionMember]> {
        match self.non_optional() {
            Self::Union(members) => Some(members),
            Self::Array(inner) | Self::Map(inner) => match &**inner {
                Self::Union(members) => Some(members),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for UnrealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.unreal_name()),
            Self::Semantic(kind) => write!(f, "F{}", kind.namespaced()),
            Self::ClientPermission => f.write_str("FBeamClientPermission"),
            Self::JsonObject => f.write_str("TSharedPtr<FJsonObject>"),
            Self::PlainTextResponse => f.write_str("UBeamPlainTextResponseBody*"),
            Self::Enum(ns) => write!(f, "E{ns}"),
            Self::Object(ns) => write!(f, "U{ns}*"),
            Self::Union(_) => write!(f, "U{}*", self.namespaced()),
            Self::Array(inner) => write!(f, "TArray<{inner}>"),
            Self::Map(inner) => write!(f, "TMap<FString, {inner}>"),
            Self::ArrayWrapper(_) | Self::MapWrapper(_) | Self::Optional(_) => {
                write!(f, "F{}", self.namespaced())
            }
        }
    }
}

/// Overridden and structural forms of one resolution.
///
/// The two only differ where a union was replaced by its designed wrapper type;
/// they always agree on shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Public name, after union overrides.
    pub overridden: UnrealType,
    /// True nested structure.
    pub structural: UnrealType,
}

impl ResolvedType {
    /// A resolution where both forms agree.
    pub fn same(ty: UnrealType) -> Self {
        Self {
            overridden: ty.clone(),
            structural: ty,
        }
    }

    /// Apply the same shape transformation to both forms.
    pub fn map(self, f: impl Fn(UnrealType) -> UnrealType) -> Self {
        Self {
            overridden: f(self.overridden),
            structural: f(self.structural),
        }
    }
}
