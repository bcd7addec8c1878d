//! Wrapper synthesis.
//!
//! Unreal reflection cannot expose `TArray<TArray<T>>`, `TMap<FString, TArray<T>>`
//! and friends, nor an optional without a named struct. Whenever a resolved
//! field needs one of these helper types, the synthesizer records a declaration
//! for it. Declarations are keyed by namespaced name: the first registration
//! wins and later ones are ignored. Types a previous generation pass already
//! produced are filtered out at emission time, not here, so the declarations of
//! one run never depend on the memo.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GenError;

use super::decl::{EnumDeclaration, OptionalDeclaration, WrapperDeclaration};
use super::resolve::Resolver;
use super::types::{ResolvedType, UnionMember, UnrealType};

/// Designed wrapper type of a union together with its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymorphicWrapper {
    /// The overridden `U{Wrapper}*` type.
    pub ty: UnrealType,
    /// Members in declaration order.
    pub members: Vec<UnionMember>,
}

/// Collects helper type declarations for one generation run.
#[derive(Debug, Default)]
pub struct WrapperSynthesizer {
    /// `FOptional*` structs.
    pub optionals: Vec<OptionalDeclaration>,
    /// `FArrayOf*` structs.
    pub arrays: Vec<WrapperDeclaration>,
    /// `FMapOf*` structs.
    pub maps: Vec<WrapperDeclaration>,
    /// `UENUM`s.
    pub enums: Vec<EnumDeclaration>,
    /// Union wrapper UObjects.
    pub polymorphic: Vec<PolymorphicWrapper>,
    declared: BTreeSet<String>,
    union_tags: BTreeMap<String, String>,
}

impl WrapperSynthesizer {
    /// Empty synthesizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a declaration with this namespaced name was registered.
    pub fn is_declared(&self, ns: &str) -> bool {
        self.declared.contains(ns)
    }

    /// Register everything a resolved field or parameter type needs.
    pub fn register_field(
        &mut self,
        resolver: &Resolver<'_>,
        handle: &str,
        resolved: &ResolvedType,
        document: &str,
    ) -> Result<(), GenError> {
        self.register_union(resolved, handle, document)?;
        if resolved.overridden.is_optional() {
            self.register_optional(resolver, &resolved.overridden);
        }
        if let Some(value) = resolved.overridden.non_optional().container_value()
            && value.is_wrapper()
        {
            self.register_wrapper(resolver, value, handle)?;
        }
        Ok(())
    }

    /// Register an `FOptional*` struct. Non-optional types are ignored.
    pub fn register_optional(&mut self, resolver: &Resolver<'_>, ty: &UnrealType) {
        let UnrealType::Optional(value) = ty else {
            return;
        };
        if !self.declared.insert(ty.namespaced()) {
            return;
        }
        tracing::debug!(ns = %ty.namespaced(), "Synthesized optional.");
        self.optionals.push(OptionalDeclaration {
            ty: ty.clone(),
            include: resolver.include_for(ty),
            value_include: resolver.include_for(value),
        });
    }

    /// Register an `FArrayOf*` or `FMapOf*` struct.
    pub fn register_wrapper(
        &mut self,
        resolver: &Resolver<'_>,
        ty: &UnrealType,
        handle: &str,
    ) -> Result<(), GenError> {
        let (UnrealType::ArrayWrapper(value) | UnrealType::MapWrapper(value)) = ty else {
            return Err(GenError::NotAContainer {
                unreal_type: ty.to_string(),
                handle: handle.to_string(),
            });
        };
        if matches!(
            **value,
            UnrealType::Array(_)
                | UnrealType::Map(_)
                | UnrealType::ArrayWrapper(_)
                | UnrealType::MapWrapper(_)
        ) {
            return Err(GenError::NestedContainer {
                unreal_type: ty.to_string(),
                handle: handle.to_string(),
            });
        }
        if !self.declared.insert(ty.namespaced()) {
            return Ok(());
        }

        tracing::debug!(ns = %ty.namespaced(), "Synthesized container wrapper.");
        let declaration = WrapperDeclaration {
            ty: ty.clone(),
            value: (**value).clone(),
            include: resolver.include_for(ty),
            value_include: resolver.include_for(value),
        };
        if declaration.is_array() {
            self.arrays.push(declaration);
        } else {
            self.maps.push(declaration);
        }
        Ok(())
    }

    /// Register a `UENUM`.
    pub fn register_enum(&mut self, declaration: EnumDeclaration) {
        if self.declared.insert(declaration.ty.namespaced()) {
            self.enums.push(declaration);
        }
    }

    /// Register the designed wrapper of a union held directly, as array element
    /// or as map value.
    ///
    /// Each member type keeps the discriminator it was first seen with across
    /// every union of the run.
    pub fn register_union(
        &mut self,
        resolved: &ResolvedType,
        handle: &str,
        document: &str,
    ) -> Result<(), GenError> {
        let Some(members) = resolved.structural.find_union() else {
            return Ok(());
        };
        let Some(wrapper) = union_wrapper(&resolved.overridden) else {
            return Ok(());
        };

        for member in members {
            let key = member.ty.to_string();
            match self.union_tags.get(&key) {
                Some(first) if *first != member.tag => {
                    return Err(GenError::ConflictingUnionTag {
                        member: key,
                        first: first.clone(),
                        second: member.tag.clone(),
                        document: document.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    self.union_tags.insert(key, member.tag.clone());
                }
            }
        }

        if self.declared.insert(wrapper.namespaced()) {
            tracing::debug!(ns = %wrapper.namespaced(), handle, "Synthesized polymorphic wrapper.");
            self.polymorphic.push(PolymorphicWrapper {
                ty: wrapper.clone(),
                members: members.to_vec(),
            });
        }
        Ok(())
    }
}

/// The overridden counterpart of a union found by [`UnrealType::find_union`].
fn union_wrapper(overridden: &UnrealType) -> Option<&UnrealType> {
    match overridden.non_optional() {
        ty @ UnrealType::Object(_) => Some(ty),
        UnrealType::Array(inner) | UnrealType::Map(inner) => match &**inner {
            ty @ UnrealType::Object(_) => Some(ty),
            _ => None,
        },
        _ => None,
    }
}
