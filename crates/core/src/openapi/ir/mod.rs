//! Intermediate representation for OpenAPI to Unreal code generation.
//!
//! Generation is split in three layers:
//! 1. Naming: collision maps decide every generated identifier up front
//! 2. Resolution: schemas become Unreal types and helper declarations
//! 3. Emission: declarations flatten into token tables for the templates
//!
//! ## Module Structure
//!
//! - `collisions`: service, schema and endpoint naming; required flags
//! - `resolve`: schema to `UnrealType` resolution, include statements, semantic fields
//! - `types`: the Unreal type model (`UnrealType`, `ResolvedType`)
//! - `wrappers`: optional, container, enum and union wrapper synthesis
//! - `decl`: declaration builders for properties, serializables, endpoints and subsystems
//! - `emit`: literal `₢Token₢` substitution
//! - `templates`: the Unreal source templates
//! - `utils`: identifier helpers shared across modules

pub mod collisions;
pub mod decl;
pub mod emit;
pub mod resolve;
pub mod templates;
pub mod types;
pub mod utils;
pub mod wrappers;
