//! Core of unreal-apigen: OpenAPI documents in, Unreal Engine C++ out.
//!
//! [`generate`] takes parsed [`OpenApiDocument`]s, the [`GeneratorConfig`]
//! and the memo of previous generation passes and returns every file the run
//! produces. It never touches the filesystem; writing is left to the caller.
//!
//! [`GeneratorConfig`]: unreal_apigen_common::GeneratorConfig

pub mod error;
pub mod openapi;

pub use error::GenError;
pub use openapi::spec::OpenApiDocument;
pub use openapi::{generate, GeneratedFile, GenerationOutput};
