//! OpenAPI to Unreal Engine C++ bindings.
//!
//! Documents are read into a small serde model ([`spec`]), resolved into
//! declarations ([`ir`]) and rendered into header and source files by
//! [`generate`].

mod emitter;
pub mod ir;
pub mod spec;

pub use emitter::{generate, GeneratedFile, GenerationOutput};
