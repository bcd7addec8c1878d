//! Declaration builders.
//!
//! Each declaration holds everything one generated file family needs and
//! flattens itself into a token table for the templates.

mod containers;
mod endpoint;
mod property;
mod serializable;
mod subsystem;

pub use containers::{EnumDeclaration, OptionalDeclaration, WrapperDeclaration};
pub use endpoint::{
    build_route_impl, EndpointBuilder, EndpointDeclaration, OperationSite, ResponseRegistry,
};
pub use property::PropertyDeclaration;
pub use serializable::{build_schema_types, ResponseBody, SerializableDeclaration};
pub use subsystem::{build_subsystems, SubsystemDeclaration};
