//! Helpers behind [`Container`](crate::Container) resolution: parameter
//! resolution, callable invocation and the AfterBuild pipeline.

mod after_build;
mod method;
mod param;

pub(crate) use after_build::AfterBuildHandler;
pub use method::{CallableRef, DEFAULT_METHOD, Lambda};
pub(crate) use method::MethodResolver;
pub(crate) use param::ParamResolver;
