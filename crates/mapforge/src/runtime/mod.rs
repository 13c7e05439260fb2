//! Support types referenced by generated routines.

mod error;
mod hook;
mod registry;
mod resolver;

pub use error::MappingError;
pub use hook::AfterMap;
pub use registry::{Mapper, MapperRegistry};
pub use resolver::{AsyncValueResolver, ValueResolver};
