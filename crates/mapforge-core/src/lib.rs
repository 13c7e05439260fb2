//! Mapping resolution engine.
//!
//! Discovers the mappings declared in a schema, pairs their properties,
//! attaches a conversion strategy to each pair, binds nested mappings through
//! a bounded fixpoint and validates the result. Problems are reported as
//! structured diagnostics; nothing here fails fast on user input.

pub mod batch;
pub mod construct;
pub mod diagnostic;
pub mod directive;
pub mod error;
pub mod matcher;
pub mod model;
pub mod naming;
pub mod params;
pub mod resolve;
pub mod validate;

pub use batch::Batch;
pub use error::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        batch::Batch,
        diagnostic::{Diagnostic, DiagnosticCode, Diagnostics, Location, Severity},
        model::{
            DelegateCall, ElementMapping, EntryParameter, MappingArena, MappingId,
            MappingInformation, MappingKey, MethodCall, NullPolicy, PathHop, PropertyEnd,
            PropertyMapping, PropertyShape, ResolverCall, ResolverInstance, Strategy,
        },
        resolve::FixpointReport,
    };
}
