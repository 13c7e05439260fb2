//! Type schema snapshot consumed by the mapping engine.
//!
//! The schema is produced by an external type-analysis pass and is treated as
//! read-only input: type identities, their properties, attached directives,
//! and the resolver/method helpers that directives may refer to.

pub mod error;
pub mod node;
pub mod types;
pub mod validate;

/// Separator used by fully-qualified type paths.
pub const PATH_SEPARATOR: &str = "::";

/// Separator used by dotted property paths in directives.
pub const PROPERTY_PATH_SEPARATOR: char = '.';

use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{CollectionKind, MapKind, TypeKind, TypeRef},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema validation failed: {0}")]
    Validation(error::ErrorTree),

    #[error("failed to decode schema snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}
