mod directive;
mod method;
mod property;
mod resolver;
mod schema;
mod type_def;

pub use directive::*;
pub use method::*;
pub use property::*;
pub use resolver::*;
pub use schema::*;
pub use type_def::*;

use crate::{err, error::ErrorTree, types::TypeRef};

///
/// ValidateNode
///
/// Local structural checks a node can run against the schema it lives in.
///

pub trait ValidateNode {
    fn validate(&self, _schema: &Schema) -> Result<(), ErrorTree> {
        Ok(())
    }
}

/// Report every object path in `ty` that the schema does not declare.
pub(crate) fn validate_type_ref(ty: &TypeRef, schema: &Schema, errs: &mut ErrorTree) {
    for path in ty.object_paths() {
        if schema.get_type(path).is_none() {
            err!(errs, "unknown object type '{path}'");
        }
    }
}

/// Last `::` segment of a fully-qualified path.
#[must_use]
pub fn path_ident(path: &str) -> &str {
    path.rsplit(crate::PATH_SEPARATOR).next().unwrap_or(path)
}

/// Everything before the last `::` segment, if any.
#[must_use]
pub fn path_module(path: &str) -> Option<&str> {
    path.rfind(crate::PATH_SEPARATOR).map(|at| &path[..at])
}
