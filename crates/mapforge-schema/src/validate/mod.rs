//! Schema validation orchestration.
//!
//! These checks cover the adapter contract only: a schema that fails them is
//! malformed input and no generation pass runs. Problems with individual
//! mappings are diagnostics raised later by the engine.

pub mod inheritance;

use crate::{
    Error,
    error::ErrorTree,
    node::{Schema, ValidateNode},
};

/// Run full schema validation in a staged, deterministic order.
pub fn validate_schema(schema: &Schema) -> Result<(), Error> {
    // Phase 1: validate each node (structural + local invariants).
    let mut errors = validate_nodes(schema);

    // Phase 2: enforce schema-wide invariants.
    validate_global(schema, &mut errors);

    errors.result().map_err(Error::Validation)
}

fn validate_nodes(schema: &Schema) -> ErrorTree {
    let mut errors = ErrorTree::new();

    for ty in schema.types() {
        errors.add_result(ty.path.clone(), ty.validate(schema));
    }

    for resolver in schema.resolvers() {
        errors.add_result(resolver.path.clone(), resolver.validate(schema));
    }

    errors
}

fn validate_global(schema: &Schema, errors: &mut ErrorTree) {
    inheritance::validate_inheritance_cycles(schema, errors);
}
