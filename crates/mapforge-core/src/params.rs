//! Entry parameters of a generated routine: its own helper parameters plus
//! those of every mapping it reaches through bound delegates, hoisted into
//! one deduplicated list.

use crate::{
    diag,
    diagnostic::{Diagnostics, Location},
    model::{EntryParameter, MappingArena, MappingId},
    naming,
};
use std::collections::BTreeSet;

/// Names the generated routine already uses for its own bindings.
pub const RESERVED_NAMES: &[&str] = &["source", "sources", "destination"];

/// Transitive, deduplicated parameter list for mapping `id`.
///
/// Parameters are identified by (local name, type). When two different
/// parameters share a name, the later one is renamed after the destination
/// type of the mapping that requires it.
pub fn entry_parameters(arena: &MappingArena, id: MappingId, diags: &mut Diagnostics) -> Vec<EntryParameter> {
    let Some(root) = arena.get(id) else {
        return Vec::new();
    };

    let mut taken: BTreeSet<String> = RESERVED_NAMES.iter().map(ToString::to_string).collect();
    taken.extend(root.resolvers.iter().map(|r| r.ident.clone()));

    let mut out: Vec<EntryParameter> = Vec::new();
    for reached in reachable(arena, id) {
        let Some(info) = arena.get(reached) else {
            continue;
        };

        for parameter in &info.local_parameters {
            if out.iter().any(|p| p.key() == parameter.key()) {
                continue;
            }

            let mut parameter = parameter.clone();
            if taken.contains(&parameter.name) {
                let renamed = format!("{}_{}", naming::snake_ident(info.destination()), parameter.local);
                if taken.contains(&renamed) {
                    diag!(
                        diags,
                        ParameterCollision,
                        Location::ty(root.destination()),
                        "parameter '{}' required by '{}' collides with an existing parameter",
                        parameter.local,
                        info.key
                    );
                    continue;
                }
                parameter.name = renamed;
            }

            taken.insert(parameter.name.clone());
            out.push(parameter);
        }
    }

    out
}

/// Mappings reachable from `id` through bound delegates, `id` first,
/// in depth-first pre-order.
#[must_use]
pub fn reachable(arena: &MappingArena, id: MappingId) -> Vec<MappingId> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![id];

    while let Some(next) = stack.pop() {
        if !seen.insert(next) {
            continue;
        }
        out.push(next);

        if let Some(info) = arena.get(next) {
            for target in info.delegate_targets().into_iter().rev() {
                if !seen.contains(&target) {
                    stack.push(target);
                }
            }
        }
    }

    out
}
