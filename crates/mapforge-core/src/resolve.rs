//! Bounded fixpoint that binds delegate calls to their target mappings.
//!
//! A delegate is bound only once its target is itself fully resolved, or when
//! it targets its own mapping. Bindings are never undone, and a scan that
//! binds nothing ends the loop; mutually dependent, unresolved mappings are
//! left for the validator to report.

use crate::model::{MappingArena, MappingId, MappingInformation};
use serde::Serialize;

///
/// FixpointReport
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FixpointReport {
    pub scans: usize,
    pub bound: usize,
    pub unresolved: usize,
}

/// Bind every resolvable delegate in `arena`, then propagate async-ness
/// across bound delegates.
pub fn resolve_dependencies(arena: &mut MappingArena) -> FixpointReport {
    let pending = count_unbound(arena);
    let max_scans = pending + 1;
    let mut report = FixpointReport::default();

    while report.scans < max_scans {
        report.scans += 1;

        // resolution state as of the start of this scan
        let resolved: Vec<bool> = arena.iter().map(MappingInformation::is_fully_resolved).collect();

        let mut bindings = Vec::new();
        for info in arena.iter() {
            for (slot, delegate) in info.delegates().enumerate() {
                if delegate.is_bound() {
                    continue;
                }
                let Some(candidate) = arena.find(&delegate.key) else {
                    continue;
                };
                if candidate == info.id || resolved[candidate.0] {
                    bindings.push((info.id, slot, candidate));
                }
            }
        }

        tracing::trace!(scan = report.scans, bound = bindings.len(), "delegate scan");
        if bindings.is_empty() {
            break;
        }
        report.bound += bindings.len();

        for (id, slot, target) in bindings {
            if let Some(delegate) = arena[id].delegates_mut().nth(slot) {
                delegate.target = Some(target);
            }
        }
    }

    report.unresolved = count_unbound(arena);
    propagate_async(arena);

    tracing::debug!(
        scans = report.scans,
        bound = report.bound,
        unresolved = report.unresolved,
        "dependency resolution finished"
    );

    report
}

fn count_unbound(arena: &MappingArena) -> usize {
    arena
        .iter()
        .flat_map(MappingInformation::delegates)
        .filter(|d| !d.is_bound())
        .count()
}

// A routine calling an async routine must be async too.
fn propagate_async(arena: &mut MappingArena) {
    loop {
        let flips: Vec<MappingId> = arena
            .iter()
            .filter(|info| !info.is_async)
            .filter(|info| {
                info.delegate_targets()
                    .into_iter()
                    .any(|target| arena.get(target).is_some_and(|t| t.is_async))
            })
            .map(|info| info.id)
            .collect();

        if flips.is_empty() {
            break;
        }
        for id in flips {
            arena[id].is_async = true;
        }
    }
}
