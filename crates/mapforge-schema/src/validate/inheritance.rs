use crate::prelude::*;
use std::collections::BTreeSet;

/// Every base chain must end at a root type.
pub fn validate_inheritance_cycles(schema: &Schema, errs: &mut ErrorTree) {
    let mut reported = BTreeSet::new();

    for ty in schema.types() {
        let mut visiting: Vec<&str> = Vec::new();
        let mut current = Some(ty);

        while let Some(node) = current {
            if let Some(at) = visiting.iter().position(|p| *p == node.path.as_str()) {
                let cycle = visiting[at..].to_vec();
                let key = cycle.iter().copied().min().unwrap_or_default().to_string();

                // one report per cycle, not one per member
                if reported.insert(key) {
                    err!(errs, "inheritance cycle: {} -> {}", cycle.join(" -> "), node.path);
                }
                break;
            }

            visiting.push(node.path.as_str());
            current = node.base.as_deref().and_then(|base| schema.get_type(base));
        }
    }
}
