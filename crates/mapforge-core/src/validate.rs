use crate::{
    diag,
    diagnostic::{Diagnostics, Location},
    model::{MappingArena, MappingId},
};
use mapforge_config_build::MapperConfig;

/// Post-fixpoint checks for one mapping. Returns the new diagnostics; the
/// caller attaches them to the mapping.
#[must_use]
pub fn validate_mapping(arena: &MappingArena, id: MappingId, config: &MapperConfig) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(info) = arena.get(id) else {
        return diags;
    };

    for name in &info.leftover_destinations {
        diag!(
            diags,
            LeftoverDestinationProperty,
            Location::property(info.destination(), name),
            "destination property '{name}' is not mapped from '{}'",
            info.source()
        );
    }

    for name in &info.unclaimed_sources {
        diag!(
            diags,
            UnclaimedSourceProperty,
            Location::property(info.source(), name),
            "source property '{name}' has no counterpart on '{}' and is not ignored",
            info.destination()
        );
    }

    // an invalid property was dropped during construction and is already diagnosed
    if info.properties.is_empty() && info.is_valid() && diags.is_empty() {
        diag!(
            diags,
            NoPropertyMappings,
            Location::ty(info.destination()),
            "mapping {} maps no properties",
            info.key
        );
    }

    for property in &info.properties {
        let location = Location::property(info.destination(), &property.destination.name);

        for delegate in property.strategies().into_iter().filter_map(|s| s.as_delegate()) {
            if !delegate.is_bound() {
                diag!(
                    diags,
                    MissingDelegateResolution,
                    location.clone(),
                    "missing mapping information for delegate {}",
                    delegate.key
                );
            }
        }

        if config.generate_expression_variant && property.needs_helper() {
            diag!(
                diags,
                ExpressionOmission,
                location,
                "'{}' uses a method or resolver and is left at its default in the expression variant",
                property.destination.name
            );
        }
    }

    diags
}

/// Reject mappings that delegate to an invalid mapping, transitively.
/// Returns how many mappings were rejected.
pub fn reject_invalid_delegates(arena: &mut MappingArena) -> usize {
    let mut rejected = 0;

    loop {
        let mut found = Vec::new();
        for info in arena.iter().filter(|info| info.is_valid()) {
            for target in info.delegate_targets() {
                if target == info.id {
                    continue;
                }
                if let Some(invalid) = arena.get(target).filter(|t| !t.is_valid()) {
                    found.push((info.id, invalid.key.clone()));
                    break;
                }
            }
        }

        if found.is_empty() {
            break;
        }
        rejected += found.len();

        for (id, key) in found {
            let info = &mut arena[id];
            diag!(
                info.diagnostics,
                InvalidDelegate,
                Location::ty(info.key.destination.clone()),
                "delegate mapping {key} is invalid"
            );
        }
    }

    rejected
}
