use crate::{
    construct::{self, BuildContext},
    diag,
    diagnostic::{Diagnostics, Location},
    model::{MappingArena, MappingInformation, MappingKey},
    params,
    resolve::{self, FixpointReport},
    validate,
};
use mapforge_config_build::MapperConfig;
use mapforge_schema::prelude::*;
use std::collections::BTreeSet;

///
/// Candidate
///
/// One `MapTo` / `MapFrom` declaration found during discovery.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    pub key: MappingKey,
    pub index: Option<u32>,
    pub declared_on: String,
}

///
/// Batch
///
/// One generation pass: discovery, construction, dependency resolution and
/// validation over every mapping declared in a schema.
///

#[derive(Clone, Debug)]
pub struct Batch {
    arena: MappingArena,
    diagnostics: Diagnostics,
    report: FixpointReport,
}

impl Batch {
    /// Run every engine phase over `schema`.
    #[must_use]
    pub fn discover(schema: &Schema, config: &MapperConfig) -> Self {
        let _span = tracing::debug_span!("mapforge_batch").entered();

        let mut diagnostics = Diagnostics::new();
        let mut arena = MappingArena::new();

        // discovery
        for candidate in discover_candidates(schema, &mut diagnostics) {
            if arena
                .allocate(candidate.key.clone(), candidate.index, &candidate.declared_on)
                .is_none()
            {
                diag!(
                    diagnostics,
                    DuplicateMapping,
                    Location::ty(&candidate.declared_on),
                    "mapping {} is declared more than once",
                    candidate.key
                );
            }
        }
        tracing::debug!(mappings = arena.len(), "discovered mappings");

        // construction, isolated per mapping
        let declared: BTreeSet<MappingKey> = arena.keys().cloned().collect();
        let ctx = BuildContext {
            schema,
            config,
            declared: &declared,
        };
        for info in arena.iter_mut() {
            if let Err(err) = construct::build_mapping(&ctx, info) {
                tracing::warn!(mapping = %info.key, error = %err, "mapping construction failed");
                diag!(
                    info.diagnostics,
                    InternalError,
                    Location::ty(info.key.source.clone()),
                    "internal error while building {}: {err}",
                    info.key
                );
            }
        }

        // dependency resolution
        let report = resolve::resolve_dependencies(&mut arena);

        // entry parameters
        for id in arena.ids() {
            let mut diags = Diagnostics::new();
            let parameters = params::entry_parameters(&arena, id, &mut diags);
            let info = &mut arena[id];
            info.entry_parameters = parameters;
            info.diagnostics.extend(diags);
        }

        // validation
        for id in arena.ids() {
            let diags = validate::validate_mapping(&arena, id, config);
            arena[id].diagnostics.extend(diags);
        }
        let rejected = validate::reject_invalid_delegates(&mut arena);

        let batch = Self {
            arena,
            diagnostics,
            report,
        };
        tracing::debug!(
            valid = batch.valid_mappings().count(),
            rejected_by_delegate = rejected,
            "validation finished"
        );

        batch
    }

    #[must_use]
    pub const fn arena(&self) -> &MappingArena {
        &self.arena
    }

    /// Diagnostics not owned by any single mapping.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub const fn report(&self) -> FixpointReport {
        self.report
    }

    #[must_use]
    pub fn mapping(&self, source: &str, destination: &str) -> Option<&MappingInformation> {
        self.arena
            .find(&MappingKey::new(source, destination))
            .and_then(|id| self.arena.get(id))
    }

    /// Mappings eligible for emission, in discovery order.
    pub fn valid_mappings(&self) -> impl Iterator<Item = &MappingInformation> {
        self.arena.iter().filter(|info| info.is_valid())
    }

    /// Batch diagnostics followed by every mapping's, in discovery order.
    #[must_use]
    pub fn all_diagnostics(&self) -> Diagnostics {
        let mut out = self.diagnostics.clone();
        for info in self.arena.iter() {
            out.extend(info.diagnostics.iter().cloned());
        }

        out
    }
}

/// Every mapping declared in `schema`, in schema order.
///
/// Declarations naming a type missing from the schema are reported and skipped.
pub fn discover_candidates(schema: &Schema, diags: &mut Diagnostics) -> Vec<Candidate> {
    let mut out = Vec::new();

    for ty in schema.types() {
        for entry in &ty.directives {
            let key = match &entry.directive {
                Directive::MapTo { destination } => MappingKey::new(&ty.path, destination),
                Directive::MapFrom { source } => MappingKey::new(source, &ty.path),
                _ => continue,
            };

            let missing: Vec<&str> = [key.source.as_str(), key.destination.as_str()]
                .into_iter()
                .filter(|path| schema.get_type(path).is_none())
                .collect();
            if !missing.is_empty() {
                diag!(
                    diags,
                    UnresolvedDirectiveType,
                    Location::ty(&ty.path),
                    "'{}' declares mapping {key} but '{}' is not in the schema",
                    entry.directive.name(),
                    missing.join("', '")
                );
                continue;
            }

            out.push(Candidate {
                key,
                index: entry.index,
                declared_on: ty.path.clone(),
            });
        }
    }

    out
}
