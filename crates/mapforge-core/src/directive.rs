//! Normalizes the directives attached to a property or type into the
//! effective settings for one mapping declaration.
//!
//! Entries without an index apply to every mapping declared by the owning
//! type; an indexed entry applies only to its mapping and overrides the
//! unindexed entry of the same kind.

use crate::{
    diag,
    diagnostic::{Diagnostics, Location},
};
use mapforge_schema::prelude::*;
use std::collections::BTreeSet;

///
/// StrategyDirective
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StrategyDirective {
    Mapper { source: String, destination: String },
    Method(String),
    Resolver(String),
}

impl StrategyDirective {
    fn from_directive(directive: &Directive) -> Option<Self> {
        match directive {
            Directive::UseMapper {
                source,
                destination,
            } => Some(Self::Mapper {
                source: source.clone(),
                destination: destination.clone(),
            }),
            Directive::UseMethod { name } => Some(Self::Method(name.clone())),
            Directive::UseResolver { resolver } => Some(Self::Resolver(resolver.clone())),
            _ => None,
        }
    }
}

///
/// PropertyDirectives
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PropertyDirectives {
    pub ignore: bool,
    pub rename: Option<String>,
    pub strategy: Option<StrategyDirective>,
    pub complete_collection: bool,
    pub ignore_null: bool,
    pub max_recursion_depth: Option<u32>,
}

impl PropertyDirectives {
    /// Name used to claim a destination property.
    #[must_use]
    pub fn target_name<'a>(&'a self, property: &'a PropertyDescriptor) -> &'a str {
        self.rename.as_deref().unwrap_or(&property.name)
    }
}

///
/// PathDirective
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathDirective {
    pub path: String,
    pub target: String,
}

///
/// TypeDirectives
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeDirectives {
    pub ignore_target_names: BTreeSet<String>,
    pub paths: Vec<PathDirective>,
    pub max_recursion_depth: Option<u32>,
}

impl TypeDirectives {
    /// Combine directives read from the source and destination declarations.
    pub fn merge(&mut self, other: Self) {
        self.ignore_target_names.extend(other.ignore_target_names);
        for path in other.paths {
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
        if self.max_recursion_depth.is_none() {
            self.max_recursion_depth = other.max_recursion_depth;
        }
    }
}

// Applicable entries, unindexed first so that indexed ones win.
fn applicable(entries: &[DirectiveEntry], index: Option<u32>) -> Vec<&DirectiveEntry> {
    let mut out: Vec<_> = entries.iter().filter(|e| e.applies_to(index)).collect();
    out.sort_by_key(|e| e.index.is_some());

    out
}

/// Resolve the directives of `property` (declared on `owner`) for the
/// mapping declared with `index`.
pub fn resolve_property(
    property: &PropertyDescriptor,
    owner: &str,
    index: Option<u32>,
    diags: &mut Diagnostics,
) -> PropertyDirectives {
    let location = || Location::property(owner, &property.name);
    let mut out = PropertyDirectives::default();

    // (value, indexed) of the last rename and strategy seen
    let mut rename: Option<(String, bool)> = None;
    let mut strategy: Option<(StrategyDirective, bool)> = None;

    for entry in applicable(&property.directives, index) {
        let indexed = entry.index.is_some();

        match &entry.directive {
            d if d.is_type_level() => {
                diag!(
                    diags,
                    MisplacedDirective,
                    location(),
                    "type-level directive '{}' on a property is ignored",
                    d.name()
                );
            }
            Directive::Ignore => out.ignore = true,
            Directive::IgnoreNullIncompatibility => out.ignore_null = true,
            Directive::MapCompleteCollection => out.complete_collection = true,
            Directive::MaxRecursionDepth { depth } => out.max_recursion_depth = Some(*depth),
            Directive::RenameTo { name } => match &rename {
                Some((existing, was_indexed)) if *was_indexed == indexed && existing != name => {
                    diag!(
                        diags,
                        ConflictingDirective,
                        location(),
                        "property is renamed to both '{existing}' and '{name}'"
                    );
                }
                _ => rename = Some((name.clone(), indexed)),
            },
            d => {
                let Some(next) = StrategyDirective::from_directive(d) else {
                    continue;
                };
                match &strategy {
                    Some((existing, was_indexed)) if *was_indexed == indexed && *existing != next => {
                        diag!(
                            diags,
                            ConflictingStrategy,
                            location(),
                            "property declares more than one conversion strategy ('{}' conflicts)",
                            d.name()
                        );
                    }
                    _ => strategy = Some((next, indexed)),
                }
            }
        }
    }

    // ignore wins over everything else
    if !out.ignore {
        out.rename = rename.map(|(name, _)| name);
        out.strategy = strategy.map(|(strategy, _)| strategy);
    }

    out
}

/// Resolve the type-level directives of `ty` for the mapping declared with `index`.
pub fn resolve_type(ty: &TypeDescriptor, index: Option<u32>, diags: &mut Diagnostics) -> TypeDirectives {
    let mut out = TypeDirectives::default();

    for entry in applicable(&ty.directives, index) {
        match &entry.directive {
            Directive::IgnoreTargetNames { names } => {
                out.ignore_target_names.extend(names.iter().cloned());
            }
            Directive::MapPath { path, target } => {
                let path = PathDirective {
                    path: path.clone(),
                    target: target.clone(),
                };
                if !out.paths.contains(&path) {
                    out.paths.push(path);
                }
            }
            Directive::MaxRecursionDepth { depth } => out.max_recursion_depth = Some(*depth),

            // consumed by discovery
            Directive::MapFrom { .. } | Directive::MapTo { .. } => {}

            d => {
                diag!(
                    diags,
                    MisplacedDirective,
                    Location::ty(&ty.path),
                    "property-level directive '{}' on a type is ignored",
                    d.name()
                );
            }
        }
    }

    out
}
