mod property;
mod strategy;

pub use property::*;
pub use strategy::*;

use crate::diagnostic::Diagnostics;
use derive_more::Display;
use mapforge_schema::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

///
/// MappingId
///
/// Stable index of a mapping inside its `MappingArena`. Delegates refer to
/// other mappings through ids, so cyclic graphs need no owning pointers.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("#{_0}")]
pub struct MappingId(pub usize);

///
/// MappingKey
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{source} -> {destination}")]
pub struct MappingKey {
    pub source: String,
    pub destination: String,
}

impl MappingKey {
    #[must_use]
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    #[must_use]
    pub fn is_self(&self) -> bool {
        self.source == self.destination
    }
}

///
/// EntryParameter
///
/// Extra parameter surfaced on a generated routine. `local` is the name the
/// requiring helper knows it by; `name` is the (possibly renamed) name in the
/// routine signature.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EntryParameter {
    pub name: String,
    pub local: String,
    pub ty: TypeRef,
}

impl EntryParameter {
    #[must_use]
    pub fn new(local: impl Into<String>, ty: TypeRef) -> Self {
        let local = local.into();

        Self {
            name: local.clone(),
            local,
            ty,
        }
    }

    /// Identity used for deduplication.
    #[must_use]
    pub fn key(&self) -> (&str, &TypeRef) {
        (&self.local, &self.ty)
    }
}

///
/// ResolverInstance
///
/// One resolver constructed at the top of a routine and shared by every
/// property that names the same resolver with the same constructor shape.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolverInstance {
    pub ident: String,
    pub path: String,

    /// Constructor arguments, each bound to the entry parameter `ident_param`.
    pub arguments: Vec<EntryParameter>,

    pub is_async: bool,
}

///
/// MappingInformation
///

#[derive(Clone, Debug, Serialize)]
pub struct MappingInformation {
    pub id: MappingId,
    pub key: MappingKey,

    /// Directive index of the declaration that produced this mapping.
    pub index: Option<u32>,

    /// Type carrying the `MapTo` / `MapFrom` declaration.
    pub declared_on: String,

    pub source_value_type: bool,
    pub max_recursion_depth: u32,

    pub properties: Vec<PropertyMapping>,
    pub resolvers: Vec<ResolverInstance>,

    /// Parameters required by this mapping's own helpers.
    pub local_parameters: Vec<EntryParameter>,

    /// Transitive parameter union, filled in after dependency resolution.
    pub entry_parameters: Vec<EntryParameter>,

    pub is_async: bool,

    pub leftover_destinations: Vec<String>,
    pub unclaimed_sources: Vec<String>,

    pub diagnostics: Diagnostics,
}

impl MappingInformation {
    #[must_use]
    pub fn new(id: MappingId, key: MappingKey, index: Option<u32>, declared_on: impl Into<String>) -> Self {
        Self {
            id,
            key,
            index,
            declared_on: declared_on.into(),
            source_value_type: false,
            max_recursion_depth: 0,
            properties: Vec::new(),
            resolvers: Vec::new(),
            local_parameters: Vec::new(),
            entry_parameters: Vec::new(),
            is_async: false,
            leftover_destinations: Vec::new(),
            unclaimed_sources: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.key.source
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.key.destination
    }

    /// Every delegate call, across properties and element slots.
    pub fn delegates(&self) -> impl Iterator<Item = &DelegateCall> {
        self.properties
            .iter()
            .flat_map(PropertyMapping::strategies)
            .filter_map(Strategy::as_delegate)
    }

    pub fn delegates_mut(&mut self) -> impl Iterator<Item = &mut DelegateCall> {
        self.properties
            .iter_mut()
            .flat_map(PropertyMapping::strategies_mut)
            .filter_map(|strategy| match strategy {
                Strategy::Delegate(call) => Some(call),
                _ => None,
            })
    }

    /// True when every delegate has its target bound.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.delegates().all(DelegateCall::is_bound)
    }

    /// Ids this mapping delegates to, in property order, deduplicated.
    #[must_use]
    pub fn delegate_targets(&self) -> Vec<MappingId> {
        let mut out = Vec::new();
        for target in self.delegates().filter_map(|d| d.target) {
            if !out.contains(&target) {
                out.push(target);
            }
        }

        out
    }

    /// Eligible for emission: no error-severity diagnostic.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Whether the routine can be called with nothing but a source value.
    #[must_use]
    pub fn is_parameterless(&self) -> bool {
        self.entry_parameters.is_empty()
    }
}

///
/// MappingArena
///
/// Owns every mapping of one generation pass. Ids are dense and assigned in
/// discovery order.
///

#[derive(Clone, Debug, Default)]
pub struct MappingArena {
    mappings: Vec<MappingInformation>,
    by_key: BTreeMap<MappingKey, MappingId>,
}

impl MappingArena {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mappings: Vec::new(),
            by_key: BTreeMap::new(),
        }
    }

    /// Reserve the next id for `key`; returns `None` if the key is taken.
    pub fn allocate(&mut self, key: MappingKey, index: Option<u32>, declared_on: &str) -> Option<MappingId> {
        if self.by_key.contains_key(&key) {
            return None;
        }

        let id = MappingId(self.mappings.len());
        self.by_key.insert(key.clone(), id);
        self.mappings
            .push(MappingInformation::new(id, key, index, declared_on));

        Some(id)
    }

    #[must_use]
    pub fn get(&self, id: MappingId) -> Option<&MappingInformation> {
        self.mappings.get(id.0)
    }

    pub fn get_mut(&mut self, id: MappingId) -> Option<&mut MappingInformation> {
        self.mappings.get_mut(id.0)
    }

    #[must_use]
    pub fn find(&self, key: &MappingKey) -> Option<MappingId> {
        self.by_key.get(key).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: &MappingKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MappingKey> {
        self.by_key.keys()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingInformation> {
        self.mappings.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MappingInformation> {
        self.mappings.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = MappingId> + use<> {
        (0..self.mappings.len()).map(MappingId)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl std::ops::Index<MappingId> for MappingArena {
    type Output = MappingInformation;

    fn index(&self, id: MappingId) -> &Self::Output {
        &self.mappings[id.0]
    }
}

impl std::ops::IndexMut<MappingId> for MappingArena {
    fn index_mut(&mut self, id: MappingId) -> &mut Self::Output {
        &mut self.mappings[id.0]
    }
}
