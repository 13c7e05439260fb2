use crate::BuildError;
use mapforge_core::{
    model::{MappingArena, MappingId, MappingInformation, PropertyShape, Strategy},
    naming,
    params,
};
use mapforge_schema::{
    node::path_ident,
    prelude::{CollectionKind, MapKind, TypeKind, TypeRef},
};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::{BTreeMap, BTreeSet};

///
/// RoutineNames
///
/// Artifact base name per mapping, unique across the batch. The short form
/// uses type idents; mappings whose short forms clash fall back to full paths.
///

#[derive(Clone, Debug, Default)]
pub struct RoutineNames {
    bases: BTreeMap<MappingId, String>,
}

impl RoutineNames {
    #[must_use]
    pub fn new(arena: &MappingArena) -> Self {
        let short = |info: &MappingInformation| {
            format!(
                "{}_to_{}",
                naming::snake_ident(info.source()),
                naming::snake_ident(info.destination())
            )
        };

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for info in arena.iter() {
            *counts.entry(short(info)).or_default() += 1;
        }

        let mut taken = BTreeSet::new();
        let mut bases = BTreeMap::new();
        for info in arena.iter() {
            let mut base = short(info);
            if counts.get(&base).copied().unwrap_or_default() > 1 {
                base = format!(
                    "{}_to_{}",
                    naming::snake_path(info.source()),
                    naming::snake_path(info.destination())
                );
            }
            if !taken.insert(base.clone()) {
                base = format!("{base}_{}", info.id.0);
                taken.insert(base.clone());
            }
            bases.insert(info.id, base);
        }

        Self { bases }
    }

    pub fn base(&self, id: MappingId) -> Result<&str, BuildError> {
        self.bases
            .get(&id)
            .map(String::as_str)
            .ok_or(BuildError::UnknownMapping(id))
    }

    pub fn module(&self, id: MappingId) -> Result<Ident, BuildError> {
        Ok(format_ident!("{}", self.base(id)?))
    }

    pub fn routine(&self, id: MappingId) -> Result<Ident, BuildError> {
        Ok(format_ident!("map_{}", self.base(id)?))
    }

    pub fn many(&self, id: MappingId) -> Result<Ident, BuildError> {
        Ok(format_ident!("map_many_{}", self.base(id)?))
    }

    pub fn projection(&self, id: MappingId) -> Result<Ident, BuildError> {
        Ok(format_ident!("project_{}", self.base(id)?))
    }
}

/// Rust spelling of a schema type path; relative paths live under `crate`.
#[must_use]
pub fn rust_path(path: &str) -> String {
    let first = path.split("::").next().unwrap_or_default();
    if path.starts_with("::") || matches!(first, "crate" | "self" | "super") {
        path.to_string()
    } else {
        format!("crate::{path}")
    }
}

pub fn parse_path(path: &str) -> Result<syn::Path, BuildError> {
    syn::parse_str(path).map_err(|_| BuildError::InvalidPath(path.to_string()))
}

/// Parse a field or parameter name; keywords come back as raw identifiers.
pub fn parse_ident(name: &str) -> Result<Ident, BuildError> {
    syn::parse_str::<Ident>(name)
        .or_else(|_| syn::parse_str::<Ident>(&format!("r#{name}")))
        .map_err(|_| BuildError::InvalidIdent(name.to_string()))
}

///
/// TypeScope
///
/// Spells types for one artifact. Object paths whose idents are unique among
/// everything the artifact may reference are imported; the rest stay fully
/// qualified. Only paths actually spelled end up in the `use` list.
///

#[derive(Debug, Default)]
pub struct TypeScope {
    qualified: BTreeSet<String>,
    used: BTreeSet<String>,
}

impl TypeScope {
    #[must_use]
    pub fn new(arena: &MappingArena, root: MappingId) -> Self {
        let mut candidates = BTreeSet::new();
        for id in params::reachable(arena, root) {
            if let Some(info) = arena.get(id) {
                collect_paths(info, &mut candidates);
            }
        }

        let mut by_ident: BTreeMap<&str, usize> = BTreeMap::new();
        for path in &candidates {
            *by_ident.entry(path_ident(path)).or_default() += 1;
        }
        let qualified = by_ident
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(ident, _)| ident.to_string())
            .collect();

        Self {
            qualified,
            used: BTreeSet::new(),
        }
    }

    /// Tokens naming the type or function at `path`.
    pub fn path(&mut self, path: &str) -> Result<TokenStream, BuildError> {
        let full = rust_path(path);
        let ident = path_ident(&full);

        if self.qualified.contains(ident) || full.starts_with("::") {
            let path = parse_path(&full)?;
            return Ok(quote!(#path));
        }

        self.used.insert(full.clone());
        let ident = parse_ident(ident)?;

        Ok(quote!(#ident))
    }

    pub fn ty(&mut self, ty: &TypeRef) -> Result<TokenStream, BuildError> {
        let inner = match &ty.kind {
            TypeKind::Scalar { name, .. } => {
                let parsed: syn::Type =
                    syn::parse_str(name).map_err(|_| BuildError::InvalidType(name.clone()))?;
                quote!(#parsed)
            }
            TypeKind::Object { path } => self.path(path)?,
            TypeKind::Collection {
                collection,
                element,
            } => {
                let element = self.ty(element)?;
                match collection {
                    CollectionKind::Array => quote!(Box<[#element]>),
                    CollectionKind::List | CollectionKind::Sequence => quote!(Vec<#element>),
                }
            }
            TypeKind::Map { map, key, value } => {
                let key = self.ty(key)?;
                let value = self.ty(value)?;
                let map = map_type(*map);
                quote!(#map<#key, #value>)
            }
            TypeKind::Tuple { elements } => {
                let elements = elements
                    .iter()
                    .map(|e| self.ty(e))
                    .collect::<Result<Vec<_>, _>>()?;
                quote!((#(#elements,)*))
            }
        };

        if ty.nullable {
            Ok(quote!(Option<#inner>))
        } else {
            Ok(inner)
        }
    }

    /// Sorted `use` items for every imported path that was spelled.
    pub fn imports(&self) -> Result<TokenStream, BuildError> {
        let mut tokens = quote!();
        for path in &self.used {
            let path = parse_path(path)?;
            tokens.extend(quote!(use #path;));
        }

        Ok(tokens)
    }
}

#[must_use]
pub fn map_type(map: MapKind) -> TokenStream {
    match map {
        MapKind::BTree => quote!(::std::collections::BTreeMap),
        MapKind::Hash => quote!(::std::collections::HashMap),
    }
}

fn collect_paths(info: &MappingInformation, out: &mut BTreeSet<String>) {
    out.insert(rust_path(info.source()));
    out.insert(rust_path(info.destination()));

    for property in &info.properties {
        for hop in &property.source {
            type_paths(&hop.ty, out);
        }
        type_paths(&property.destination.ty, out);

        if let PropertyShape::Tuple { elements } = &property.shape {
            for element in elements {
                type_paths(&element.source, out);
            }
        }

        for strategy in property.strategies() {
            match strategy {
                Strategy::Method(call) => {
                    out.insert(rust_path(&call.owner));
                    type_paths(&call.subject, out);
                    type_paths(&call.returns, out);
                }
                Strategy::Resolver(call) => {
                    type_paths(&call.source, out);
                    type_paths(&call.destination, out);
                }
                Strategy::Delegate(_) => {}
            }
        }
    }

    for resolver in &info.resolvers {
        out.insert(rust_path(&resolver.path));
    }
    for parameter in &info.local_parameters {
        type_paths(&parameter.ty, out);
    }
}

fn type_paths(ty: &TypeRef, out: &mut BTreeSet<String>) {
    out.extend(ty.object_paths().into_iter().map(rust_path));
}
