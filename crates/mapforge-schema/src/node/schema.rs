use crate::{Error, prelude::*};
use std::collections::{BTreeMap, BTreeSet};

///
/// Schema
///
/// In-memory snapshot of every type known to one generation pass. Maps are
/// ordered so that every walk over the schema is deterministic.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "SchemaSnapshot", into = "SchemaSnapshot")]
pub struct Schema {
    types: BTreeMap<String, TypeDescriptor>,
    resolvers: BTreeMap<String, ResolverDescriptor>,
}

impl Schema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            types: BTreeMap::new(),
            resolvers: BTreeMap::new(),
        }
    }

    /// Decode a JSON snapshot produced by the type-analysis pass.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Insert (or replace) a type, keyed by its path.
    pub fn insert_type(&mut self, ty: TypeDescriptor) {
        self.types.insert(ty.path.clone(), ty);
    }

    /// Insert (or replace) a resolver, keyed by its path.
    pub fn insert_resolver(&mut self, resolver: ResolverDescriptor) {
        self.resolvers.insert(resolver.path.clone(), resolver);
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.insert_type(ty);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: ResolverDescriptor) -> Self {
        self.insert_resolver(resolver);
        self
    }

    #[must_use]
    pub fn get_type(&self, path: &str) -> Option<&TypeDescriptor> {
        self.types.get(path)
    }

    #[must_use]
    pub fn get_resolver(&self, path: &str) -> Option<&ResolverDescriptor> {
        self.resolvers.get(path)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn resolvers(&self) -> impl Iterator<Item = &ResolverDescriptor> {
        self.resolvers.values()
    }

    /// Walk `path` and its base types, most-derived first.
    ///
    /// Unknown bases end the walk; cycles are cut at the first repeat so the
    /// walk always terminates. Both are reported by `validate_schema`.
    #[must_use]
    pub fn inheritance_chain(&self, path: &str) -> Vec<&TypeDescriptor> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = self.get_type(path);

        while let Some(ty) = current {
            if !seen.insert(ty.path.as_str()) {
                break;
            }
            chain.push(ty);
            current = ty.base.as_deref().and_then(|base| self.get_type(base));
        }

        chain
    }

    /// Properties of `path` across its inheritance chain, most-derived first.
    /// A base declaration shadowed by a derived one of the same name is dropped.
    #[must_use]
    pub fn flattened_properties(&self, path: &str) -> Vec<&PropertyDescriptor> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();

        for ty in self.inheritance_chain(path) {
            let mut local = BTreeSet::new();
            for property in &ty.properties {
                if seen.contains(property.name.as_str()) {
                    continue;
                }
                local.insert(property.name.as_str());
                out.push(property);
            }
            seen.extend(local);
        }

        out
    }

    /// Method overloads visible on `path`, most-derived declarations first.
    #[must_use]
    pub fn methods_named<'a>(&'a self, path: &str, name: &'a str) -> Vec<(&'a TypeDescriptor, &'a MethodDescriptor)> {
        self.inheritance_chain(path)
            .into_iter()
            .flat_map(|ty| ty.methods_named(name).map(move |m| (ty, m)))
            .collect()
    }

    /// Value semantics of an arbitrary type reference.
    #[must_use]
    pub fn is_value_type(&self, ty: &TypeRef) -> bool {
        match &ty.kind {
            TypeKind::Scalar { value_type, .. } => *value_type,
            TypeKind::Object { path } => self.get_type(path).is_some_and(|t| t.value_type),
            TypeKind::Collection { .. } | TypeKind::Map { .. } => false,
            TypeKind::Tuple { elements } => elements.iter().all(|e| self.is_value_type(e)),
        }
    }
}

///
/// SchemaSnapshot
///
/// Wire form of a schema: plain lists, keyed on load.
///

#[derive(Deserialize, Serialize)]
struct SchemaSnapshot {
    #[serde(default)]
    types: Vec<TypeDescriptor>,

    #[serde(default)]
    resolvers: Vec<ResolverDescriptor>,
}

impl From<SchemaSnapshot> for Schema {
    fn from(snapshot: SchemaSnapshot) -> Self {
        let mut schema = Self::new();
        for ty in snapshot.types {
            schema.insert_type(ty);
        }
        for resolver in snapshot.resolvers {
            schema.insert_resolver(resolver);
        }

        schema
    }
}

impl From<Schema> for SchemaSnapshot {
    fn from(schema: Schema) -> Self {
        Self {
            types: schema.types.into_values().collect(),
            resolvers: schema.resolvers.into_values().collect(),
        }
    }
}
