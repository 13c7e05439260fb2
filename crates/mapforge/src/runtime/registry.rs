use crate::MappingError;
use std::{
    any::{Any, TypeId, type_name},
    collections::BTreeMap,
};

/// Signature every registered routine is stored under.
pub type Mapper<S, D> = fn(&S) -> Result<D, MappingError>;

///
/// MapperRegistry
///
/// Routines keyed by their (source, destination) runtime types, filled by
/// the generated `register_mappers`.
///

#[derive(Debug, Default)]
pub struct MapperRegistry {
    mappers: BTreeMap<(TypeId, TypeId), Box<dyn Any + Send + Sync>>,
}

impl MapperRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapper` for `S -> D`, replacing any earlier registration.
    pub fn register<S: 'static, D: 'static>(&mut self, mapper: Mapper<S, D>) {
        self.mappers.insert(key::<S, D>(), Box::new(mapper));
    }

    #[must_use]
    pub fn get<S: 'static, D: 'static>(&self) -> Option<Mapper<S, D>> {
        self.mappers
            .get(&key::<S, D>())
            .and_then(|mapper| mapper.downcast_ref::<Mapper<S, D>>())
            .copied()
    }

    #[must_use]
    pub fn contains<S: 'static, D: 'static>(&self) -> bool {
        self.mappers.contains_key(&key::<S, D>())
    }

    /// Map through the registered routine, or fail with `NotConfigured`.
    pub fn map<S: 'static, D: 'static>(&self, source: &S) -> Result<D, MappingError> {
        match self.get::<S, D>() {
            Some(mapper) => mapper(source),
            None => Err(MappingError::not_configured(type_name::<S>(), type_name::<D>())),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

fn key<S: 'static, D: 'static>() -> (TypeId, TypeId) {
    (TypeId::of::<S>(), TypeId::of::<D>())
}
