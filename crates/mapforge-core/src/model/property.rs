use crate::model::Strategy;
use derive_more::Display;
use mapforge_schema::{PROPERTY_PATH_SEPARATOR, prelude::*};
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// NullPolicy
///
/// What the generated code does when a nullable value turns out to be
/// absent at runtime.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum NullPolicy {
    /// Fall back to `Default::default()`.
    Default,

    /// Drop the element (collections and maps only).
    Filter,

    /// Fail with a runtime `MappingError`.
    Guard,

    /// Keep it absent; the destination is nullable too.
    Propagate,
}

///
/// PathHop
///
/// One link of a (possibly dotted) source read chain. `on_null` is set
/// exactly when the hop's type is nullable.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PathHop {
    pub name: String,
    pub ty: TypeRef,
    pub value_type: bool,
    pub on_null: Option<NullPolicy>,
}

impl PathHop {
    #[must_use]
    pub fn new(property: &PropertyDescriptor) -> Self {
        Self {
            name: property.name.clone(),
            ty: property.ty.clone(),
            value_type: property.value_type,
            on_null: None,
        }
    }

    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.ty.nullable
    }
}

///
/// PropertyEnd
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PropertyEnd {
    pub name: String,
    pub ty: TypeRef,
    pub value_type: bool,
}

impl PropertyEnd {
    #[must_use]
    pub fn new(property: &PropertyDescriptor) -> Self {
        Self {
            name: property.name.clone(),
            ty: property.ty.clone(),
            value_type: property.value_type,
        }
    }

    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.ty.nullable
    }
}

///
/// ElementMapping
///
/// One slot of a shaped property: the element of a collection, the key or
/// value of a map, or one tuple position.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ElementMapping {
    pub source: TypeRef,
    pub destination: TypeRef,
    pub value_type: bool,
    pub strategy: Option<Strategy>,
    pub on_null: Option<NullPolicy>,
}

impl ElementMapping {
    #[must_use]
    pub const fn new(source: TypeRef, destination: TypeRef, value_type: bool) -> Self {
        Self {
            source,
            destination,
            value_type,
            strategy: None,
            on_null: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Result<Self, StrategyConflict> {
        if let Some(existing) = &self.strategy {
            return Err(StrategyConflict::new(existing, &strategy));
        }
        self.strategy = Some(strategy);

        Ok(self)
    }

    #[must_use]
    pub const fn with_null_policy(mut self, on_null: Option<NullPolicy>) -> Self {
        self.on_null = on_null;
        self
    }
}

///
/// PropertyShape
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PropertyShape {
    Scalar,

    Collection {
        source: CollectionKind,
        destination: CollectionKind,
        element: Box<ElementMapping>,
    },

    Map {
        destination: MapKind,
        key: Box<ElementMapping>,
        value: Box<ElementMapping>,
    },

    Tuple {
        elements: Vec<ElementMapping>,
    },
}

impl PropertyShape {
    /// Slots carrying their own strategies, in emission order.
    #[must_use]
    pub fn elements(&self) -> Vec<&ElementMapping> {
        match self {
            Self::Scalar => Vec::new(),
            Self::Collection { element, .. } => vec![element.as_ref()],
            Self::Map { key, value, .. } => vec![key.as_ref(), value.as_ref()],
            Self::Tuple { elements } => elements.iter().collect(),
        }
    }

    pub fn elements_mut(&mut self) -> Vec<&mut ElementMapping> {
        match self {
            Self::Scalar => Vec::new(),
            Self::Collection { element, .. } => vec![element.as_mut()],
            Self::Map { key, value, .. } => vec![key.as_mut(), value.as_mut()],
            Self::Tuple { elements } => elements.iter_mut().collect(),
        }
    }

    /// Collections and maps absorb a null source into an empty container.
    #[must_use]
    pub const fn absorbs_null(&self) -> bool {
        matches!(self, Self::Collection { .. } | Self::Map { .. })
    }
}

///
/// PropertyMapping
///
/// Immutable record for one destination property. Built only through
/// `PropertyMappingBuilder`, which guarantees at most one strategy and
/// never a strategy next to a non-scalar shape.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PropertyMapping {
    pub source: Vec<PathHop>,
    pub destination: PropertyEnd,
    pub strategy: Option<Strategy>,
    pub shape: PropertyShape,
    pub ignore_null: bool,
    pub max_recursion_depth: Option<u32>,
}

impl PropertyMapping {
    /// Dotted source path, as written in diagnostics and runtime guards.
    #[must_use]
    pub fn source_path(&self) -> String {
        join_path(self.source.iter().map(|hop| hop.name.as_str()))
    }

    /// Dotted prefix of the source path ending at hop `index`.
    #[must_use]
    pub fn source_path_to(&self, index: usize) -> String {
        join_path(self.source.iter().take(index + 1).map(|hop| hop.name.as_str()))
    }

    /// Last hop of the read chain.
    #[must_use]
    pub fn terminal(&self) -> &PathHop {
        // builder rejects empty chains
        &self.source[self.source.len() - 1]
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.source.len() > 1
    }

    #[must_use]
    pub fn source_nullable(&self) -> bool {
        self.terminal().nullable()
    }

    #[must_use]
    pub const fn destination_nullable(&self) -> bool {
        self.destination.nullable()
    }

    /// Every strategy on this property, property-level first.
    #[must_use]
    pub fn strategies(&self) -> Vec<&Strategy> {
        self.strategy
            .iter()
            .chain(self.shape.elements().into_iter().filter_map(|e| e.strategy.as_ref()))
            .collect()
    }

    pub fn strategies_mut(&mut self) -> Vec<&mut Strategy> {
        let mut out: Vec<&mut Strategy> = self.strategy.iter_mut().collect();
        out.extend(
            self.shape
                .elements_mut()
                .into_iter()
                .filter_map(|e| e.strategy.as_mut()),
        );

        out
    }

    /// Whether any part of this property needs a method or resolver helper.
    #[must_use]
    pub fn needs_helper(&self) -> bool {
        self.strategies().into_iter().any(Strategy::needs_helper)
    }
}

fn join_path<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(&PROPERTY_PATH_SEPARATOR.to_string())
}

///
/// StrategyConflict
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot combine a {attempted} strategy with an existing {existing} strategy")]
pub struct StrategyConflict {
    pub existing: &'static str,
    pub attempted: &'static str,
}

impl StrategyConflict {
    #[must_use]
    pub const fn new(existing: &Strategy, attempted: &Strategy) -> Self {
        Self {
            existing: existing.kind(),
            attempted: attempted.kind(),
        }
    }

    const fn with_shape(attempted: &'static str) -> Self {
        Self {
            existing: "shape",
            attempted,
        }
    }
}

///
/// PropertyMappingBuilder
///

#[derive(Debug)]
pub struct PropertyMappingBuilder {
    source: Vec<PathHop>,
    destination: PropertyEnd,
    strategy: Option<Strategy>,
    shape: PropertyShape,
    ignore_null: bool,
    max_recursion_depth: Option<u32>,
}

impl PropertyMappingBuilder {
    /// Panics if `source` is empty; the matcher always yields at least one hop.
    #[must_use]
    pub fn new(source: Vec<PathHop>, destination: PropertyEnd) -> Self {
        assert!(!source.is_empty(), "property source path must not be empty");

        Self {
            source,
            destination,
            strategy: None,
            shape: PropertyShape::Scalar,
            ignore_null: false,
            max_recursion_depth: None,
        }
    }

    /// Attach the property-level strategy. A second strategy, or a strategy
    /// on a property that already has a collection/map/tuple shape, is rejected.
    pub fn strategy(mut self, strategy: Strategy) -> Result<Self, StrategyConflict> {
        if let Some(existing) = &self.strategy {
            return Err(StrategyConflict::new(existing, &strategy));
        }
        if self.shape != PropertyShape::Scalar {
            return Err(StrategyConflict::with_shape(strategy.kind()));
        }
        self.strategy = Some(strategy);

        Ok(self)
    }

    pub fn shape(mut self, shape: PropertyShape) -> Result<Self, StrategyConflict> {
        if let Some(existing) = &self.strategy {
            return Err(StrategyConflict {
                existing: existing.kind(),
                attempted: "shape",
            });
        }
        self.shape = shape;

        Ok(self)
    }

    #[must_use]
    pub const fn ignore_null(mut self, ignore_null: bool) -> Self {
        self.ignore_null = ignore_null;
        self
    }

    #[must_use]
    pub const fn max_recursion_depth(mut self, depth: Option<u32>) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Set the null policy of hop `index`; hops that are not nullable keep none.
    #[must_use]
    pub fn hop_policy(mut self, index: usize, policy: NullPolicy) -> Self {
        if let Some(hop) = self.source.get_mut(index)
            && hop.nullable()
        {
            hop.on_null = Some(policy);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> PropertyMapping {
        PropertyMapping {
            source: self.source,
            destination: self.destination,
            strategy: self.strategy,
            shape: self.shape,
            ignore_null: self.ignore_null,
            max_recursion_depth: self.max_recursion_depth,
        }
    }
}
