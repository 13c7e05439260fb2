use crate::prelude::*;
use derive_more::{Display, FromStr};
use std::fmt;

///
/// CollectionKind
///
/// Container shape of a sequence-like property. `Sequence` leaves the
/// concrete container to the destination slot; `List` and `Array` name it.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[remain::sorted]
pub enum CollectionKind {
    Array,
    List,
    #[default]
    Sequence,
}

///
/// MapKind
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum MapKind {
    BTree,
    #[default]
    Hash,
}

///
/// TypeKind
///
/// Semantic shape of a property type as reported by the type-analysis pass.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    /// Opaque leaf type, named by its Rust spelling (`String`, `u32`, ...).
    Scalar {
        name: String,
        #[serde(default)]
        value_type: bool,
    },

    /// User-declared object type registered in the schema (or external).
    Object { path: String },

    Collection {
        #[serde(default)]
        collection: CollectionKind,
        element: Box<TypeRef>,
    },

    Map {
        #[serde(default)]
        map: MapKind,
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },

    Tuple { elements: Vec<TypeRef> },
}

///
/// TypeRef
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TypeRef {
    #[serde(flatten)]
    pub kind: TypeKind,

    #[serde(default)]
    pub nullable: bool,
}

impl TypeRef {
    #[must_use]
    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// Reference-semantics scalar (cloned when copied).
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Scalar {
            name: name.into(),
            value_type: false,
        })
    }

    /// Value-semantics scalar (copied bitwise).
    #[must_use]
    pub fn value(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Scalar {
            name: name.into(),
            value_type: true,
        })
    }

    #[must_use]
    pub fn object(path: impl Into<String>) -> Self {
        Self::new(TypeKind::Object { path: path.into() })
    }

    #[must_use]
    pub fn collection(collection: CollectionKind, element: Self) -> Self {
        Self::new(TypeKind::Collection {
            collection,
            element: Box::new(element),
        })
    }

    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::collection(CollectionKind::List, element)
    }

    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::collection(CollectionKind::Array, element)
    }

    #[must_use]
    pub fn sequence(element: Self) -> Self {
        Self::collection(CollectionKind::Sequence, element)
    }

    #[must_use]
    pub fn map(map: MapKind, key: Self, value: Self) -> Self {
        Self::new(TypeKind::Map {
            map,
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    #[must_use]
    pub const fn tuple(elements: Vec<Self>) -> Self {
        Self::new(TypeKind::Tuple { elements })
    }

    /// Mark this reference nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Copy of this reference with nullability stripped.
    #[must_use]
    pub fn non_null(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            nullable: false,
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection { .. })
    }

    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self.kind, TypeKind::Map { .. })
    }

    #[must_use]
    pub fn object_path(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Object { path } => Some(path),
            _ => None,
        }
    }

    /// Every object path referenced at any depth, outermost first.
    #[must_use]
    pub fn object_paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_object_paths(&mut out);

        out
    }

    fn collect_object_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            TypeKind::Scalar { .. } => {}
            TypeKind::Object { path } => out.push(path),
            TypeKind::Collection { element, .. } => element.collect_object_paths(out),
            TypeKind::Map { key, value, .. } => {
                key.collect_object_paths(out);
                value.collect_object_paths(out);
            }
            TypeKind::Tuple { elements } => {
                for element in elements {
                    element.collect_object_paths(out);
                }
            }
        }
    }

    /// Structural equality that ignores nullability at every level.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (TypeKind::Scalar { name: a, .. }, TypeKind::Scalar { name: b, .. }) => a == b,
            (TypeKind::Object { path: a }, TypeKind::Object { path: b }) => a == b,
            (
                TypeKind::Collection {
                    collection: ca,
                    element: ea,
                },
                TypeKind::Collection {
                    collection: cb,
                    element: eb,
                },
            ) => ca == cb && ea.same_shape(eb),
            (
                TypeKind::Map {
                    map: ma,
                    key: ka,
                    value: va,
                },
                TypeKind::Map {
                    map: mb,
                    key: kb,
                    value: vb,
                },
            ) => ma == mb && ka.same_shape(kb) && va.same_shape(vb),
            (TypeKind::Tuple { elements: a }, TypeKind::Tuple { elements: b }) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_shape(b))
            }
            _ => false,
        }
    }

    /// Strict equality: same shape and the same nullability everywhere.
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Scalar { name, .. } => write!(f, "{name}")?,
            TypeKind::Object { path } => write!(f, "{path}")?,
            TypeKind::Collection {
                collection,
                element,
            } => write!(f, "{collection}<{element}>")?,
            TypeKind::Map { map, key, value } => write!(f, "{map}Map<{key}, {value}>")?,
            TypeKind::Tuple { elements } => {
                let inner = elements
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({inner})")?;
            }
        }

        if self.nullable {
            write!(f, "?")?;
        }

        Ok(())
    }
}
