use crate::prelude::*;

///
/// Directive
///
/// Declarative instruction attached to a type or a property. Property-level
/// and type-level directives share one closed enumeration; placement is
/// checked when directives are resolved for a mapping.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
#[remain::sorted]
pub enum Directive {
    /// Remove the property from matching, in source or destination position.
    Ignore,

    /// Accept a nullable source for a non-nullable destination slot.
    IgnoreNullIncompatibility,

    /// Type-level: destination properties that must not be mapped.
    IgnoreTargetNames { names: Vec<String> },

    /// Hand the whole collection to the method or resolver instead of each element.
    MapCompleteCollection,

    /// Type-level, on a destination type: declares `source -> Self`.
    MapFrom { source: String },

    /// Type-level: fill `target` from a dotted chain of source properties.
    MapPath { path: String, target: String },

    /// Type-level, on a source type: declares `Self -> destination`.
    MapTo { destination: String },

    /// Inline depth bound used when recursive mappings are unrolled.
    MaxRecursionDepth { depth: u32 },

    /// Match this source property against a differently named destination property.
    RenameTo { name: String },

    /// Delegate to the mapping declared for `source -> destination`.
    UseMapper { source: String, destination: String },

    /// Convert through an associated function of the owning type.
    UseMethod { name: String },

    /// Convert through an external resolver type.
    UseResolver { resolver: String },
}

impl Directive {
    /// Directives that only make sense on a type declaration.
    #[must_use]
    pub const fn is_type_level(&self) -> bool {
        matches!(
            self,
            Self::IgnoreTargetNames { .. }
                | Self::MapFrom { .. }
                | Self::MapPath { .. }
                | Self::MapTo { .. }
        )
    }

    /// Directives that only make sense on a property.
    #[must_use]
    pub const fn is_property_level(&self) -> bool {
        matches!(
            self,
            Self::Ignore
                | Self::IgnoreNullIncompatibility
                | Self::MapCompleteCollection
                | Self::RenameTo { .. }
                | Self::UseMapper { .. }
                | Self::UseMethod { .. }
                | Self::UseResolver { .. }
        )
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::IgnoreNullIncompatibility => "ignore_null_incompatibility",
            Self::IgnoreTargetNames { .. } => "ignore_target_names",
            Self::MapCompleteCollection => "map_complete_collection",
            Self::MapFrom { .. } => "map_from",
            Self::MapPath { .. } => "map_path",
            Self::MapTo { .. } => "map_to",
            Self::MaxRecursionDepth { .. } => "max_recursion_depth",
            Self::RenameTo { .. } => "rename_to",
            Self::UseMapper { .. } => "use_mapper",
            Self::UseMethod { .. } => "use_method",
            Self::UseResolver { .. } => "use_resolver",
        }
    }
}

///
/// DirectiveEntry
///
/// A directive plus the optional mapping index it is scoped to. Entries with
/// no index apply to every mapping declared by the owning type.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DirectiveEntry {
    #[serde(flatten)]
    pub directive: Directive,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl DirectiveEntry {
    #[must_use]
    pub const fn new(directive: Directive) -> Self {
        Self {
            directive,
            index: None,
        }
    }

    #[must_use]
    pub const fn indexed(directive: Directive, index: u32) -> Self {
        Self {
            directive,
            index: Some(index),
        }
    }

    /// Whether this entry applies to the mapping declared with `index`.
    #[must_use]
    pub fn applies_to(&self, index: Option<u32>) -> bool {
        self.index.is_none() || self.index == index
    }
}

impl From<Directive> for DirectiveEntry {
    fn from(directive: Directive) -> Self {
        Self::new(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unindexed_entries_apply_everywhere() {
        let entry = DirectiveEntry::new(Directive::Ignore);

        assert!(entry.applies_to(None));
        assert!(entry.applies_to(Some(2)));
    }

    #[test]
    fn indexed_entries_apply_to_their_mapping_only() {
        let entry = DirectiveEntry::indexed(Directive::Ignore, 1);

        assert!(entry.applies_to(Some(1)));
        assert!(!entry.applies_to(Some(2)));
        assert!(!entry.applies_to(None));
    }

    #[test]
    fn placement_classes_do_not_overlap() {
        let all = [
            Directive::Ignore,
            Directive::IgnoreNullIncompatibility,
            Directive::IgnoreTargetNames { names: vec![] },
            Directive::MapCompleteCollection,
            Directive::MapFrom {
                source: "a::A".into(),
            },
            Directive::MapPath {
                path: "a.b".into(),
                target: "b".into(),
            },
            Directive::MapTo {
                destination: "a::B".into(),
            },
            Directive::RenameTo { name: "x".into() },
            Directive::UseMapper {
                source: "a::A".into(),
                destination: "a::B".into(),
            },
            Directive::UseMethod { name: "f".into() },
            Directive::UseResolver {
                resolver: "a::R".into(),
            },
        ];

        for directive in all {
            assert!(
                directive.is_type_level() != directive.is_property_level(),
                "{} must belong to exactly one placement class",
                directive.name()
            );
        }
    }

    #[test]
    fn decodes_indexed_entry() {
        let entry: DirectiveEntry =
            serde_json::from_str(r#"{ "directive": "rename_to", "name": "full_name", "index": 1 }"#)
                .expect("entry should decode");

        assert_eq!(
            entry,
            DirectiveEntry::indexed(
                Directive::RenameTo {
                    name: "full_name".into()
                },
                1
            )
        );
    }
}
