//! Pairs source properties with destination properties for one mapping.
//!
//! Matching is by (possibly renamed) name, exact and case-sensitive, over the
//! flattened inheritance chains of both types. Dotted `MapPath` chains claim
//! their target like an ordinary source property.

use crate::{
    diag,
    diagnostic::{Diagnostics, Location},
    directive::{self, PropertyDirectives, TypeDirectives},
    model::MappingKey,
};
use mapforge_schema::{PROPERTY_PATH_SEPARATOR, prelude::*};
use std::collections::{BTreeMap, BTreeSet};

///
/// PropertyMatch
///

#[derive(Clone, Debug)]
pub struct PropertyMatch<'a> {
    /// Read chain, root first. A plain property has a single hop.
    pub source: Vec<&'a PropertyDescriptor>,
    pub destination: &'a PropertyDescriptor,
    pub directives: PropertyDirectives,
}

///
/// MatchResult
///

#[derive(Clone, Debug, Default)]
pub struct MatchResult<'a> {
    pub pairs: Vec<PropertyMatch<'a>>,
    pub leftover_destinations: Vec<String>,
    pub unclaimed_sources: Vec<String>,
    pub ignored_sources: Vec<String>,
    pub type_directives: TypeDirectives,
}

struct Claim<'a> {
    source: Vec<&'a PropertyDescriptor>,
    directives: PropertyDirectives,
}

/// Match the properties of `key.source` against `key.destination`.
///
/// Problems that reject the mapping outright are pushed onto `diags`;
/// leftover and unclaimed names are returned for the validator to report.
pub fn match_properties<'a>(
    schema: &'a Schema,
    key: &MappingKey,
    index: Option<u32>,
    diags: &mut Diagnostics,
) -> MatchResult<'a> {
    let mut result = MatchResult::default();

    // type-level directives from both declarations
    let mut type_directives = TypeDirectives::default();
    for path in [&key.source, &key.destination] {
        if let Some(ty) = schema.get_type(path) {
            type_directives.merge(directive::resolve_type(ty, index, diags));
        }
    }

    let sources: Vec<_> = schema
        .flattened_properties(&key.source)
        .into_iter()
        .filter(|p| p.access.get)
        .collect();
    let destinations: Vec<_> = schema
        .flattened_properties(&key.destination)
        .into_iter()
        .filter(|p| p.access.set)
        .collect();

    // ignored destination names
    let mut ignored: BTreeSet<&str> = BTreeSet::new();
    for name in &type_directives.ignore_target_names {
        if destinations.iter().any(|p| &p.name == name) {
            ignored.insert(name);
        } else {
            diag!(
                diags,
                UnknownIgnoredTarget,
                Location::ty(&key.source),
                "ignored target '{name}' does not exist on '{}'",
                key.destination
            );
        }
    }
    let mut destination_directives = BTreeMap::new();
    for property in &destinations {
        let resolved = directive::resolve_property(property, &key.destination, index, diags);
        if resolved.ignore {
            ignored.insert(&property.name);
        }
        destination_directives.insert(property.name.as_str(), resolved);
    }

    // duplicate destination names
    let mut seen = BTreeSet::new();
    let mut duplicated = BTreeSet::new();
    for property in &destinations {
        if !seen.insert(property.name.as_str()) && duplicated.insert(property.name.as_str()) {
            diag!(
                diags,
                ConflictingTargetName,
                Location::property(&key.destination, &property.name),
                "more than one destination property is named '{}'",
                property.name
            );
        }
    }

    // claims keyed by destination name
    let mut claims: BTreeMap<&str, Vec<Claim<'a>>> = BTreeMap::new();

    let mut path_roots = BTreeSet::new();
    for path in &type_directives.paths {
        if ignored.contains(path.target.as_str()) {
            continue;
        }
        let Some(target) = destinations.iter().find(|p| p.name == path.target) else {
            diag!(
                diags,
                PropertyPathInvalid,
                Location::ty(&key.source),
                "path target '{}' does not exist on '{}'",
                path.target,
                key.destination
            );
            continue;
        };

        match resolve_path(schema, &key.source, &path.path) {
            Ok(hops) => {
                if let Some(root) = hops.first() {
                    path_roots.insert(root.name.as_str());
                }
                claims.entry(target.name.as_str()).or_default().push(Claim {
                    source: hops,
                    directives: PropertyDirectives::default(),
                });
            }
            Err(message) => {
                diag!(
                    diags,
                    PropertyPathInvalid,
                    Location::ty(&key.source),
                    "invalid source path '{}': {message}",
                    path.path
                );
            }
        }
    }

    for property in &sources {
        let resolved = directive::resolve_property(property, &key.source, index, diags);
        if resolved.ignore {
            result.ignored_sources.push(property.name.clone());
            continue;
        }

        let target = resolved.target_name(property).to_string();
        if ignored.contains(target.as_str()) {
            result.ignored_sources.push(property.name.clone());
            continue;
        }

        match destinations.iter().find(|p| p.name == target) {
            Some(destination) => {
                claims.entry(destination.name.as_str()).or_default().push(Claim {
                    source: vec![*property],
                    directives: resolved,
                });
            }
            None if path_roots.contains(property.name.as_str()) => {}
            None => result.unclaimed_sources.push(property.name.clone()),
        }
    }

    // resolve claims in destination order
    let mut emitted = BTreeSet::new();
    for &destination in &destinations {
        let name = destination.name.as_str();
        if ignored.contains(name) || duplicated.contains(name) || !emitted.insert(name) {
            continue;
        }

        let mut claimers = claims.remove(name).unwrap_or_default();
        match claimers.len() {
            0 => result.leftover_destinations.push(destination.name.clone()),
            1 => {
                let claim = claimers.remove(0);
                let mut directives = claim.directives;
                if destination_directives
                    .get(name)
                    .is_some_and(|d: &PropertyDirectives| d.ignore_null)
                {
                    directives.ignore_null = true;
                }

                result.pairs.push(PropertyMatch {
                    source: claim.source,
                    destination,
                    directives,
                });
            }
            _ => {
                let names = claimers
                    .iter()
                    .map(|c| join_names(&c.source))
                    .collect::<Vec<_>>()
                    .join(", ");
                diag!(
                    diags,
                    ConflictingTargetName,
                    Location::property(&key.destination, name),
                    "destination property '{name}' is claimed by more than one source ({names})"
                );
            }
        }
    }

    result.type_directives = type_directives;
    result
}

/// Walk a dotted property path starting at type `root`.
pub fn resolve_path<'a>(
    schema: &'a Schema,
    root: &str,
    path: &str,
) -> Result<Vec<&'a PropertyDescriptor>, String> {
    let mut hops = Vec::new();
    let mut current = root.to_string();

    for (i, segment) in path.split(PROPERTY_PATH_SEPARATOR).enumerate() {
        if i > 0 {
            let previous: &PropertyDescriptor = hops[i - 1];
            let Some(next) = previous.ty.object_path() else {
                return Err(format!("'{}' is not an object", previous.name));
            };
            current = next.to_string();
        }
        if schema.get_type(&current).is_none() {
            return Err(format!("type '{current}' is not in the schema"));
        }

        let hop = schema
            .flattened_properties(&current)
            .into_iter()
            .find(|p| p.name == segment && p.access.get)
            .ok_or_else(|| format!("'{current}' has no readable property '{segment}'"))?;
        hops.push(hop);
    }

    Ok(hops)
}

fn join_names(hops: &[&PropertyDescriptor]) -> String {
    hops.iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(&PROPERTY_PATH_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;

    fn string(name: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(name, TypeRef::scalar("String"))
    }

    fn key() -> MappingKey {
        MappingKey::new("model::Person", "dto::PersonDto")
    }

    fn schema(source: TypeDescriptor, destination: TypeDescriptor) -> Schema {
        Schema::new().with_type(source).with_type(destination)
    }

    #[test]
    fn matches_by_exact_name() {
        let schema = schema(
            TypeDescriptor::new("model::Person").with_property(string("name")),
            TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
        );
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].destination.name, "name");
        assert!(result.leftover_destinations.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let schema = schema(
            TypeDescriptor::new("model::Person").with_property(string("Name")),
            TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
        );
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert!(result.pairs.is_empty());
        assert_eq!(result.leftover_destinations, vec!["name".to_string()]);
        assert_eq!(result.unclaimed_sources, vec!["Name".to_string()]);
    }

    #[test]
    fn rename_claims_a_different_destination() {
        let schema = schema(
            TypeDescriptor::new("model::Person").with_property(
                string("full_name").with_directive(Directive::RenameTo { name: "name".into() }),
            ),
            TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
        );
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].source[0].name, "full_name");
    }

    #[test]
    fn two_claimers_conflict() {
        let schema = schema(
            TypeDescriptor::new("model::Person")
                .with_property(string("name"))
                .with_property(
                    string("nick").with_directive(Directive::RenameTo { name: "name".into() }),
                ),
            TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
        );
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert!(result.pairs.is_empty());
        assert!(diags.has_code(DiagnosticCode::ConflictingTargetName));
    }

    #[test]
    fn unknown_ignored_target_is_reported() {
        let schema = schema(
            TypeDescriptor::new("model::Person")
                .with_property(string("name"))
                .with_directive(Directive::IgnoreTargetNames {
                    names: vec!["missing".into()],
                }),
            TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
        );
        let mut diags = Diagnostics::new();

        match_properties(&schema, &key(), None, &mut diags);

        assert!(diags.has_code(DiagnosticCode::UnknownIgnoredTarget));
    }

    #[test]
    fn ignored_target_silences_leftover_and_source() {
        let schema = schema(
            TypeDescriptor::new("model::Person")
                .with_property(string("name"))
                .with_property(string("id"))
                .with_directive(Directive::IgnoreTargetNames {
                    names: vec!["id".into()],
                }),
            TypeDescriptor::new("dto::PersonDto")
                .with_property(string("name"))
                .with_property(string("id")),
        );
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert_eq!(result.pairs.len(), 1);
        assert!(result.leftover_destinations.is_empty());
        assert!(result.unclaimed_sources.is_empty());
        assert_eq!(result.ignored_sources, vec!["id".to_string()]);
    }

    #[test]
    fn base_properties_participate_and_derived_shadows_base() {
        let schema = Schema::new()
            .with_type(
                TypeDescriptor::new("model::Entity")
                    .with_property(PropertyDescriptor::new("id", TypeRef::value("u64")))
                    .with_property(string("name")),
            )
            .with_type(
                TypeDescriptor::new("model::Person")
                    .with_base("model::Entity")
                    .with_property(string("name").with_directive(Directive::Ignore)),
            )
            .with_type(
                TypeDescriptor::new("dto::PersonDto")
                    .with_property(PropertyDescriptor::new("id", TypeRef::value("u64")))
                    .with_property(
                        string("name").with_directive(Directive::Ignore),
                    ),
            );
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].destination.name, "id");
        assert_eq!(result.ignored_sources, vec!["name".to_string()]);
        assert!(diags.is_empty());
    }

    #[test]
    fn map_path_claims_target_and_consumes_root() {
        let schema = Schema::new()
            .with_type(TypeDescriptor::new("model::Address").with_property(string("city")))
            .with_type(
                TypeDescriptor::new("model::Person")
                    .with_property(PropertyDescriptor::new(
                        "address",
                        TypeRef::object("model::Address").nullable(),
                    ))
                    .with_directive(Directive::MapPath {
                        path: "address.city".into(),
                        target: "city".into(),
                    }),
            )
            .with_type(TypeDescriptor::new("dto::PersonDto").with_property(string("city")));
        let mut diags = Diagnostics::new();

        let result = match_properties(&schema, &key(), None, &mut diags);

        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].source.len(), 2);
        assert!(result.unclaimed_sources.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn invalid_path_is_reported() {
        let schema = Schema::new()
            .with_type(
                TypeDescriptor::new("model::Person")
                    .with_property(string("name"))
                    .with_directive(Directive::MapPath {
                        path: "name.length".into(),
                        target: "name".into(),
                    }),
            )
            .with_type(TypeDescriptor::new("dto::PersonDto").with_property(string("name")));
        let mut diags = Diagnostics::new();

        match_properties(&schema, &key(), None, &mut diags);

        assert!(diags.has_code(DiagnosticCode::PropertyPathInvalid));
    }
}
