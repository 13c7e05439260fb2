mod common;

use common::{artifact, generate, pair, squash, string};
use mapforge::{config::MapperConfig, core::diagnostic::DiagnosticCode, schema::prelude::*};

#[test]
fn identical_shapes_are_a_plain_copy() {
    let schema = pair(
        TypeDescriptor::new("model::Person").with_property(string("name")),
        TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
    );

    let generation = generate(&schema, &MapperConfig::default());
    let source = artifact(&generation, "person_to_person_dto");

    assert!(generation.diagnostics.is_empty());
    assert!(source.contains("name:source.name.clone()"));
    assert!(source.contains("::mapforge::MappingError::null_source("));
    assert!(!source.contains("null_property"));
}

#[test]
fn nullable_into_required_is_rejected_by_default() {
    let schema = pair(
        TypeDescriptor::new("model::Person")
            .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String").nullable())),
        TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
    );

    let generation = generate(&schema, &MapperConfig::default());

    assert!(generation.diagnostics.has_code(DiagnosticCode::NullabilityMismatch));
    assert!(generation.artifact("person_to_person_dto").is_none());
}

#[test]
fn null_override_defaults_instead_of_guarding() {
    let schema = pair(
        TypeDescriptor::new("model::Person").with_property(
            PropertyDescriptor::new("name", TypeRef::scalar("String").nullable())
                .with_directive(Directive::IgnoreNullIncompatibility),
        ),
        TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
    );

    let generation = generate(&schema, &MapperConfig::default());
    let source = artifact(&generation, "person_to_person_dto");

    assert!(!generation.has_errors());
    assert!(source.contains(&squash(
        "name: match &source.name { Some(name_value) => name_value.clone(), None => Default::default(), }"
    )));
    assert!(!source.contains("null_property"));
}

#[test]
fn arrays_materialize_into_lists_without_element_calls() {
    let schema = pair(
        TypeDescriptor::new("model::Post")
            .with_property(PropertyDescriptor::new("tags", TypeRef::array(TypeRef::scalar("String")))),
        TypeDescriptor::new("dto::PostDto")
            .with_property(PropertyDescriptor::new("tags", TypeRef::list(TypeRef::scalar("String")))),
    );

    let generation = generate(&schema, &MapperConfig::default());
    let source = artifact(&generation, "post_to_post_dto");

    assert!(source.contains("tags:source.tags.iter().cloned().collect::<Vec<_>>()"));
}

#[test]
fn shared_resolvers_are_built_once_from_prefixed_parameters() {
    let resolver = ResolverDescriptor::new(
        "model::PhoneResolver",
        TypeRef::scalar("String"),
        TypeRef::scalar("String"),
    )
    .with_parameter(ParameterDescriptor::new("country", TypeRef::scalar("String")))
    .with_parameter(ParameterDescriptor::new("strict", TypeRef::value("bool")));
    let uses = || {
        Directive::UseResolver {
            resolver: "model::PhoneResolver".to_string(),
        }
    };
    let schema = pair(
        TypeDescriptor::new("model::Contact")
            .with_property(string("phone").with_directive(uses()))
            .with_property(string("mobile").with_directive(uses())),
        TypeDescriptor::new("dto::ContactDto")
            .with_property(string("phone"))
            .with_property(string("mobile")),
    )
    .with_resolver(resolver);

    let generation = generate(&schema, &MapperConfig::default());
    let source = artifact(&generation, "contact_to_contact_dto");

    assert!(source.contains("phone_resolver_country:&String,phone_resolver_strict:&bool,"));
    assert_eq!(
        source
            .matches("letphone_resolver=&PhoneResolver::new(phone_resolver_country.clone(),phone_resolver_strict.clone());")
            .count(),
        1
    );
    assert_eq!(source.matches("resolve(phone_resolver,").count(), 2);
}

#[test]
fn leftover_destination_properties_block_emission() {
    let schema = pair(
        TypeDescriptor::new("model::Person").with_property(string("name")),
        TypeDescriptor::new("dto::PersonDto")
            .with_property(string("name"))
            .with_property(string("nickname")),
    );

    let generation = generate(&schema, &MapperConfig::default());

    assert!(generation.diagnostics.has_code(DiagnosticCode::LeftoverDestinationProperty));
    assert!(generation.artifact("person_to_person_dto").is_none());
}

#[test]
fn invalid_mappings_do_not_block_unrelated_ones() {
    let schema = pair(
        TypeDescriptor::new("model::Person").with_property(string("name")),
        TypeDescriptor::new("dto::PersonDto")
            .with_property(string("name"))
            .with_property(string("nickname")),
    )
    .with_type(
        TypeDescriptor::new("model::Tag")
            .with_property(string("label"))
            .maps_to("dto::TagDto"),
    )
    .with_type(TypeDescriptor::new("dto::TagDto").with_property(string("label")));

    let generation = generate(&schema, &MapperConfig::default());

    assert!(generation.has_errors());
    assert!(generation.artifact("person_to_person_dto").is_none());
    assert!(generation.artifact("tag_to_tag_dto").is_some());
}

#[test]
fn nullable_collections_become_empty_not_null() {
    let schema = pair(
        TypeDescriptor::new("model::Post").with_property(PropertyDescriptor::new(
            "tags",
            TypeRef::list(TypeRef::scalar("String")).nullable(),
        )),
        TypeDescriptor::new("dto::PostDto")
            .with_property(PropertyDescriptor::new("tags", TypeRef::array(TypeRef::scalar("String")))),
    );

    let generation = generate(&schema, &MapperConfig::default());
    let source = artifact(&generation, "post_to_post_dto");

    assert!(source.contains(&squash(
        "tags: match &source.tags {
            Some(tags_value) => tags_value.iter().cloned().collect::<Box<[_]>>(),
            None => Default::default(),
        }"
    )));
}

#[test]
fn dictionaries_filter_null_keys_and_values() {
    let schema = pair(
        TypeDescriptor::new("model::Scores").with_property(PropertyDescriptor::new(
            "points",
            TypeRef::map(
                MapKind::Hash,
                TypeRef::scalar("String").nullable(),
                TypeRef::value("u32").nullable(),
            ),
        )),
        TypeDescriptor::new("dto::ScoresDto").with_property(PropertyDescriptor::new(
            "points",
            TypeRef::map(MapKind::Hash, TypeRef::scalar("String"), TypeRef::value("u32")),
        )),
    );
    let config = MapperConfig {
        throw_on_null_element: false,
        ..Default::default()
    };

    let generation = generate(&schema, &config);
    let source = artifact(&generation, "scores_to_scores_dto");

    assert!(source.contains("matchkey{Some(key)=>key.clone(),None=>returnOk(None),}"));
    assert!(source.contains("matchvalue{Some(value)=>*value,None=>returnOk(None),}"));
    assert!(source.contains(".filter_map(Result::transpose)"));
}

#[test]
fn dictionaries_reject_null_elements_when_configured() {
    let schema = pair(
        TypeDescriptor::new("model::Scores").with_property(PropertyDescriptor::new(
            "points",
            TypeRef::map(MapKind::Hash, TypeRef::scalar("String"), TypeRef::value("u32").nullable()),
        )),
        TypeDescriptor::new("dto::ScoresDto").with_property(PropertyDescriptor::new(
            "points",
            TypeRef::map(MapKind::BTree, TypeRef::scalar("String"), TypeRef::value("u32")),
        )),
    );

    let generation = generate(&schema, &MapperConfig::default());
    let source = artifact(&generation, "scores_to_scores_dto");

    assert!(source.contains(&squash(
        "None => return Err(::mapforge::MappingError::null_element(\"model::Scores\", \"dto::ScoresDto\", \"points\"))"
    )));
}
