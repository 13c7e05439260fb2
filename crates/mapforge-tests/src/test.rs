use crate::{
    dto::{AuthorDto, NodeDto, TagDto},
    mappers::*,
    model::{Account, Author, Node, Post, Tag},
};
use mapforge::MappingError;
use std::collections::{BTreeMap, HashMap};

fn author(name: &str) -> Author {
    Author {
        name: name.to_string(),
        email: Some(format!("{name}@example.com")),
    }
}

fn tag(label: &str) -> Tag {
    Tag {
        label: label.to_string(),
    }
}

fn post() -> Post {
    Post {
        id: 7,
        title: "Borrowing".to_string(),
        author: author("ada"),
        reviewer: None,
        tags: Some(vec![tag("Rust"), tag("OWNERSHIP")]),
        scores: HashMap::from([("clarity".to_string(), Some(4)), ("depth".to_string(), None)]),
        ratings: BTreeMap::from([("ada".to_string(), Some(5))]),
    }
}

#[test]
fn plain_properties_are_copied() {
    let dto = map_author_to_author_dto(&author("ada")).expect("author maps");

    assert_eq!(
        dto,
        AuthorDto {
            name: "ada".to_string(),
            email: Some("ada@example.com".to_string()),
        }
    );
}

#[test]
fn absent_source_is_a_null_source_error() {
    let err = map_author_to_author_dto(None::<&Author>).expect_err("absent source must fail");

    assert_eq!(err, MappingError::null_source("model::Author", "dto::AuthorDto"));
}

#[test]
fn nested_objects_go_through_their_own_mappers() {
    let mut source = post();
    source.reviewer = Some(author("grace"));

    let dto = map_post_to_post_dto(&source).expect("post maps");

    assert_eq!(dto.id, 7);
    assert_eq!(dto.title, "Borrowing");
    assert_eq!(dto.author.name, "ada");
    assert_eq!(dto.reviewer.map(|r| r.name), Some("grace".to_string()));
}

#[test]
fn absent_nullable_object_stays_absent() {
    let dto = map_post_to_post_dto(&post()).expect("post maps");

    assert_eq!(dto.reviewer, None);
}

#[test]
fn collection_elements_run_the_after_hook() {
    let dto = map_post_to_post_dto(&post()).expect("post maps");

    assert_eq!(
        dto.tags,
        vec![
            TagDto {
                label: "rust".to_string()
            },
            TagDto {
                label: "ownership".to_string()
            },
        ]
    );
}

#[test]
fn absent_collection_maps_to_empty() {
    let mut source = post();
    source.tags = None;

    let dto = map_post_to_post_dto(&source).expect("post maps");

    assert!(dto.tags.is_empty());

    source.tags = Some(Vec::new());
    let dto = map_post_to_post_dto(&source).expect("post maps");

    assert!(dto.tags.is_empty());
}

#[test]
fn null_map_values_are_dropped_when_ignored() {
    let dto = map_post_to_post_dto(&post()).expect("post maps");

    assert_eq!(dto.scores, HashMap::from([("clarity".to_string(), 4)]));
    assert_eq!(dto.ratings, BTreeMap::from([("ada".to_string(), 5)]));
}

#[test]
fn null_map_values_fail_when_guarded() {
    let mut source = post();
    source.ratings.insert("grace".to_string(), None);

    let err = map_post_to_post_dto(&source).expect_err("null rating must fail");

    assert!(matches!(err, MappingError::NullElement { .. }));
    assert_eq!(err.path(), Some("ratings"));
}

#[test]
fn recursive_trees_map_every_level() {
    let tree = Node::new(
        "root",
        vec![
            Node::new("a", vec![Node::new("a1", vec![Node::new("a11", Vec::new())])]),
            Node::new("b", Vec::new()),
        ],
    );

    let dto = map_node_to_node_dto(&tree).expect("tree maps");

    assert_eq!(dto.depth(), 3);
    assert_eq!(dto.children[0].children[0].children[0].name, "a11");
    assert_eq!(
        dto.children[1],
        NodeDto {
            name: "b".to_string(),
            children: Vec::new(),
        }
    );
}

#[test]
fn resolver_parameters_reach_the_resolver() {
    let account = Account {
        handle: "ada".to_string(),
    };

    let dto = map_account_to_account_dto(&account, &"#1".to_string()).expect("account maps");

    assert_eq!(dto.handle, "ada#1");
}

#[test]
fn sequences_map_every_source() {
    let tags = vec![tag("One"), tag("Two")];

    let labels = map_many_tag_to_tag_dto(&tags)
        .map(|result| result.map(|dto| dto.label))
        .collect::<Result<Vec<_>, _>>()
        .expect("tags map");

    assert_eq!(labels, vec!["one".to_string(), "two".to_string()]);
}

#[test]
fn sequences_forward_resolver_parameters() {
    let accounts = [
        Account {
            handle: "ada".to_string(),
        },
        Account {
            handle: "grace".to_string(),
        },
    ];
    let suffix = "!".to_string();

    let handles = map_many_account_to_account_dto(accounts.iter(), &suffix)
        .map(|result| result.map(|dto| dto.handle))
        .collect::<Result<Vec<_>, _>>()
        .expect("accounts map");

    assert_eq!(handles, vec!["ada!".to_string(), "grace!".to_string()]);
}
