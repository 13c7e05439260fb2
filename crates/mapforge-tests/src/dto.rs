use crate::model;
use mapforge::AfterMap;
use std::collections::{BTreeMap, HashMap};

///
/// AuthorDto
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthorDto {
    pub name: String,
    pub email: Option<String>,
}

impl AfterMap<model::Author> for AuthorDto {}

///
/// TagDto
///
/// Labels are normalised to lowercase once mapped.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagDto {
    pub label: String,
}

impl AfterMap<model::Tag> for TagDto {
    fn after_map(&mut self, _source: &model::Tag) {
        self.label.make_ascii_lowercase();
    }
}

///
/// PostDto
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PostDto {
    pub id: u64,
    pub title: String,
    pub author: AuthorDto,
    pub reviewer: Option<AuthorDto>,
    pub tags: Vec<TagDto>,
    pub scores: HashMap<String, u32>,
    pub ratings: BTreeMap<String, u32>,
}

impl AfterMap<model::Post> for PostDto {}

///
/// NodeDto
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodeDto {
    pub name: String,
    pub children: Vec<Self>,
}

impl NodeDto {
    /// Number of levels below this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children.iter().map(|child| child.depth() + 1).max().unwrap_or(0)
    }
}

impl AfterMap<model::Node> for NodeDto {}

///
/// AccountDto
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountDto {
    pub handle: String,
}

impl AfterMap<model::Account> for AccountDto {}
