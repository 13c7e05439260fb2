use std::collections::{BTreeMap, HashMap};

///
/// Author
///

#[derive(Clone, Debug, Default)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

///
/// Tag
///

#[derive(Clone, Debug, Default)]
pub struct Tag {
    pub label: String,
}

///
/// Post
///

#[derive(Clone, Debug, Default)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub author: Author,
    pub reviewer: Option<Author>,
    pub tags: Option<Vec<Tag>>,
    pub scores: HashMap<String, Option<u32>>,
    pub ratings: BTreeMap<String, Option<u32>>,
}

///
/// Node
///

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: String,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str, children: Vec<Self>) -> Self {
        Self {
            name: name.to_string(),
            children,
        }
    }
}

///
/// Account
///

#[derive(Clone, Debug, Default)]
pub struct Account {
    pub handle: String,
}
