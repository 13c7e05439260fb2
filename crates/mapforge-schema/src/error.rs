use std::{collections::BTreeMap, fmt};

///
/// ErrorTree
///
/// Route-aware error accumulator. Validation never stops at the first
/// problem; callers collect everything and decide at the end with `result()`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    messages: Vec<String>,
    children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Record a message at the current route.
    pub fn add(&mut self, message: impl ToString) {
        self.messages.push(message.to_string());
    }

    /// Merge a child tree under `route`, skipping empty trees.
    pub fn add_for(&mut self, route: impl Into<String>, tree: Self) {
        if tree.is_empty() {
            return;
        }

        self.children.entry(route.into()).or_default().merge(tree);
    }

    /// Merge a child validation result under `route`.
    pub fn add_result(&mut self, route: impl Into<String>, result: Result<(), Self>) {
        if let Err(tree) = result {
            self.add_for(route, tree);
        }
    }

    /// Fold every message and child of `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
        for (route, child) in other.children {
            self.add_for(route, child);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Flatten into `(route, message)` pairs in deterministic order.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for message in &self.messages {
            out.push((prefix.to_string(), message.clone()));
        }

        for (route, child) in &self.children {
            let route = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix}/{route}")
            };
            child.flatten_into(&route, out);
        }
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .flatten()
            .into_iter()
            .map(|(route, message)| {
                if route.is_empty() {
                    message
                } else {
                    format!("{route}: {message}")
                }
            })
            .collect::<Vec<_>>();

        write!(f, "{}", lines.join("; "))
    }
}

/// Push a formatted message onto an `ErrorTree`.
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_ok() {
        assert!(ErrorTree::new().result().is_ok());
    }

    #[test]
    fn nested_routes_flatten_in_order() {
        let mut child = ErrorTree::new();
        child.add("bad property");

        let mut tree = ErrorTree::new();
        tree.add("top level");
        tree.add_for("crate::model::Person", child);

        assert_eq!(
            tree.flatten(),
            vec![
                (String::new(), "top level".to_string()),
                ("crate::model::Person".to_string(), "bad property".to_string()),
            ]
        );
        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.to_string(),
            "top level; crate::model::Person: bad property"
        );
    }

    #[test]
    fn empty_children_are_not_recorded() {
        let mut tree = ErrorTree::new();
        tree.add_for("route", ErrorTree::new());

        assert!(tree.is_empty());
    }
}
