use convert_case::{Case, Casing};
use mapforge_schema::node::path_ident;

/// `snake_case` form of the last segment of a type path.
#[must_use]
pub fn snake_ident(path: &str) -> String {
    path_ident(path).to_case(Case::Snake)
}

/// `snake_case` form of a whole type path, segments joined with `_`.
#[must_use]
pub fn snake_path(path: &str) -> String {
    path.split(mapforge_schema::PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty() && *segment != "crate")
        .map(|segment| segment.to_case(Case::Snake))
        .collect::<Vec<_>>()
        .join("_")
}
