//! End-to-end fixture: `build.rs` generates mappers from `schema.json`, and
//! the tests below run them against real values.

pub mod dto;
pub mod model;
pub mod resolvers;

#[cfg(test)]
mod test;

/// Routines generated from `schema.json`.
#[allow(clippy::all, clippy::nursery, clippy::pedantic)]
pub mod mappers {
    include!(concat!(env!("OUT_DIR"), "/mapforge.rs"));
}
