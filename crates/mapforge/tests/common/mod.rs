#![allow(dead_code)]

use mapforge::{Generation, config::MapperConfig, schema::prelude::*};

/// Install a test-scoped subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Token text with all whitespace removed.
pub fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn string(name: &str) -> PropertyDescriptor {
    PropertyDescriptor::new(name, TypeRef::scalar("String"))
}

pub fn pair(source: TypeDescriptor, destination: TypeDescriptor) -> Schema {
    let path = destination.path.clone();

    Schema::new().with_type(source.maps_to(path)).with_type(destination)
}

pub fn generate(schema: &Schema, config: &MapperConfig) -> Generation {
    init_tracing();

    mapforge::generate(schema, config).expect("schema and config are valid")
}

/// Squashed source of the named artifact.
pub fn artifact(generation: &Generation, name: &str) -> String {
    let artifact = generation
        .artifact(name)
        .unwrap_or_else(|| panic!("artifact '{name}' missing; diagnostics: {:?}", generation.diagnostics));

    squash(&artifact.source)
}
