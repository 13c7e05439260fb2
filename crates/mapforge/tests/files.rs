mod common;

use common::{init_tracing, pair, string};
use mapforge::{Error, build::COMBINED_FILE_NAME, schema::prelude::*};
use std::{fs, path::PathBuf};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mapforge-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");

    dir
}

fn schema() -> Schema {
    pair(
        TypeDescriptor::new("model::Person").with_property(string("name")),
        TypeDescriptor::new("dto::PersonDto").with_property(string("name")),
    )
}

#[test]
fn snapshot_and_config_files_drive_generation() {
    init_tracing();
    let dir = scratch("files");
    let schema_path = dir.join("schema.json");
    let config_path = dir.join("mapforge.toml");
    fs::write(&schema_path, serde_json::to_string(&schema()).expect("encode")).expect("write schema");
    fs::write(&config_path, "generate_sequence_variant = false\n").expect("write config");

    let generation = mapforge::generate_from_files(&schema_path, &config_path).expect("generates");
    let out = dir.join("out");
    generation.write_to(&out).expect("writes");

    let artifact = fs::read_to_string(out.join("person_to_person_dto.rs")).expect("artifact");
    let combined = fs::read_to_string(out.join(COMBINED_FILE_NAME)).expect("combined");

    assert!(artifact.starts_with(mapforge::build::HEADER));
    assert!(!artifact.contains("map_many_"));
    assert!(combined.contains("pub mod person_to_person_dto"));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    init_tracing();
    let dir = scratch("defaults");
    let schema_path = dir.join("schema.json");
    fs::write(&schema_path, serde_json::to_string(&schema()).expect("encode")).expect("write schema");

    let generation =
        mapforge::generate_from_files(&schema_path, dir.join("absent.toml")).expect("generates");

    let artifact = generation.artifact("person_to_person_dto").expect("artifact");
    assert!(artifact.source.contains("map_many_person_to_person_dto"));
}

#[test]
fn unknown_config_keys_are_errors() {
    init_tracing();
    let dir = scratch("bad-config");
    let schema_path = dir.join("schema.json");
    let config_path = dir.join("mapforge.toml");
    fs::write(&schema_path, serde_json::to_string(&schema()).expect("encode")).expect("write schema");
    fs::write(&config_path, "no_such_option = true\n").expect("write config");

    let err = mapforge::generate_from_files(&schema_path, &config_path).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn broken_schemas_are_errors() {
    init_tracing();
    let schema = Schema::new().with_type(TypeDescriptor::new("model::Child").with_base("model::Missing"));

    let err = mapforge::generate(&schema, &mapforge::config::MapperConfig::default()).unwrap_err();

    assert!(matches!(err, Error::Schema(_)));
}
