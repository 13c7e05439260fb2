//! MapForge: schema-first generation of type-to-type conversion routines.
//!
//! ## Crate layout
//! - `schema`: the type schema snapshot the generator reads.
//! - `config`: generator options, loaded from `mapforge.toml`.
//! - `core`: mapping discovery, resolution and validation.
//! - `build`: the code emitter.
//!
//! Generated routines depend only on the runtime items re-exported at the
//! crate root: `MappingError`, the resolver traits, `AfterMap` and
//! `MapperRegistry`.

pub use mapforge_build as build;
pub use mapforge_config_build as config;
pub use mapforge_core as core;
pub use mapforge_schema as schema;

mod error;
mod macros;
pub mod runtime;

pub use error::Error;
pub use runtime::{AfterMap, AsyncValueResolver, Mapper, MapperRegistry, MappingError, ValueResolver};

use mapforge_build::Artifact;
use mapforge_config_build::MapperConfig;
use mapforge_core::{Batch, diagnostic::Diagnostics};
use mapforge_schema::{node::Schema, validate::validate_schema};
use std::{fs, path::Path};

/// re-exports
///
/// generated code reaches its dependencies through here, so users do not
/// have to add them to their own Cargo.toml
pub mod __reexports {
    pub use futures;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Generation
///
/// Output of one pass: the emitted artifacts and every diagnostic raised
/// while building them.
///

#[derive(Clone, Debug)]
pub struct Generation {
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Diagnostics,
}

impl Generation {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// Every artifact in one file, for `include!`.
    #[must_use]
    pub fn combined(&self) -> String {
        mapforge_build::combine(&self.artifacts)
    }

    /// Write each artifact plus the combined file into `dir`.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<(), Error> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;

        for artifact in &self.artifacts {
            let path = dir.join(&artifact.file_name);
            fs::write(&path, &artifact.source).map_err(|err| Error::io(&path, err))?;
        }

        let path = dir.join(mapforge_build::COMBINED_FILE_NAME);
        fs::write(&path, self.combined()).map_err(|err| Error::io(&path, err))?;

        Ok(())
    }
}

/// Run one generation pass.
///
/// Invalid configuration and structurally broken schemas are errors;
/// everything wrong with individual mappings is reported in
/// `Generation::diagnostics`, and those mappings are simply not emitted.
pub fn generate(schema: &Schema, config: &MapperConfig) -> Result<Generation, Error> {
    let _span = tracing::debug_span!("generate").entered();

    config.validate()?;
    validate_schema(schema)?;

    let batch = Batch::discover(schema, config);
    let artifacts = mapforge_build::generate(&batch, config);
    let diagnostics = batch.all_diagnostics();

    tracing::debug!(
        mappings = batch.arena().len(),
        artifacts = artifacts.len(),
        errors = diagnostics.errors().count(),
        "generation finished"
    );

    Ok(Generation {
        artifacts,
        diagnostics,
    })
}

/// Load a JSON schema snapshot and an optional TOML config, then generate.
pub fn generate_from_files(schema: impl AsRef<Path>, config: impl AsRef<Path>) -> Result<Generation, Error> {
    let path = schema.as_ref();
    let json = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    let schema = Schema::from_json(&json)?;
    let config = MapperConfig::load_or_default(config)?;

    generate(&schema, &config)
}
