//! Code emitter: turns a resolved mapping batch into Rust source artifacts.
//!
//! Every valid mapping becomes one module with its routines. Output is
//! deterministic: the same batch always yields byte-identical artifacts.

mod emit;
mod expression;
mod names;
mod registry;
mod routine;
mod sequence;
mod value;

#[cfg(test)]
mod test_support;

pub use names::{RoutineNames, rust_path};

use emit::Emitter;
use mapforge_config_build::MapperConfig;
use mapforge_core::{
    Batch,
    model::{MappingId, MappingInformation, MappingKey},
};
use proc_macro2::TokenStream;
use std::fmt;
use thiserror::Error as ThisError;

/// First line of every emitted file.
pub const HEADER: &str = "// @generated by mapforge. Do not edit.";

/// Name of the file that concatenates every artifact.
pub const COMBINED_FILE_NAME: &str = "mapforge.rs";

///
/// BuildError
///
/// Inconsistencies between a validated batch and what can be spelled in
/// Rust. These never abort a generation pass; the affected artifact is
/// replaced by a comment.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum BuildError {
    #[error("inconsistent mapping: {0}")]
    Inconsistent(String),

    #[error("'{0}' is not a valid identifier")]
    InvalidIdent(String),

    #[error("'{0}' is not a valid path")]
    InvalidPath(String),

    #[error("'{0}' is not a valid type")]
    InvalidType(String),

    #[error("parameter '{0}' is not in scope")]
    MissingParameter(String),

    #[error("delegate {0} is not bound")]
    UnboundDelegate(MappingKey),

    #[error("unknown mapping {0}")]
    UnknownMapping(MappingId),
}

///
/// Artifact
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub file_name: String,
    pub source: String,
}

impl Artifact {
    fn new(name: impl Into<String>, tokens: &TokenStream) -> Self {
        let name = name.into();

        Self {
            file_name: format!("{name}.rs"),
            source: format!("{HEADER}\n{tokens}\n"),
            name,
        }
    }

    // Stand-in for an artifact that could not be emitted.
    fn skipped(name: impl Into<String>, subject: impl fmt::Display, reason: impl fmt::Display) -> Self {
        let name = name.into();

        Self {
            file_name: format!("{name}.rs"),
            source: format!("{HEADER}\n// mapforge: skipped {subject}: {reason}\n"),
            name,
        }
    }
}

///
/// MapperBuilder
///

pub struct MapperBuilder<'a> {
    pub batch: &'a Batch,
    pub config: &'a MapperConfig,
    names: RoutineNames,
}

impl<'a> MapperBuilder<'a> {
    #[must_use]
    pub fn new(batch: &'a Batch, config: &'a MapperConfig) -> Self {
        Self {
            batch,
            config,
            names: RoutineNames::new(batch.arena()),
        }
    }

    /// One artifact per valid mapping, then the enabled side artifacts.
    #[must_use]
    pub fn generate(self) -> Vec<Artifact> {
        let _span = tracing::debug_span!("emit").entered();
        let arena = self.batch.arena();

        let mut artifacts = Vec::new();
        for info in arena.iter().filter(|info| info.is_valid()) {
            artifacts.push(self.mapping(info));
        }

        if self.config.generate_registration {
            artifacts.push(side("registration", registry::registration(arena, &self.names)));
        }
        if self.config.generate_dispatch {
            artifacts.push(side("dispatch", registry::dispatch(arena, &self.names)));
        }

        tracing::debug!(artifacts = artifacts.len(), "emission finished");

        artifacts
    }

    fn mapping(&self, info: &MappingInformation) -> Artifact {
        let name = match self.names.base(info.id) {
            Ok(name) => name.to_string(),
            Err(err) => return Artifact::skipped(info.id.to_string(), &info.key, err),
        };

        let mut em = Emitter::new(self.batch.arena(), self.config, &self.names, info);
        match routine::artifact(&mut em) {
            Ok(tokens) => {
                tracing::trace!(mapping = %info.key, artifact = %name, "emitted");
                Artifact::new(name, &tokens)
            }
            Err(err) => {
                tracing::warn!(mapping = %info.key, error = %err, "mapping skipped during emission");
                Artifact::skipped(name, &info.key, err)
            }
        }
    }
}

fn side(name: &str, tokens: Result<TokenStream, BuildError>) -> Artifact {
    match tokens {
        Ok(tokens) => Artifact::new(name, &tokens),
        Err(err) => {
            tracing::warn!(artifact = name, error = %err, "side artifact skipped");
            Artifact::skipped(name, name, err)
        }
    }
}

/// Emit every artifact of `batch`.
#[must_use]
pub fn generate(batch: &Batch, config: &MapperConfig) -> Vec<Artifact> {
    MapperBuilder::new(batch, config).generate()
}

/// Concatenate artifacts into the single file pulled in with `include!`.
#[must_use]
pub fn combine(artifacts: &[Artifact]) -> String {
    let mut out = format!("{HEADER}\n");
    for artifact in artifacts {
        let body = artifact.source.strip_prefix(HEADER).unwrap_or(&artifact.source);
        out.push_str(body.trim_start_matches('\n'));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_schema::prelude::*;

    fn schema() -> Schema {
        Schema::new()
            .with_type(
                TypeDescriptor::new("model::Item")
                    .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String")))
                    .maps_to("dto::ItemDto"),
            )
            .with_type(
                TypeDescriptor::new("dto::ItemDto")
                    .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String"))),
            )
            .with_type(
                TypeDescriptor::new("model::Archived")
                    .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String")))
                    .maps_to("dto::ItemDto"),
            )
    }

    #[test]
    fn one_artifact_per_valid_mapping() {
        let config = MapperConfig::default();
        let batch = Batch::discover(&schema(), &config);

        let artifacts = generate(&batch, &config);
        let names: Vec<_> = artifacts.iter().map(|a| a.file_name.as_str()).collect();

        assert_eq!(names, ["archived_to_item_dto.rs", "item_to_item_dto.rs"]);
        assert!(artifacts.iter().all(|a| a.source.starts_with(HEADER)));
    }

    #[test]
    fn side_artifacts_follow_the_mappings() {
        let config = MapperConfig {
            generate_registration: true,
            generate_dispatch: true,
            ..Default::default()
        };
        let batch = Batch::discover(&schema(), &config);

        let artifacts = generate(&batch, &config);

        assert_eq!(artifacts[artifacts.len() - 2].name, "registration");
        assert_eq!(artifacts[artifacts.len() - 1].name, "dispatch");
    }

    #[test]
    fn combined_output_has_a_single_header() {
        let config = MapperConfig::default();
        let batch = Batch::discover(&schema(), &config);

        let combined = combine(&generate(&batch, &config));

        assert_eq!(combined.matches(HEADER).count(), 1);
        assert!(combined.contains("pub mod item_to_item_dto"));
    }

    #[test]
    fn skipped_artifacts_are_comments() {
        let artifact = Artifact::skipped("a_to_b", "a -> b", BuildError::InvalidType("[".to_string()));

        assert_eq!(
            artifact.source,
            format!("{HEADER}\n// mapforge: skipped a -> b: '[' is not a valid type\n")
        );
    }

    #[test]
    fn repeated_generation_is_identical() {
        let config = MapperConfig::default();
        let batch = Batch::discover(&schema(), &config);

        assert_eq!(generate(&batch, &config), generate(&batch, &config));
    }
}
