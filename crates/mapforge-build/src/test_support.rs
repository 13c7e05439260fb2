use crate::{emit::Emitter, names::RoutineNames, value};
use mapforge_config_build::MapperConfig;
use mapforge_core::Batch;
use mapforge_schema::prelude::Schema;

/// Token text with all whitespace removed.
pub fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

///
/// Fixture
///

pub struct Fixture {
    pub batch: Batch,
    pub config: MapperConfig,
}

impl Fixture {
    pub fn new(schema: &Schema) -> Self {
        Self::with_config(schema, MapperConfig::default())
    }

    pub fn with_config(schema: &Schema, config: MapperConfig) -> Self {
        let batch = Batch::discover(schema, &config);

        Self { batch, config }
    }

    /// Squashed value expression of every property of one mapping.
    pub fn property_values(&self, source: &str, destination: &str) -> Vec<String> {
        let info = self
            .batch
            .mapping(source, destination)
            .expect("mapping should be discovered");
        assert!(info.is_valid(), "{:?}", info.diagnostics);

        let names = RoutineNames::new(self.batch.arena());
        let mut em = Emitter::new(self.batch.arena(), &self.config, &names, info);

        info.properties
            .iter()
            .map(|property| squash(&value::property(&mut em, property).expect("emits").to_string()))
            .collect()
    }

    /// Squashed artifact source for one mapping.
    pub fn artifact(&self, source: &str, destination: &str) -> String {
        let info = self
            .batch
            .mapping(source, destination)
            .expect("mapping should be discovered");
        assert!(info.is_valid(), "{:?}", info.diagnostics);

        let artifacts = crate::generate(&self.batch, &self.config);
        let names = RoutineNames::new(self.batch.arena());
        let name = names.base(info.id).expect("named");

        let artifact = artifacts
            .into_iter()
            .find(|a| a.name == name)
            .expect("artifact should be emitted");

        squash(&artifact.source)
    }
}
