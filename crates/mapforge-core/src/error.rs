use crate::model::{MappingId, StrategyConflict};
use thiserror::Error as ThisError;

///
/// Error
///
/// Internal failures while building one mapping. They never abort a batch:
/// `Batch` turns each into an `MF9000` diagnostic on the failing mapping.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("type '{0}' is not in the schema")]
    UnknownType(String),

    #[error("mapping {0} is not in the arena")]
    UnknownMapping(MappingId),

    #[error(transparent)]
    StrategyConflict(#[from] StrategyConflict),
}
