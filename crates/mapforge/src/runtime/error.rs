use thiserror::Error as ThisError;

///
/// MappingError
///
/// The only ways a generated routine fails at runtime. Every variant names
/// the source and destination types; null checks also carry the dotted
/// property path that was absent.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MappingError {
    #[error("cannot map a null {source_type} to {destination_type}")]
    NullSource {
        source_type: String,
        destination_type: String,
    },

    #[error("{source_type} -> {destination_type}: property '{path}' is null")]
    NullProperty {
        source_type: String,
        destination_type: String,
        path: String,
    },

    #[error("{source_type} -> {destination_type}: '{path}' contains a null element")]
    NullElement {
        source_type: String,
        destination_type: String,
        path: String,
    },

    #[error("no mapper is configured for {source_type} -> {destination_type}")]
    NotConfigured {
        source_type: String,
        destination_type: String,
    },
}

impl MappingError {
    pub fn null_source(source_type: impl Into<String>, destination_type: impl Into<String>) -> Self {
        Self::NullSource {
            source_type: source_type.into(),
            destination_type: destination_type.into(),
        }
    }

    pub fn null_property(
        source_type: impl Into<String>,
        destination_type: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::NullProperty {
            source_type: source_type.into(),
            destination_type: destination_type.into(),
            path: path.into(),
        }
    }

    pub fn null_element(
        source_type: impl Into<String>,
        destination_type: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::NullElement {
            source_type: source_type.into(),
            destination_type: destination_type.into(),
            path: path.into(),
        }
    }

    pub fn not_configured(source_type: impl Into<String>, destination_type: impl Into<String>) -> Self {
        Self::NotConfigured {
            source_type: source_type.into(),
            destination_type: destination_type.into(),
        }
    }

    /// Dotted path of the absent value, for null checks below the source.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NullProperty { path, .. } | Self::NullElement { path, .. } => Some(path),
            Self::NullSource { .. } | Self::NotConfigured { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_both_types_and_the_path() {
        let err = MappingError::null_property("model::Person", "dto::PersonDto", "address.city");

        assert_eq!(
            err.to_string(),
            "model::Person -> dto::PersonDto: property 'address.city' is null"
        );
        assert_eq!(err.path(), Some("address.city"));
    }

    #[test]
    fn source_errors_have_no_path() {
        let err = MappingError::null_source("model::Person", "dto::PersonDto");

        assert_eq!(err.to_string(), "cannot map a null model::Person to dto::PersonDto");
        assert_eq!(err.path(), None);
    }
}
