use crate::prelude::*;

///
/// ParameterDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: TypeRef,

    /// Parameters with a default value are never surfaced to callers.
    #[serde(default)]
    pub has_default: bool,
}

impl ParameterDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
        }
    }

    #[must_use]
    pub const fn defaulted(mut self) -> Self {
        self.has_default = true;
        self
    }
}

///
/// MethodDescriptor
///
/// Associated function of a type that a `UseMethod` directive may name. The
/// first parameter is the implicit subject: the value being converted.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub returns: TypeRef,

    #[serde(default)]
    pub is_async: bool,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, subject: TypeRef, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            parameters: vec![ParameterDescriptor::new("value", subject)],
            returns,
            is_async: false,
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub const fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    #[must_use]
    pub fn subject(&self) -> Option<&ParameterDescriptor> {
        self.parameters.first()
    }

    /// Parameters beyond the subject that callers must supply.
    pub fn required_extra_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().skip(1).filter(|p| !p.has_default)
    }
}
