use crate::prelude::*;
use super::validate_type_ref;

///
/// ResolverDescriptor
///
/// External helper type performing a custom value transform. Its constructor
/// parameters become parameters of every generated routine that uses it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolverDescriptor {
    pub path: String,

    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,

    pub source: TypeRef,
    pub destination: TypeRef,

    #[serde(default)]
    pub is_async: bool,
}

impl ResolverDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>, source: TypeRef, destination: TypeRef) -> Self {
        Self {
            path: path.into(),
            parameters: Vec::new(),
            source,
            destination,
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
    pub fn ident(&self) -> &str {
        path_ident(&self.path)
    }
}

impl ValidateNode for ResolverDescriptor {
    fn validate(&self, schema: &Schema) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.path.is_empty() {
            err!(errs, "resolver path is empty");
        }
        validate_type_ref(&self.source, schema, &mut errs);
        validate_type_ref(&self.destination, schema, &mut errs);

        for parameter in &self.parameters {
            if parameter.name.is_empty() {
                err!(errs, "constructor parameter name is empty");
            }
            validate_type_ref(&parameter.ty, schema, &mut errs);
        }

        errs.result()
    }
}
