use crate::prelude::*;
use super::validate_type_ref;

///
/// Access
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Access {
    pub get: bool,
    pub set: bool,
}

impl Default for Access {
    fn default() -> Self {
        Self {
            get: true,
            set: true,
        }
    }
}

///
/// PropertyDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeRef,

    #[serde(default)]
    pub value_type: bool,

    #[serde(default)]
    pub access: Access,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveEntry>,
}

impl PropertyDescriptor {
    /// Value-type-ness follows the declared type for scalars.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        let value_type = matches!(
            ty.kind,
            TypeKind::Scalar {
                value_type: true,
                ..
            }
        );

        Self {
            name: name.into(),
            ty,
            value_type,
            access: Access::default(),
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<DirectiveEntry>) -> Self {
        self.directives.push(directive.into());
        self
    }

    #[must_use]
    pub const fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub const fn value_type(mut self, value_type: bool) -> Self {
        self.value_type = value_type;
        self
    }

    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.ty.nullable
    }
}

impl ValidateNode for PropertyDescriptor {
    fn validate(&self, schema: &Schema) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.name.is_empty() {
            err!(errs, "property name is empty");
        }
        validate_type_ref(&self.ty, schema, &mut errs);

        errs.result()
    }
}
