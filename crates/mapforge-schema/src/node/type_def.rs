use crate::prelude::*;
use super::validate_type_ref;

const fn default_true() -> bool {
    true
}

///
/// TypeDescriptor
///
/// One declared data type: identity, optional base type, properties in
/// declaration order, attached type-level directives, and the associated
/// functions that `UseMethod` directives may name.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDescriptor {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default)]
    pub value_type: bool,

    /// Whether a public parameterless construction path exists.
    #[serde(default = "default_true")]
    pub constructible: bool,

    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            base: None,
            value_type: false,
            constructible: true,
            properties: Vec::new(),
            directives: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<DirectiveEntry>) -> Self {
        self.directives.push(directive.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub const fn value_type(mut self) -> Self {
        self.value_type = true;
        self
    }

    #[must_use]
    pub const fn not_constructible(mut self) -> Self {
        self.constructible = false;
        self
    }

    /// Convenience for `MapTo` declarations.
    #[must_use]
    pub fn maps_to(self, destination: impl Into<String>) -> Self {
        self.with_directive(Directive::MapTo {
            destination: destination.into(),
        })
    }

    #[must_use]
    pub fn ident(&self) -> &str {
        path_ident(&self.path)
    }

    #[must_use]
    pub fn module(&self) -> Option<&str> {
        path_module(&self.path)
    }

    /// Property declared directly on this type (base types excluded).
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Overloads declared directly on this type under `name`.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

impl ValidateNode for TypeDescriptor {
    fn validate(&self, schema: &Schema) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.path.is_empty() {
            err!(errs, "type path is empty");
        }

        // base
        if let Some(base) = &self.base
            && schema.get_type(base).is_none()
        {
            err!(errs, "unknown base type '{base}'");
        }

        // properties (duplicate names are a matcher diagnostic, not a schema error)
        for property in &self.properties {
            errs.add_result(property.name.clone(), property.validate(schema));
        }

        // methods
        for method in &self.methods {
            if method.subject().is_none() {
                err!(
                    errs,
                    "method '{}' has no subject parameter",
                    method.name
                );
            }

            let mut method_errs = ErrorTree::new();
            for parameter in &method.parameters {
                validate_type_ref(&parameter.ty, schema, &mut method_errs);
            }
            validate_type_ref(&method.returns, schema, &mut method_errs);
            errs.add_for(method.name.clone(), method_errs);
        }

        errs.result()
    }
}
