use crate::model::{MappingId, MappingKey};
use mapforge_schema::prelude::*;
use serde::Serialize;

///
/// Strategy
///
/// How a single property (or a single element slot of a collection, map or
/// tuple) is converted. Absence of a strategy means a plain copy.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Strategy {
    Delegate(DelegateCall),
    Method(MethodCall),
    Resolver(ResolverCall),
}

impl Strategy {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Delegate(_) => "mapper",
            Self::Method(_) => "method",
            Self::Resolver(_) => "resolver",
        }
    }

    /// Whether the emitted call must be awaited. Delegates report their
    /// target's flag separately, once bound.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        match self {
            Self::Delegate(_) => false,
            Self::Method(call) => call.is_async,
            Self::Resolver(call) => call.is_async,
        }
    }

    /// Type produced by the strategy, when it is known up front.
    #[must_use]
    pub const fn output(&self) -> Option<&TypeRef> {
        match self {
            Self::Delegate(_) => None,
            Self::Method(call) => Some(&call.returns),
            Self::Resolver(call) => Some(&call.destination),
        }
    }

    /// Strategies that call user helpers cannot appear in a pure expression.
    #[must_use]
    pub const fn needs_helper(&self) -> bool {
        matches!(self, Self::Method(_) | Self::Resolver(_))
    }

    #[must_use]
    pub const fn as_delegate(&self) -> Option<&DelegateCall> {
        match self {
            Self::Delegate(call) => Some(call),
            _ => None,
        }
    }
}

///
/// DelegateCall
///
/// Calls the routine generated for another declared pair. `target` stays
/// empty until the dependency resolver binds it.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DelegateCall {
    pub key: MappingKey,
    pub target: Option<MappingId>,
}

impl DelegateCall {
    #[must_use]
    pub const fn unbound(key: MappingKey) -> Self {
        Self { key, target: None }
    }

    #[must_use]
    pub const fn bound(key: MappingKey, target: MappingId) -> Self {
        Self {
            key,
            target: Some(target),
        }
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.target.is_some()
    }
}

///
/// MethodCall
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MethodCall {
    pub name: String,

    /// Type declaring the associated function.
    pub owner: String,

    pub subject: TypeRef,
    pub returns: TypeRef,

    /// Required parameters beyond the subject, in declaration order.
    pub arguments: Vec<ParameterDescriptor>,

    pub is_async: bool,
}

///
/// ResolverCall
///
/// Invokes the shared resolver instance named `instance`, which is built
/// once per routine from `ResolverInstance`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolverCall {
    pub instance: String,
    pub path: String,
    pub source: TypeRef,
    pub destination: TypeRef,
    pub is_async: bool,
}
