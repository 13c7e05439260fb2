//! Builds the property records of one mapping from the matcher's pairs.
//!
//! Strategy precedence, first match wins: explicit resolver, explicit method,
//! explicit mapper, collection shape, map shape, tuple shape, declared pair,
//! identical type. Anything else is unresolvable.

use crate::{
    Error, diag,
    diagnostic::{Diagnostics, Location},
    directive::{PropertyDirectives, StrategyDirective},
    matcher::{self, PropertyMatch},
    model::{
        DelegateCall, ElementMapping, EntryParameter, MappingId, MappingInformation, MappingKey,
        MethodCall, NullPolicy, PathHop, PropertyEnd, PropertyMapping, PropertyMappingBuilder,
        PropertyShape, ResolverCall, ResolverInstance, Strategy,
    },
    naming,
};
use mapforge_config_build::MapperConfig;
use mapforge_schema::prelude::*;
use std::collections::BTreeSet;

///
/// BuildContext
///
/// Read-only inputs shared by every mapping built in one pass.
///

#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'a> {
    pub schema: &'a Schema,
    pub config: &'a MapperConfig,

    /// Every discovered (source, destination) pair.
    pub declared: &'a BTreeSet<MappingKey>,
}

impl BuildContext<'_> {
    fn is_declared(&self, source: &str, destination: &str) -> bool {
        self.declared.contains(&MappingKey::new(source, destination))
    }
}

/// Fill `info` from the schema: match properties, attach strategies and
/// null policies, and collect resolver instances and helper parameters.
pub fn build_mapping(ctx: &BuildContext<'_>, info: &mut MappingInformation) -> Result<(), Error> {
    let source = ctx
        .schema
        .get_type(info.source())
        .ok_or_else(|| Error::UnknownType(info.source().to_string()))?;
    let destination = ctx
        .schema
        .get_type(info.destination())
        .ok_or_else(|| Error::UnknownType(info.destination().to_string()))?;

    info.source_value_type = source.value_type;
    if !destination.constructible {
        diag!(
            info.diagnostics,
            NoParameterlessConstructor,
            Location::ty(&destination.path),
            "'{}' has no public parameterless construction path",
            destination.path
        );
    }

    let matched = matcher::match_properties(ctx.schema, &info.key, info.index, &mut info.diagnostics);
    info.max_recursion_depth = matched
        .type_directives
        .max_recursion_depth
        .unwrap_or(ctx.config.max_recursion_depth);
    info.leftover_destinations = matched.leftover_destinations;
    info.unclaimed_sources = matched.unclaimed_sources;

    let mut helpers = Helpers::default();
    for pair in &matched.pairs {
        let mut builder = PropertyBuilder {
            ctx,
            key: &info.key,
            own: info.id,
            helpers: &mut helpers,
            diags: &mut info.diagnostics,
        };
        if let Some(property) = builder.build(pair) {
            info.properties.push(property);
        }
    }

    info.is_async = info
        .properties
        .iter()
        .flat_map(PropertyMapping::strategies)
        .any(Strategy::is_async);
    info.resolvers = helpers.resolvers;
    info.local_parameters = helpers.parameters;

    Ok(())
}

///
/// Helpers
///
/// Resolver instances and helper parameters accumulated across properties.
///

#[derive(Debug, Default)]
struct Helpers {
    resolvers: Vec<ResolverInstance>,
    parameters: Vec<EntryParameter>,
}

impl Helpers {
    // One instance per resolver path and constructor shape.
    fn resolver(&mut self, descriptor: &ResolverDescriptor) -> ResolverCall {
        let shape: Vec<&TypeRef> = descriptor
            .parameters
            .iter()
            .filter(|p| !p.has_default)
            .map(|p| &p.ty)
            .collect();

        let existing = self.resolvers.iter().find(|r| {
            r.path == descriptor.path && r.arguments.iter().map(|a| &a.ty).eq(shape.iter().copied())
        });

        let instance = match existing {
            Some(instance) => instance.ident.clone(),
            None => {
                let base = naming::snake_ident(&descriptor.path);
                let mut ident = base.clone();
                let mut n = 2;
                while self.resolvers.iter().any(|r| r.ident == ident) {
                    ident = format!("{base}_{n}");
                    n += 1;
                }

                let arguments: Vec<_> = descriptor
                    .parameters
                    .iter()
                    .filter(|p| !p.has_default)
                    .map(|p| EntryParameter::new(format!("{ident}_{}", p.name), p.ty.clone()))
                    .collect();
                for argument in &arguments {
                    self.add_parameter(argument.clone());
                }

                self.resolvers.push(ResolverInstance {
                    ident: ident.clone(),
                    path: descriptor.path.clone(),
                    arguments,
                    is_async: descriptor.is_async,
                });

                ident
            }
        };

        ResolverCall {
            instance,
            path: descriptor.path.clone(),
            source: descriptor.source.clone(),
            destination: descriptor.destination.clone(),
            is_async: descriptor.is_async,
        }
    }

    fn add_parameter(&mut self, parameter: EntryParameter) {
        if !self.parameters.iter().any(|p| p.key() == parameter.key()) {
            self.parameters.push(parameter);
        }
    }
}

///
/// Slot
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    Collection,
    Map,
    Tuple,
}

///
/// Plan
///

enum Plan {
    Copy,
    Strategy(Strategy),
    Shape(PropertyShape),
}

///
/// PropertyBuilder
///

struct PropertyBuilder<'a, 'b> {
    ctx: &'b BuildContext<'a>,
    key: &'b MappingKey,
    own: MappingId,
    helpers: &'b mut Helpers,
    diags: &'b mut Diagnostics,
}

impl PropertyBuilder<'_, '_> {
    fn build(&mut self, pair: &PropertyMatch<'_>) -> Option<PropertyMapping> {
        let hops: Vec<PathHop> = pair.source.iter().map(|p| PathHop::new(p)).collect();
        let destination = PropertyEnd::new(pair.destination);
        let location = Location::property(&self.key.destination, &destination.name);
        let directives = &pair.directives;

        let source_ty = hops.last()?.ty.clone();
        let plan = self.plan(&source_ty, &destination.ty, directives, &location)?;
        let policies = self.hop_policies(&hops, &destination, &plan, directives, &location)?;

        let builder = PropertyMappingBuilder::new(hops, destination)
            .ignore_null(directives.ignore_null)
            .max_recursion_depth(directives.max_recursion_depth);
        let builder = match plan {
            Plan::Copy => Ok(builder),
            Plan::Strategy(strategy) => builder.strategy(strategy),
            Plan::Shape(shape) => builder.shape(shape),
        };
        let mut builder = match builder {
            Ok(builder) => builder,
            Err(conflict) => {
                diag!(self.diags, ConflictingStrategy, location, "{conflict}");
                return None;
            }
        };

        for (index, policy) in policies.into_iter().enumerate() {
            if let Some(policy) = policy {
                builder = builder.hop_policy(index, policy);
            }
        }

        Some(builder.build())
    }

    fn plan(
        &mut self,
        source: &TypeRef,
        destination: &TypeRef,
        directives: &PropertyDirectives,
        location: &Location,
    ) -> Option<Plan> {
        let schema = self.ctx.schema;

        // an explicit helper cannot stand in for a declared mapping
        let helper = match &directives.strategy {
            Some(StrategyDirective::Resolver(path)) => Some(format!("resolver '{path}'")),
            Some(StrategyDirective::Method(name)) => Some(format!("method '{name}'")),
            _ => None,
        };
        if let Some(helper) = helper {
            let (from, to) = strategy_slot(source, destination, directives);
            if let (Some(from), Some(to)) = (from.object_path(), to.object_path())
                && self.ctx.is_declared(from, to)
            {
                diag!(
                    self.diags,
                    ConflictingStrategy,
                    location.clone(),
                    "{helper} conflicts with the declared mapping {from} -> {to}"
                );
                return None;
            }
        }

        let strategy = match &directives.strategy {
            None => return self.structural(source, destination, directives.ignore_null, location),

            Some(StrategyDirective::Resolver(path)) => {
                let Some(resolver) = schema.get_resolver(path) else {
                    diag!(
                        self.diags,
                        UnresolvedDirectiveType,
                        location.clone(),
                        "resolver '{path}' is not in the schema"
                    );
                    return None;
                };
                Strategy::Resolver(self.helpers.resolver(resolver))
            }

            Some(StrategyDirective::Method(name)) => {
                let (subject, returns) = strategy_slot(source, destination, directives);
                Strategy::Method(self.find_method(name, subject, returns, location)?)
            }

            Some(StrategyDirective::Mapper {
                source: from,
                destination: to,
            }) => {
                for path in [from, to] {
                    if schema.get_type(path).is_none() {
                        diag!(
                            self.diags,
                            UnresolvedDirectiveType,
                            location.clone(),
                            "mapper type '{path}' is not in the schema"
                        );
                        return None;
                    }
                }
                self.delegate(MappingKey::new(from, to))
            }
        };

        if !directives.complete_collection && element_level(source, destination) {
            return self
                .shape(source, destination, Some(strategy), directives.ignore_null, location)
                .map(Plan::Shape);
        }

        if !self.check_output(&strategy, destination, directives.ignore_null, location) {
            return None;
        }

        Some(Plan::Strategy(strategy))
    }

    fn structural(
        &mut self,
        source: &TypeRef,
        destination: &TypeRef,
        ignore_null: bool,
        location: &Location,
    ) -> Option<Plan> {
        if shaped(source, destination) {
            return self
                .shape(source, destination, None, ignore_null, location)
                .map(Plan::Shape);
        }

        if let (Some(from), Some(to)) = (source.object_path(), destination.object_path())
            && self.ctx.is_declared(from, to)
        {
            return Some(Plan::Strategy(self.delegate(MappingKey::new(from, to))));
        }

        if source.same_shape(destination) {
            return Some(Plan::Copy);
        }

        diag!(
            self.diags,
            UnresolvableProperty,
            location.clone(),
            "no conversion from '{source}' to '{destination}'"
        );

        None
    }

    // Collection, map or tuple shape. A directive strategy lands on the
    // element (collections) or the value (maps).
    fn shape(
        &mut self,
        source: &TypeRef,
        destination: &TypeRef,
        strategy: Option<Strategy>,
        ignore_null: bool,
        location: &Location,
    ) -> Option<PropertyShape> {
        match (&source.kind, &destination.kind) {
            (
                TypeKind::Collection {
                    collection: from,
                    element: source_element,
                },
                TypeKind::Collection {
                    collection: to,
                    element: destination_element,
                },
            ) => {
                let element = self.element(
                    source_element,
                    destination_element,
                    strategy,
                    Slot::Collection,
                    ignore_null,
                    location,
                )?;

                Some(PropertyShape::Collection {
                    source: *from,
                    destination: *to,
                    element: Box::new(element),
                })
            }

            (
                TypeKind::Map {
                    key: source_key,
                    value: source_value,
                    ..
                },
                TypeKind::Map {
                    map,
                    key: destination_key,
                    value: destination_value,
                },
            ) => {
                let key = self.element(source_key, destination_key, None, Slot::Map, ignore_null, location);
                let value = self.element(
                    source_value,
                    destination_value,
                    strategy,
                    Slot::Map,
                    ignore_null,
                    location,
                );

                Some(PropertyShape::Map {
                    destination: *map,
                    key: Box::new(key?),
                    value: Box::new(value?),
                })
            }

            (TypeKind::Tuple { elements: from }, TypeKind::Tuple { elements: to }) if from.len() == to.len() => {
                let elements: Vec<_> = from
                    .iter()
                    .zip(to)
                    .map(|(from, to)| self.element(from, to, None, Slot::Tuple, ignore_null, location))
                    .collect();

                elements
                    .into_iter()
                    .collect::<Option<Vec<_>>>()
                    .map(|elements| PropertyShape::Tuple { elements })
            }

            _ => {
                diag!(
                    self.diags,
                    UnresolvableProperty,
                    location.clone(),
                    "cannot apply a per-element conversion from '{source}' to '{destination}'"
                );
                None
            }
        }
    }

    fn element(
        &mut self,
        source: &TypeRef,
        destination: &TypeRef,
        strategy: Option<Strategy>,
        slot: Slot,
        ignore_null: bool,
        location: &Location,
    ) -> Option<ElementMapping> {
        let strategy = match strategy {
            Some(strategy) => Some(strategy),
            None => self.element_strategy(source, destination, location)?,
        };

        let value_type = self.ctx.schema.is_value_type(source);
        let mut element = ElementMapping::new(source.clone(), destination.clone(), value_type);

        let accepts_null = strategy.as_ref().is_some_and(accepts_null);
        if let Some(strategy) = strategy {
            if !self.check_output(&strategy, destination, ignore_null, location) {
                return None;
            }
            element = match element.with_strategy(strategy) {
                Ok(element) => element,
                Err(conflict) => {
                    diag!(self.diags, ConflictingStrategy, location.clone(), "{conflict}");
                    return None;
                }
            };
        }

        if !source.nullable || accepts_null {
            return Some(element);
        }

        let config = self.ctx.config;
        let policy = if destination.nullable {
            NullPolicy::Propagate
        } else {
            match slot {
                Slot::Collection | Slot::Map if ignore_null || !config.throw_on_null_element => {
                    NullPolicy::Filter
                }
                Slot::Collection | Slot::Map => NullPolicy::Guard,
                Slot::Tuple if ignore_null => NullPolicy::Default,
                Slot::Tuple if config.throw_on_null_element => NullPolicy::Guard,
                Slot::Tuple => {
                    diag!(
                        self.diags,
                        NullabilityMismatch,
                        location.clone(),
                        "nullable tuple element '{source}' maps to non-nullable '{destination}'"
                    );
                    return None;
                }
            }
        };

        Some(element.with_null_policy(Some(policy)))
    }

    // Outer `None` means failure; `Some(None)` is a plain copy.
    fn element_strategy(
        &mut self,
        source: &TypeRef,
        destination: &TypeRef,
        location: &Location,
    ) -> Option<Option<Strategy>> {
        if let (Some(from), Some(to)) = (source.object_path(), destination.object_path())
            && self.ctx.is_declared(from, to)
        {
            return Some(Some(self.delegate(MappingKey::new(from, to))));
        }

        if source.same_shape(destination) {
            return Some(None);
        }

        diag!(
            self.diags,
            UnresolvableProperty,
            location.clone(),
            "no element conversion from '{source}' to '{destination}'"
        );

        None
    }

    // Self-delegation binds immediately.
    fn delegate(&self, key: MappingKey) -> Strategy {
        let call = if key == *self.key {
            DelegateCall::bound(key, self.own)
        } else {
            DelegateCall::unbound(key)
        };

        Strategy::Delegate(call)
    }

    fn find_method(
        &mut self,
        name: &str,
        subject: &TypeRef,
        returns: &TypeRef,
        location: &Location,
    ) -> Option<MethodCall> {
        let schema = self.ctx.schema;

        let mut candidates = schema.methods_named(&self.key.source, name);
        if self.key.destination != self.key.source {
            candidates.extend(schema.methods_named(&self.key.destination, name));
        }
        if candidates.is_empty() {
            diag!(
                self.diags,
                MethodNotFound,
                location.clone(),
                "no method '{name}' on '{}' or '{}'",
                self.key.source,
                self.key.destination
            );
            return None;
        }

        let by_subject: Vec<_> = candidates
            .into_iter()
            .filter(|(_, m)| m.subject().is_some_and(|p| p.ty.same_shape(subject)))
            .collect();
        let matching: Vec<_> = if by_subject.len() > 1 {
            by_subject
                .into_iter()
                .filter(|(_, m)| m.returns.same_shape(returns))
                .collect()
        } else {
            by_subject
        };

        match matching.as_slice() {
            [] => {
                diag!(
                    self.diags,
                    MethodNotFound,
                    location.clone(),
                    "no overload of '{name}' accepts '{subject}'"
                );
                None
            }
            [(owner, method)] => {
                let arguments: Vec<ParameterDescriptor> =
                    method.required_extra_parameters().cloned().collect();
                for argument in &arguments {
                    self.helpers
                        .add_parameter(EntryParameter::new(&argument.name, argument.ty.clone()));
                }

                Some(MethodCall {
                    name: method.name.clone(),
                    owner: owner.path.clone(),
                    subject: method.subject().map_or_else(|| subject.clone(), |p| p.ty.clone()),
                    returns: method.returns.clone(),
                    arguments,
                    is_async: method.is_async,
                })
            }
            _ => {
                diag!(
                    self.diags,
                    AmbiguousMethodOverload,
                    location.clone(),
                    "{} overloads of '{name}' match '{subject}' -> '{returns}'",
                    matching.len()
                );
                None
            }
        }
    }

    // Strategy output must fit the destination slot.
    fn check_output(
        &mut self,
        strategy: &Strategy,
        destination: &TypeRef,
        ignore_null: bool,
        location: &Location,
    ) -> bool {
        let Some(output) = strategy.output() else {
            return true;
        };

        if !output.same_shape(destination) {
            diag!(
                self.diags,
                UnresolvableProperty,
                location.clone(),
                "{} returns '{output}' but the destination is '{destination}'",
                strategy.kind()
            );
            return false;
        }

        if output.nullable && !destination.nullable && !ignore_null {
            diag!(
                self.diags,
                IncompatibleStrategyNullability,
                location.clone(),
                "{} may return null for non-nullable '{destination}'",
                strategy.kind()
            );
            return false;
        }

        true
    }

    // Null policy of every hop, root first; `None` for hops that need none.
    fn hop_policies(
        &mut self,
        hops: &[PathHop],
        destination: &PropertyEnd,
        plan: &Plan,
        directives: &PropertyDirectives,
        location: &Location,
    ) -> Option<Vec<Option<NullPolicy>>> {
        let config = self.ctx.config;
        let last = hops.len().saturating_sub(1);
        let mut failed = false;

        let policies = hops
            .iter()
            .enumerate()
            .map(|(index, hop)| {
                let terminal = index == last;
                if !hop.nullable() {
                    return None;
                }
                if terminal && let Plan::Strategy(strategy) = plan
                    && accepts_null(strategy)
                {
                    return None;
                }
                if destination.nullable() {
                    return Some(NullPolicy::Propagate);
                }
                if terminal && let Plan::Shape(shape) = plan
                    && shape.absorbs_null()
                {
                    return Some(NullPolicy::Default);
                }
                if directives.ignore_null {
                    return Some(NullPolicy::Default);
                }
                if !terminal && config.throw_on_null_property {
                    return Some(NullPolicy::Guard);
                }

                failed = true;
                let path = hops[..=index]
                    .iter()
                    .map(|h| h.name.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                if terminal && matches!(plan, Plan::Strategy(_)) {
                    diag!(
                        self.diags,
                        IncompatibleStrategyNullability,
                        location.clone(),
                        "nullable source '{path}' is passed to a strategy that requires a value"
                    );
                } else {
                    diag!(
                        self.diags,
                        NullabilityMismatch,
                        location.clone(),
                        "nullable source '{path}' maps to non-nullable '{}'",
                        destination.name
                    );
                }

                None
            })
            .collect();

        (!failed).then_some(policies)
    }
}

// Collection and map pairs take directive strategies per element.
fn element_level(source: &TypeRef, destination: &TypeRef) -> bool {
    (source.is_collection() && destination.is_collection()) || (source.is_map() && destination.is_map())
}

fn shaped(source: &TypeRef, destination: &TypeRef) -> bool {
    match (&source.kind, &destination.kind) {
        (TypeKind::Tuple { elements: a }, TypeKind::Tuple { elements: b }) => a.len() == b.len(),
        _ => element_level(source, destination),
    }
}

// Types a method must accept and return for this property.
fn strategy_slot<'a>(
    source: &'a TypeRef,
    destination: &'a TypeRef,
    directives: &PropertyDirectives,
) -> (&'a TypeRef, &'a TypeRef) {
    if directives.complete_collection {
        return (source, destination);
    }

    match (&source.kind, &destination.kind) {
        (TypeKind::Collection { element: a, .. }, TypeKind::Collection { element: b, .. }) => (a, b),
        (TypeKind::Map { value: a, .. }, TypeKind::Map { value: b, .. }) => (a, b),
        _ => (source, destination),
    }
}

// Strategies whose input is itself nullable receive the raw value.
fn accepts_null(strategy: &Strategy) -> bool {
    match strategy {
        Strategy::Method(call) => call.subject.nullable,
        Strategy::Resolver(call) => call.source.nullable,
        Strategy::Delegate(_) => false,
    }
}
