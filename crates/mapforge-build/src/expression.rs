//! `project_*`: a pure, single-expression projection. Nulls are handled
//! leniently, delegates are inlined up to the recursion bound, and
//! properties that need a method or resolver are left to `Default`.

use crate::{
    BuildError,
    emit::{Access, Emitter, collect_target, fit},
    names::{map_type, parse_ident},
};
use mapforge_core::model::{
    ElementMapping, MappingId, NullPolicy, PropertyMapping, PropertyShape, Strategy,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

pub(crate) fn generate(em: &mut Emitter<'_>) -> Result<TokenStream, BuildError> {
    let info = em.info;
    let name = em.names.projection(info.id)?;
    let source = em.types.path(info.source())?;
    let destination = em.types.path(info.destination())?;
    let input = binding("source", reads_source(em, info.id, 0)?);
    let literal = literal(em, info.id, &Access::Ref(input.clone()), 0)?;
    let doc = format!(
        "Project `{}` into `{}` without calling helpers.",
        info.source(),
        info.destination()
    );

    Ok(quote! {
        #[doc = #doc]
        #[must_use]
        pub fn #name(#input: &#source) -> #destination {
            #literal
        }
    })
}

// Struct literal for mapping `id` reading from `source`.
fn literal(em: &mut Emitter<'_>, id: MappingId, source: &Access, depth: u32) -> Result<TokenStream, BuildError> {
    let arena = em.arena;
    let info = arena.get(id).ok_or(BuildError::UnknownMapping(id))?;
    let destination = em.types.path(info.destination())?;
    let limit = info.max_recursion_depth;

    let mut fields = Vec::new();
    let mut omitted = false;
    for property in &info.properties {
        if property.needs_helper() {
            omitted = true;
            continue;
        }

        let field = parse_ident(&property.destination.name)?;
        let limit = property.max_recursion_depth.unwrap_or(limit);
        let value = if has_delegate(property) && depth >= limit {
            quote!(Default::default())
        } else {
            hops(em, property, 0, source, depth)?
        };
        fields.push(quote!(#field: #value));
    }

    let rest = omitted.then(|| quote!(..Default::default()));

    Ok(quote!(#destination { #(#fields,)* #rest }))
}

// Whether the literal for `id` at `depth` reads any field of its input.
fn reads_source(em: &Emitter<'_>, id: MappingId, depth: u32) -> Result<bool, BuildError> {
    let info = em.arena.get(id).ok_or(BuildError::UnknownMapping(id))?;

    Ok(info.properties.iter().any(|property| {
        let limit = property.max_recursion_depth.unwrap_or(info.max_recursion_depth);
        !property.needs_helper() && !(has_delegate(property) && depth >= limit)
    }))
}

// Inputs a literal never reads are bound with a leading underscore.
fn binding(name: &str, used: bool) -> proc_macro2::Ident {
    if used {
        format_ident!("{name}")
    } else {
        format_ident!("_{name}")
    }
}

fn has_delegate(property: &PropertyMapping) -> bool {
    property
        .strategies()
        .into_iter()
        .any(|s| matches!(s, Strategy::Delegate(_)))
}

fn hops(
    em: &mut Emitter<'_>,
    property: &PropertyMapping,
    index: usize,
    base: &Access,
    depth: u32,
) -> Result<TokenStream, BuildError> {
    let hop = &property.source[index];
    let last = index + 1 == property.source.len();
    let access = base.field(&parse_ident(&hop.name)?);

    let Some(policy) = hop.on_null else {
        return if last {
            terminal(em, property, &access, depth)
        } else {
            hops(em, property, index + 1, &access, depth)
        };
    };

    let binding = format_ident!("{}_{depth}", hop.name);
    let bound = Access::Ref(binding.clone());
    let inner = if last {
        terminal(em, property, &bound, depth)?
    } else {
        hops(em, property, index + 1, &bound, depth)?
    };
    let place = access.expr();

    Ok(match policy {
        NullPolicy::Propagate => quote!(#place.as_ref().and_then(|#binding| #inner)),
        _ => quote!(#place.as_ref().map(|#binding| #inner).unwrap_or_default()),
    })
}

fn terminal(
    em: &mut Emitter<'_>,
    property: &PropertyMapping,
    access: &Access,
    depth: u32,
) -> Result<TokenStream, BuildError> {
    let nullable = property.destination_nullable();

    let value = match &property.shape {
        PropertyShape::Scalar => {
            let value = convert(em, property.strategy.as_ref(), access, property.terminal().value_type, depth)?;
            return Ok(fit(value, false, nullable));
        }

        PropertyShape::Collection {
            destination,
            element,
            ..
        } => {
            let source = access.expr();
            let target = collect_target(*destination);
            let item = format_ident!("element_{depth}");
            let dropped = matches!(element.on_null, Some(NullPolicy::Filter | NullPolicy::Guard));
            let iter = if dropped {
                quote!(#source.iter().flatten())
            } else {
                quote!(#source.iter())
            };

            if element.strategy.is_none() && (element.on_null.is_none() || dropped) {
                let adapter = if element.value_type {
                    quote!(copied)
                } else {
                    quote!(cloned)
                };
                quote!(#iter.#adapter().collect::<#target>())
            } else {
                let value = if dropped {
                    slot_value(em, element, &Access::Ref(item.clone()), depth)?
                } else {
                    slot(em, element, &Access::Ref(item.clone()), &item, depth)?
                };
                quote!(#iter.map(|#item| #value).collect::<#target>())
            }
        }

        PropertyShape::Map {
            destination,
            key,
            value,
        } => {
            let source = access.expr();
            let map = map_type(*destination);
            let key_ident = format_ident!("key_{depth}");
            let value_ident = format_ident!("value_{depth}");
            let key_tokens = map_slot(em, key, &key_ident, depth)?;
            let value_tokens = map_slot(em, value, &value_ident, depth)?;

            quote! {
                #source
                    .iter()
                    .filter_map(|(#key_ident, #value_ident)| Some((#key_tokens, #value_tokens)))
                    .collect::<#map<_, _>>()
            }
        }

        PropertyShape::Tuple { elements } => {
            let values = elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    let binding = format_ident!("item_{depth}_{index}");
                    slot(em, element, &access.position(index), &binding, depth)
                })
                .collect::<Result<Vec<_>, _>>()?;

            quote!((#(#values,)*))
        }
    };

    Ok(fit(value, false, nullable))
}

// Map slots drop the whole entry when a filtered or guarded slot is absent.
fn map_slot(
    em: &mut Emitter<'_>,
    element: &ElementMapping,
    binding: &proc_macro2::Ident,
    depth: u32,
) -> Result<TokenStream, BuildError> {
    match element.on_null {
        Some(NullPolicy::Filter | NullPolicy::Guard) => {
            let value = slot_value(em, element, &Access::Ref(binding.clone()), depth)?;
            Ok(quote!(#binding.as_ref().map(|#binding| #value)?))
        }
        _ => slot(em, element, &Access::Ref(binding.clone()), binding, depth),
    }
}

fn slot(
    em: &mut Emitter<'_>,
    element: &ElementMapping,
    access: &Access,
    binding: &proc_macro2::Ident,
    depth: u32,
) -> Result<TokenStream, BuildError> {
    let Some(policy) = element.on_null else {
        let value = convert(em, element.strategy.as_ref(), access, element.value_type, depth)?;
        return Ok(fit(value, false, element.destination.nullable));
    };

    let value = slot_value(em, element, &Access::Ref(binding.clone()), depth)?;
    let place = access.expr();

    Ok(match policy {
        NullPolicy::Propagate => quote!(#place.as_ref().and_then(|#binding| #value)),
        _ => quote!(#place.as_ref().map(|#binding| #value).unwrap_or_default()),
    })
}

// Converted value of a present (unwrapped) slot. `and_then` closures
// yield an `Option`; the rest yield the bare value.
fn slot_value(
    em: &mut Emitter<'_>,
    element: &ElementMapping,
    access: &Access,
    depth: u32,
) -> Result<TokenStream, BuildError> {
    let value = convert(em, element.strategy.as_ref(), access, element.value_type, depth)?;
    let propagate = element.on_null == Some(NullPolicy::Propagate);

    Ok(fit(value, false, propagate))
}

fn convert(
    em: &mut Emitter<'_>,
    strategy: Option<&Strategy>,
    access: &Access,
    value_type: bool,
    depth: u32,
) -> Result<TokenStream, BuildError> {
    match strategy {
        None => Ok(access.read(value_type)),
        Some(Strategy::Delegate(call)) => {
            let target = call
                .target
                .ok_or_else(|| BuildError::UnboundDelegate(call.key.clone()))?;
            let max = em
                .arena
                .get(target)
                .ok_or(BuildError::UnknownMapping(target))?
                .max_recursion_depth;

            if depth + 1 > max {
                return Ok(quote!(Default::default()));
            }

            let item = binding(&format!("nested_{}", depth + 1), reads_source(em, target, depth + 1)?);
            let nested = literal(em, target, &Access::Ref(item.clone()), depth + 1)?;
            let input = access.borrow();

            Ok(quote!({ let #item = #input; #nested }))
        }
        Some(_) => Err(BuildError::Inconsistent(
            "helper strategy reached an expression projection".to_string(),
        )),
    }
}
