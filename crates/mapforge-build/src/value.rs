//! Property values of the primary routine: null-guarded read chains and
//! the collection, map and tuple shapes.

use crate::{
    BuildError,
    emit::{Access, Emitter, collect_target, fit},
    names::{map_type, parse_ident},
};
use mapforge_core::model::{ElementMapping, NullPolicy, PropertyMapping, PropertyShape};
use mapforge_schema::prelude::{CollectionKind, MapKind};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

const ERROR: &str = "::mapforge::MappingError";

/// Expression producing the destination value of `property` from `source`.
pub(crate) fn property(em: &mut Emitter<'_>, property: &PropertyMapping) -> Result<TokenStream, BuildError> {
    let root = Access::Ref(format_ident!("source"));

    if is_direct_copy(property) {
        let name = parse_ident(&property.terminal().name)?;
        return Ok(root.field(&name).read(property.terminal().value_type));
    }

    hops(em, property, 0, &root)
}

// A nullable-to-nullable copy of a direct property needs no unwrapping.
fn is_direct_copy(property: &PropertyMapping) -> bool {
    !property.is_nested()
        && property.strategy.is_none()
        && property.shape == PropertyShape::Scalar
        && property.source_nullable()
        && property.destination_nullable()
        && property.terminal().ty.is_identical(&property.destination.ty)
}

fn hops(
    em: &mut Emitter<'_>,
    property: &PropertyMapping,
    index: usize,
    base: &Access,
) -> Result<TokenStream, BuildError> {
    let hop = &property.source[index];
    let last = index + 1 == property.source.len();
    let access = base.field(&parse_ident(&hop.name)?);

    let Some(policy) = hop.on_null else {
        return if last {
            terminal(em, property, &access, hop.nullable())
        } else {
            hops(em, property, index + 1, &access)
        };
    };

    let binding = format_ident!("{}_value", hop.name);
    let bound = Access::Ref(binding.clone());
    let inner = if last {
        terminal(em, property, &bound, false)?
    } else {
        hops(em, property, index + 1, &bound)?
    };

    let none = match policy {
        NullPolicy::Propagate => quote!(None),
        NullPolicy::Guard => em.null_property(&property.source_path_to(index)),
        NullPolicy::Default | NullPolicy::Filter => quote!(Default::default()),
    };
    let scrutinee = access.borrow();

    Ok(quote! {
        match #scrutinee {
            Some(#binding) => #inner,
            None => #none,
        }
    })
}

fn terminal(
    em: &mut Emitter<'_>,
    property: &PropertyMapping,
    access: &Access,
    raw: bool,
) -> Result<TokenStream, BuildError> {
    let destination_nullable = property.destination_nullable();
    let label = property.source_path();

    let shaped = match &property.shape {
        PropertyShape::Scalar => {
            let hop = property.terminal();
            let (tokens, nullable) = em.convert(property.strategy.as_ref(), access, hop.value_type, raw)?;
            return Ok(fit(tokens, nullable, destination_nullable));
        }
        PropertyShape::Collection {
            destination,
            element,
            ..
        } => collection(em, access, *destination, element, &label)?,
        PropertyShape::Map {
            destination,
            key,
            value,
        } => map(em, access, *destination, key, value, &label)?,
        PropertyShape::Tuple { elements } => tuple(em, access, elements, &label)?,
    };

    Ok(fit(shaped, false, destination_nullable))
}

fn collection(
    em: &mut Emitter<'_>,
    access: &Access,
    destination: CollectionKind,
    element: &ElementMapping,
    label: &str,
) -> Result<TokenStream, BuildError> {
    let source = access.expr();
    let target = collect_target(destination);

    // filtered elements arrive unwrapped
    let filtered = element.on_null == Some(NullPolicy::Filter);
    let element = if filtered {
        ElementMapping {
            source: element.source.non_null(),
            on_null: None,
            ..element.clone()
        }
    } else {
        element.clone()
    };
    let iter = if filtered {
        quote!(#source.iter().flatten())
    } else {
        quote!(#source.iter())
    };

    if element.strategy.is_none() && element.on_null.is_none() {
        let adapter = if element.value_type {
            quote!(copied)
        } else {
            quote!(cloned)
        };
        return Ok(quote!(#iter.#adapter().collect::<#target>()));
    }

    let item = format_ident!("element");
    let value = em.slot(&element, &Access::Ref(item.clone()), &item, None, label)?;
    let error: syn::Path = syn::parse_str(ERROR).map_err(|_| BuildError::InvalidPath(ERROR.to_string()))?;

    let tokens = if em.strategy_async(element.strategy.as_ref()) {
        quote! {
            ::mapforge::__reexports::futures::future::try_join_all(
                #iter.map(|#item| async move { Ok::<_, #error>(#value) })
            )
            .await?
            .into_iter()
            .collect::<#target>()
        }
    } else if Emitter::slot_fallible(&element) {
        quote! {
            #iter
                .map(|#item| -> Result<_, #error> { Ok(#value) })
                .collect::<Result<#target, _>>()?
        }
    } else {
        quote!(#iter.map(|#item| #value).collect::<#target>())
    };

    Ok(tokens)
}

fn map(
    em: &mut Emitter<'_>,
    access: &Access,
    destination: MapKind,
    key: &ElementMapping,
    value: &ElementMapping,
    label: &str,
) -> Result<TokenStream, BuildError> {
    let source = access.expr();
    let map = map_type(destination);
    let error: syn::Path = syn::parse_str(ERROR).map_err(|_| BuildError::InvalidPath(ERROR.to_string()))?;

    let (key_ident, value_ident) = (format_ident!("key"), format_ident!("value"));
    let skip = quote!(return Ok(None));
    let key_tokens = em.slot(key, &Access::Ref(key_ident.clone()), &key_ident, Some(&skip), label)?;
    let value_tokens = em.slot(
        value,
        &Access::Ref(value_ident.clone()),
        &value_ident,
        Some(&skip),
        label,
    )?;

    let is_async = em.strategy_async(key.strategy.as_ref()) || em.strategy_async(value.strategy.as_ref());
    let filters = [key, value]
        .iter()
        .any(|slot| slot.on_null == Some(NullPolicy::Filter));
    let fallible = filters || Emitter::slot_fallible(key) || Emitter::slot_fallible(value);

    let tokens = if is_async {
        quote! {
            ::mapforge::__reexports::futures::future::try_join_all(
                #source.iter().map(|(#key_ident, #value_ident)| async move {
                    Ok::<_, #error>(Some((#key_tokens, #value_tokens)))
                })
            )
            .await?
            .into_iter()
            .flatten()
            .collect::<#map<_, _>>()
        }
    } else if fallible {
        quote! {
            #source
                .iter()
                .map(|(#key_ident, #value_ident)| -> Result<Option<(_, _)>, #error> {
                    Ok(Some((#key_tokens, #value_tokens)))
                })
                .filter_map(Result::transpose)
                .collect::<Result<#map<_, _>, _>>()?
        }
    } else {
        quote! {
            #source
                .iter()
                .map(|(#key_ident, #value_ident)| (#key_tokens, #value_tokens))
                .collect::<#map<_, _>>()
        }
    };

    Ok(tokens)
}

fn tuple(
    em: &mut Emitter<'_>,
    access: &Access,
    elements: &[ElementMapping],
    label: &str,
) -> Result<TokenStream, BuildError> {
    let values = elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let binding = format_ident!("item_{index}");
            em.slot(element, &access.position(index), &binding, None, label)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote!((#(#values,)*)))
}
