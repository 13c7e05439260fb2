//! Batch-wide side artifacts: registration of every plain routine with a
//! `MapperRegistry`, and a runtime type switch over all routines.

use crate::{
    BuildError,
    names::{RoutineNames, parse_path, rust_path},
};
use mapforge_core::model::{MappingArena, MappingInformation};
use proc_macro2::TokenStream;
use quote::quote;

// Routines callable with nothing but a source reference.
fn plain<'a>(arena: &'a MappingArena) -> impl Iterator<Item = &'a MappingInformation> {
    arena
        .iter()
        .filter(|info| info.is_valid() && !info.is_async && info.is_parameterless())
}

fn type_path(path: &str) -> Result<TokenStream, BuildError> {
    let path = parse_path(&rust_path(path))?;

    Ok(quote!(#path))
}

pub(crate) fn registration(arena: &MappingArena, names: &RoutineNames) -> Result<TokenStream, BuildError> {
    let mut entries = quote!();
    for info in plain(arena) {
        let source = type_path(info.source())?;
        let destination = type_path(info.destination())?;
        let routine = names.routine(info.id)?;

        entries.extend(quote! {
            registry.register::<#source, #destination>(|source| #routine(source));
        });
    }

    Ok(quote! {
        /// Register every generated routine that needs no extra parameters.
        pub fn register_mappers(registry: &mut ::mapforge::MapperRegistry) {
            #entries
        }
    })
}

pub(crate) fn dispatch(arena: &MappingArena, names: &RoutineNames) -> Result<TokenStream, BuildError> {
    let mut arms = quote!();
    for info in plain(arena) {
        let source = type_path(info.source())?;
        let destination = type_path(info.destination())?;
        let routine = names.routine(info.id)?;

        arms.extend(quote! {
            if ::std::any::TypeId::of::<D>() == ::std::any::TypeId::of::<#destination>() {
                if let Some(source) = source.downcast_ref::<#source>() {
                    let destination: Box<dyn ::std::any::Any> = Box::new(#routine(source)?);
                    if let Ok(destination) = destination.downcast::<D>() {
                        return Ok(*destination);
                    }
                }
            }
        });
    }

    Ok(quote! {
        /// Map `source` to `D` through whichever generated routine handles
        /// that pair of runtime types.
        pub fn map_dyn<S: ::std::any::Any, D: ::std::any::Any>(
            source: &S,
        ) -> Result<D, ::mapforge::MappingError> {
            let source: &dyn ::std::any::Any = source;
            #arms

            Err(::mapforge::MappingError::not_configured(
                ::std::any::type_name::<S>(),
                ::std::any::type_name::<D>(),
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::squash;
    use mapforge_config_build::MapperConfig;
    use mapforge_core::Batch;
    use mapforge_schema::prelude::*;

    fn batch() -> Batch {
        let schema = Schema::new()
            .with_type(
                TypeDescriptor::new("model::Item")
                    .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String")))
                    .maps_to("dto::ItemDto"),
            )
            .with_type(
                TypeDescriptor::new("dto::ItemDto")
                    .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String"))),
            );

        Batch::discover(&schema, &MapperConfig::default())
    }

    #[test]
    fn registration_lists_plain_routines() {
        let batch = batch();
        let names = RoutineNames::new(batch.arena());

        let tokens = squash(&registration(batch.arena(), &names).unwrap().to_string());

        assert!(tokens.contains(
            "registry.register::<crate::model::Item,crate::dto::ItemDto>(|source|map_item_to_item_dto(source));"
        ));
    }

    #[test]
    fn dispatch_falls_back_to_not_configured() {
        let batch = batch();
        let names = RoutineNames::new(batch.arena());

        let tokens = squash(&dispatch(batch.arena(), &names).unwrap().to_string());

        assert!(tokens.contains("source.downcast_ref::<crate::model::Item>()"));
        assert!(tokens.contains("Err(::mapforge::MappingError::not_configured("));
    }
}
