//! `map_many_*`: the primary routine lifted over a sequence of sources.

use crate::{BuildError, emit::Emitter};
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn generate(em: &mut Emitter<'_>) -> Result<TokenStream, BuildError> {
    let info = em.info;
    let name = em.names.many(info.id)?;
    let routine = em.names.routine(info.id)?;
    let source = em.types.path(info.source())?;
    let destination = em.types.path(info.destination())?;

    let parameters = em.entry_parameters()?;
    let idents: Vec<_> = parameters.iter().map(|(ident, _)| ident.clone()).collect();
    let inputs = parameters.iter().map(|(ident, ty)| quote!(#ident: &'a #ty));
    let doc = format!(
        "Map every `{}` yielded by `sources` to `{}`.",
        info.source(),
        info.destination()
    );

    let tokens = if info.is_async {
        quote! {
            #[doc = #doc]
            pub fn #name<'a>(
                sources: impl IntoIterator<Item = &'a #source> + 'a,
                #(#inputs,)*
            ) -> impl ::mapforge::__reexports::futures::Stream<
                Item = Result<#destination, ::mapforge::MappingError>,
            > + 'a {
                ::mapforge::__reexports::futures::StreamExt::then(
                    ::mapforge::__reexports::futures::stream::iter(sources),
                    move |source| #routine(source #(, #idents)*),
                )
            }
        }
    } else {
        quote! {
            #[doc = #doc]
            pub fn #name<'a>(
                sources: impl IntoIterator<Item = &'a #source> + 'a,
                #(#inputs,)*
            ) -> impl Iterator<Item = Result<#destination, ::mapforge::MappingError>> + 'a {
                sources
                    .into_iter()
                    .map(move |source| #routine(source #(, #idents)*))
            }
        }
    };

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{Fixture, squash};
    use mapforge_schema::prelude::*;

    fn schema(is_async: bool) -> Schema {
        let mut method = MethodDescriptor::new("label", TypeRef::scalar("String"), TypeRef::scalar("String"));
        if is_async {
            method = method.asynchronous();
        }

        Schema::new()
            .with_type(
                TypeDescriptor::new("model::Tag")
                    .with_property(
                        PropertyDescriptor::new("name", TypeRef::scalar("String"))
                            .with_directive(Directive::UseMethod { name: "label".to_string() }),
                    )
                    .with_method(method)
                    .maps_to("dto::TagDto"),
            )
            .with_type(
                TypeDescriptor::new("dto::TagDto")
                    .with_property(PropertyDescriptor::new("name", TypeRef::scalar("String"))),
            )
    }

    #[test]
    fn sync_mappings_return_an_iterator() {
        let fixture = Fixture::new(&schema(false));

        let source = fixture.artifact("model::Tag", "dto::TagDto");

        assert!(source.contains(&squash(
            ") -> impl Iterator<Item = Result<TagDto, ::mapforge::MappingError>> + 'a {
                sources.into_iter().map(move |source| map_tag_to_tag_dto(source))
            }"
        )));
        assert!(source.contains("name:Tag::label(&source.name)"));
    }

    #[test]
    fn async_mappings_return_a_stream() {
        let fixture = Fixture::new(&schema(true));

        let source = fixture.artifact("model::Tag", "dto::TagDto");

        assert!(source.contains("pubasyncfnmap_tag_to_tag_dto<'a>"));
        assert!(source.contains("name:Tag::label(&source.name).await"));
        assert!(source.contains(&squash(
            "::mapforge::__reexports::futures::StreamExt::then(
                ::mapforge::__reexports::futures::stream::iter(sources),
                move |source| map_tag_to_tag_dto(source),
            )"
        )));
    }
}
