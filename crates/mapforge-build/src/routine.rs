//! One artifact per mapping: a module holding the primary routine and its
//! optional sequence and expression variants.

use crate::{
    BuildError,
    emit::Emitter,
    expression, names::parse_ident, sequence, value,
};
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn artifact(em: &mut Emitter<'_>) -> Result<TokenStream, BuildError> {
    let module = em.names.module(em.info.id)?;

    let mut body = routine(em)?;
    if em.config.generate_sequence_variant {
        body.extend(sequence::generate(em)?);
    }
    if em.config.generate_expression_variant {
        body.extend(expression::generate(em)?);
    }

    // imports last, once every spelled path is known
    let imports = em.types.imports()?;
    let extra = em
        .config
        .extra_imports
        .iter()
        .map(|path| syn::parse_str::<syn::UseTree>(path).map_err(|_| BuildError::InvalidPath(path.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        pub mod #module {
            #imports
            #(
                #[allow(unused_imports)]
                use #extra;
            )*

            #body
        }

        pub use #module::*;
    })
}

// Primary routine: null-source guard, resolver construction, destination literal.
fn routine(em: &mut Emitter<'_>) -> Result<TokenStream, BuildError> {
    let info = em.info;
    let name = em.names.routine(info.id)?;
    let (source_path, destination_path) = (info.source(), info.destination());
    let source = em.types.path(source_path)?;
    let destination = em.types.path(destination_path)?;

    let parameters = em
        .entry_parameters()?
        .into_iter()
        .map(|(ident, ty)| quote!(#ident: &#ty));

    let (generics, input, guard) = if info.source_value_type {
        (quote!(), quote!(source: &#source), quote!())
    } else {
        (
            quote!(<'a>),
            quote!(source: impl Into<Option<&'a #source>>),
            quote! {
                let Some(source) = source.into() else {
                    return Err(::mapforge::MappingError::null_source(#source_path, #destination_path));
                };
            },
        )
    };

    let mut resolvers = quote!();
    for resolver in &info.resolvers {
        let ident = parse_ident(&resolver.ident)?;
        let path = em.types.path(&resolver.path)?;
        let arguments = resolver
            .arguments
            .iter()
            .map(|a| em.parameter(a.key()))
            .collect::<Result<Vec<_>, _>>()?;

        resolvers.extend(quote! {
            let #ident = &#path::new(#(#arguments.clone()),*);
        });
    }

    let fields = info
        .properties
        .iter()
        .map(|property| {
            let field = parse_ident(&property.destination.name)?;
            let value = value::property(em, property)?;
            Ok(quote!(#field: #value))
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    let construct = if em.config.generate_after_hook {
        quote! {
            let mut destination = #destination { #(#fields,)* };
            ::mapforge::AfterMap::<#source>::after_map(&mut destination, source);

            Ok(destination)
        }
    } else {
        quote!(Ok(#destination { #(#fields,)* }))
    };

    let asyncness = info.is_async.then(|| quote!(async));
    let doc = format!("Map `{source_path}` to `{destination_path}`.");

    Ok(quote! {
        #[doc = #doc]
        pub #asyncness fn #name #generics(
            #input,
            #(#parameters,)*
        ) -> Result<#destination, ::mapforge::MappingError> {
            #guard
            #resolvers

            #construct
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{Fixture, squash};
    use mapforge_config_build::MapperConfig;
    use mapforge_schema::prelude::*;

    fn resolver_schema() -> Schema {
        Schema::new()
            .with_resolver(
                ResolverDescriptor::new(
                    "model::PhoneResolver",
                    TypeRef::scalar("String"),
                    TypeRef::scalar("String"),
                )
                .with_parameter(ParameterDescriptor::new("country", TypeRef::scalar("String"))),
            )
            .with_type(
                TypeDescriptor::new("model::Contact")
                    .with_property(
                        PropertyDescriptor::new("phone", TypeRef::scalar("String"))
                            .with_directive(Directive::UseResolver {
                                resolver: "model::PhoneResolver".to_string(),
                            }),
                    )
                    .with_property(
                        PropertyDescriptor::new("fax", TypeRef::scalar("String")).with_directive(
                            Directive::UseResolver {
                                resolver: "model::PhoneResolver".to_string(),
                            },
                        ),
                    )
                    .maps_to("dto::ContactDto"),
            )
            .with_type(
                TypeDescriptor::new("dto::ContactDto")
                    .with_property(PropertyDescriptor::new("phone", TypeRef::scalar("String")))
                    .with_property(PropertyDescriptor::new("fax", TypeRef::scalar("String"))),
            )
    }

    fn plain_config() -> MapperConfig {
        MapperConfig {
            generate_sequence_variant: false,
            generate_after_hook: false,
            ..Default::default()
        }
    }

    #[test]
    fn reference_sources_start_with_a_null_guard() {
        let fixture = Fixture::with_config(&resolver_schema(), plain_config());

        let source = fixture.artifact("model::Contact", "dto::ContactDto");

        assert!(source.contains(&squash(
            "pub fn map_contact_to_contact_dto<'a>(
                source: impl Into<Option<&'a Contact>>,
                phone_resolver_country: &String,
            ) -> Result<ContactDto, ::mapforge::MappingError> {
                let Some(source) = source.into() else {
                    return Err(::mapforge::MappingError::null_source(\"model::Contact\", \"dto::ContactDto\"));
                };"
        )));
    }

    #[test]
    fn resolvers_are_built_once_and_shared() {
        let fixture = Fixture::with_config(&resolver_schema(), plain_config());

        let source = fixture.artifact("model::Contact", "dto::ContactDto");

        assert_eq!(
            source
                .matches("letphone_resolver=&PhoneResolver::new(phone_resolver_country.clone());")
                .count(),
            1
        );
        assert!(source.contains(
            "phone:::mapforge::ValueResolver::<String,String>::resolve(phone_resolver,&source.phone)"
        ));
        assert!(source.contains(
            "fax:::mapforge::ValueResolver::<String,String>::resolve(phone_resolver,&source.fax)"
        ));
    }

    #[test]
    fn imports_are_sorted_and_scoped_to_the_module() {
        let fixture = Fixture::with_config(&resolver_schema(), plain_config());

        let source = fixture.artifact("model::Contact", "dto::ContactDto");

        assert!(source.contains(&squash(
            "pub mod contact_to_contact_dto {
                use crate::dto::ContactDto;
                use crate::model::Contact;
                use crate::model::PhoneResolver;"
        )));
        assert!(source.ends_with("pubusecontact_to_contact_dto::*;"));
    }

    #[test]
    fn after_hook_runs_before_returning() {
        let config = MapperConfig {
            generate_sequence_variant: false,
            ..Default::default()
        };
        let fixture = Fixture::with_config(&resolver_schema(), config);

        let source = fixture.artifact("model::Contact", "dto::ContactDto");

        assert!(source.contains(&squash(
            "::mapforge::AfterMap::<Contact>::after_map(&mut destination, source);
            Ok(destination)"
        )));
    }

    #[test]
    fn value_type_sources_are_borrowed_directly() {
        let schema = Schema::new()
            .with_type(
                TypeDescriptor::new("geo::Point")
                    .value_type()
                    .with_property(PropertyDescriptor::new("x", TypeRef::value("f64")).value_type(true))
                    .maps_to("geo::PointDto"),
            )
            .with_type(
                TypeDescriptor::new("geo::PointDto")
                    .with_property(PropertyDescriptor::new("x", TypeRef::value("f64")).value_type(true)),
            );
        let fixture = Fixture::with_config(&schema, plain_config());

        let source = fixture.artifact("geo::Point", "geo::PointDto");

        assert!(source.contains(&squash(
            "pub fn map_point_to_point_dto(source: &Point,) -> Result<PointDto, ::mapforge::MappingError> {
                Ok(PointDto { x: source.x, })
            }"
        )));
    }

    #[test]
    fn extra_imports_are_emitted_verbatim() {
        let config = MapperConfig {
            extra_imports: vec!["std::fmt::Write".to_string()],
            ..plain_config()
        };
        let fixture = Fixture::with_config(&resolver_schema(), config);

        let source = fixture.artifact("model::Contact", "dto::ContactDto");

        assert!(source.contains("#[allow(unused_imports)]usestd::fmt::Write;"));
    }
}
