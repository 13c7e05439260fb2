use crate::{
    BuildError,
    names::{RoutineNames, TypeScope, parse_ident},
};
use mapforge_config_build::MapperConfig;
use mapforge_core::model::{
    ElementMapping, EntryParameter, MappingArena, MappingInformation, NullPolicy, Strategy,
};
use mapforge_schema::prelude::{CollectionKind, TypeRef};
use proc_macro2::{Ident, TokenStream};
use quote::quote;

///
/// Access
///
/// How generated code reaches a value: a place expression (`source.name`)
/// or a binding that already holds a reference.
///

#[derive(Clone, Debug)]
pub(crate) enum Access {
    Place(TokenStream),
    Ref(Ident),
}

impl Access {
    pub fn field(&self, name: &Ident) -> Self {
        let base = self.expr();
        Self::Place(quote!(#base.#name))
    }

    pub fn position(&self, index: usize) -> Self {
        let base = self.expr();
        let index = syn::Index::from(index);
        Self::Place(quote!(#base.#index))
    }

    pub fn expr(&self) -> TokenStream {
        match self {
            Self::Place(place) => place.clone(),
            Self::Ref(ident) => quote!(#ident),
        }
    }

    pub fn borrow(&self) -> TokenStream {
        match self {
            Self::Place(place) => quote!(&#place),
            Self::Ref(ident) => quote!(#ident),
        }
    }

    /// Owned copy of the value.
    pub fn read(&self, value_type: bool) -> TokenStream {
        match (self, value_type) {
            (Self::Place(place), true) => quote!(#place),
            (Self::Ref(ident), true) => quote!(*#ident),
            (_, false) => {
                let expr = self.expr();
                quote!(#expr.clone())
            }
        }
    }
}

/// Adapt a value to the nullability of its destination slot.
pub(crate) fn fit(tokens: TokenStream, output_nullable: bool, destination_nullable: bool) -> TokenStream {
    match (output_nullable, destination_nullable) {
        (true, false) => quote!(#tokens.unwrap_or_default()),
        (false, true) => quote!(Some(#tokens)),
        _ => tokens,
    }
}

/// Collection type a shaped property collects into; `_` lets the field infer it.
pub(crate) fn collect_target(kind: CollectionKind) -> TokenStream {
    match kind {
        CollectionKind::Array => quote!(Box<[_]>),
        CollectionKind::List => quote!(Vec<_>),
        CollectionKind::Sequence => quote!(_),
    }
}

///
/// Emitter
///
/// Per-artifact state: the mapping being emitted, the batch it belongs to,
/// and the type scope collecting its imports.
///

pub(crate) struct Emitter<'a> {
    pub arena: &'a MappingArena,
    pub config: &'a MapperConfig,
    pub names: &'a RoutineNames,
    pub info: &'a MappingInformation,
    pub types: TypeScope,
}

impl<'a> Emitter<'a> {
    pub fn new(
        arena: &'a MappingArena,
        config: &'a MapperConfig,
        names: &'a RoutineNames,
        info: &'a MappingInformation,
    ) -> Self {
        Self {
            arena,
            config,
            names,
            info,
            types: TypeScope::new(arena, info.id),
        }
    }

    pub fn null_property(&self, path: &str) -> TokenStream {
        let (source, destination) = (self.info.source(), self.info.destination());
        quote!(return Err(::mapforge::MappingError::null_property(#source, #destination, #path)))
    }

    pub fn null_element(&self, path: &str) -> TokenStream {
        let (source, destination) = (self.info.source(), self.info.destination());
        quote!(return Err(::mapforge::MappingError::null_element(#source, #destination, #path)))
    }

    /// Name of the routine parameter bound to a helper parameter.
    pub fn parameter(&self, wanted: (&str, &TypeRef)) -> Result<Ident, BuildError> {
        let parameter = self
            .info
            .entry_parameters
            .iter()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| BuildError::MissingParameter(wanted.0.to_string()))?;

        parse_ident(&parameter.name)
    }

    /// Whether converting this slot can fail at runtime.
    pub fn slot_fallible(element: &ElementMapping) -> bool {
        matches!(element.strategy, Some(Strategy::Delegate(_))) || element.on_null == Some(NullPolicy::Guard)
    }

    pub fn strategy_async(&self, strategy: Option<&Strategy>) -> bool {
        match strategy {
            Some(Strategy::Delegate(call)) => call
                .target
                .and_then(|id| self.arena.get(id))
                .is_some_and(|target| target.is_async),
            Some(strategy) => strategy.is_async(),
            None => false,
        }
    }

    /// Convert the value at `access` through `strategy`. `raw` marks an
    /// access that still holds an `Option`. Returns the tokens and whether
    /// they produce an `Option`.
    pub fn convert(
        &mut self,
        strategy: Option<&Strategy>,
        access: &Access,
        value_type: bool,
        raw: bool,
    ) -> Result<(TokenStream, bool), BuildError> {
        let Some(strategy) = strategy else {
            return Ok((access.read(value_type), raw));
        };

        match strategy {
            Strategy::Method(call) => {
                let owner = self.types.path(&call.owner)?;
                let name = parse_ident(&call.name)?;
                let subject = subject(access, value_type, raw, call.subject.nullable);
                let arguments = call
                    .arguments
                    .iter()
                    .map(|a| self.parameter((&a.name, &a.ty)))
                    .collect::<Result<Vec<_>, _>>()?;
                let awaited = call.is_async.then(|| quote!(.await));

                Ok((
                    quote!(#owner::#name(#subject #(, #arguments)*)#awaited),
                    call.returns.nullable,
                ))
            }

            Strategy::Resolver(call) => {
                let instance = parse_ident(&call.instance)?;
                let input = self.types.ty(&call.source)?;
                let output = self.types.ty(&call.destination)?;
                let subject = subject(access, value_type, raw, call.source.nullable);
                let tokens = if call.is_async {
                    quote!(::mapforge::AsyncValueResolver::<#input, #output>::resolve(#instance, #subject).await)
                } else {
                    quote!(::mapforge::ValueResolver::<#input, #output>::resolve(#instance, #subject))
                };

                Ok((tokens, call.destination.nullable))
            }

            Strategy::Delegate(call) => {
                let target_id = call
                    .target
                    .ok_or_else(|| BuildError::UnboundDelegate(call.key.clone()))?;
                let target = self
                    .arena
                    .get(target_id)
                    .ok_or(BuildError::UnknownMapping(target_id))?;

                let routine = self.names.routine(target_id)?;
                let routine = if target_id == self.info.id {
                    quote!(#routine)
                } else {
                    quote!(super::#routine)
                };
                let arguments = target
                    .entry_parameters
                    .iter()
                    .map(|p| self.parameter(p.key()))
                    .collect::<Result<Vec<_>, _>>()?;
                let input = access.borrow();
                let call = quote!(#routine(#input #(, #arguments)*));

                let tokens = if target.is_async {
                    quote!(Box::pin(#call).await?)
                } else {
                    quote!(#call?)
                };

                Ok((tokens, false))
            }
        }
    }

    /// Value of one element slot, its null policy applied. `binding` names
    /// the unwrapped value; `filtered` is what a `Filter` policy evaluates to.
    pub fn slot(
        &mut self,
        element: &ElementMapping,
        access: &Access,
        binding: &Ident,
        filtered: Option<&TokenStream>,
        label: &str,
    ) -> Result<TokenStream, BuildError> {
        let destination_nullable = element.destination.nullable;

        let Some(policy) = element.on_null else {
            let raw = element.source.nullable;
            let (tokens, nullable) =
                self.convert(element.strategy.as_ref(), access, element.value_type, raw)?;
            return Ok(fit(tokens, nullable, destination_nullable));
        };

        let unwrapped = Access::Ref(binding.clone());
        let (tokens, nullable) =
            self.convert(element.strategy.as_ref(), &unwrapped, element.value_type, false)?;
        let value = fit(tokens, nullable, destination_nullable);

        let none = match policy {
            NullPolicy::Propagate => quote!(None),
            NullPolicy::Guard => self.null_element(label),
            NullPolicy::Default => quote!(Default::default()),
            NullPolicy::Filter => match filtered {
                Some(filtered) => filtered.clone(),
                None => quote!(Default::default()),
            },
        };
        let scrutinee = access.borrow();

        Ok(quote! {
            match #scrutinee {
                Some(#binding) => #value,
                None => #none,
            }
        })
    }

    pub fn entry_parameters(&mut self) -> Result<Vec<(Ident, TokenStream)>, BuildError> {
        let parameters: Vec<EntryParameter> = self.info.entry_parameters.clone();

        parameters
            .iter()
            .map(|p| Ok((parse_ident(&p.name)?, self.types.ty(&p.ty)?)))
            .collect()
    }
}

// Strategies declaring a nullable input get an `Option` even for a present value.
fn subject(access: &Access, value_type: bool, raw: bool, accepts_null: bool) -> TokenStream {
    if accepts_null && !raw {
        let value = access.read(value_type);
        quote!(&Some(#value))
    } else {
        access.borrow()
    }
}
