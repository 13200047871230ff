#![forbid(unsafe_code)]

mod derive;
mod upcast;

use crate::{
    derive::Surface,
    upcast::{string, Upcast},
};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use std::collections::BTreeSet;
use syn::{
    parse_macro_input, ConstParam, DeriveInput, ExprPath, GenericParam, Generics, ItemTrait,
    LifetimeParam, Path, TraitBound, TraitBoundModifier, TraitItem, TraitItemType, TypeParam,
    TypeParamBound,
};

#[rustversion::since(1.86)]
const UPCAST: bool = true;
#[rustversion::before(1.86)]
const UPCAST: bool = false;

const MARKERS: [&str; 4] = ["Send", "Sync", "Unpin", "Sized"];

/// Implements `observer_ptr::Supertype` for the annotated trait.
///
/// Arguments:
/// - marker traits (`Send`, `Sync`, ...) to add to the `dyn` type;
/// - `..` to implement every combination of the listed markers;
/// - `dyn` to also implement the upcasts between `dyn` types: dropping
///   markers and, on Rust 1.86 and later, converting to `dyn` supertraits.
///
/// The attribute may be repeated to request disjoint marker sets.
#[proc_macro_attribute]
pub fn upcast(
    attribute: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let upcast: Upcast = parse_macro_input!(attribute);
    let mut item: ItemTrait = parse_macro_input!(item);
    let mut upcasts = vec![upcast];
    let mut errors = Vec::new();
    item.attrs.retain(|attribute| match Upcast::try_from(attribute) {
        Ok(upcast) => {
            upcasts.push(upcast);
            false
        }
        Err(error) if is_upcast(attribute.path()) => {
            errors.push(error.to_compile_error());
            false
        }
        Err(_) => true,
    });
    let implementations = implement(&item, &upcasts);
    quote! { #item #(#errors)* #implementations }.into()
}

#[proc_macro_derive(Address, attributes(pointer))]
pub fn address(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = parse_macro_input!(input);
    derive::derive(&input, Surface::Address)
        .unwrap_or_else(|error| error.to_compile_error())
        .into()
}

#[proc_macro_derive(Arrow, attributes(pointer))]
pub fn arrow(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = parse_macro_input!(input);
    derive::derive(&input, Surface::Arrow)
        .unwrap_or_else(|error| error.to_compile_error())
        .into()
}

fn is_upcast(path: &Path) -> bool {
    path.segments
        .last()
        .is_some_and(|segment| segment.ident == "upcast")
}

struct Set<'a> {
    span: Span,
    key: BTreeSet<String>,
    markers: Vec<&'a ExprPath>,
}

fn implement(item: &ItemTrait, upcasts: &[Upcast]) -> TokenStream {
    let ItemTrait {
        ident,
        generics: Generics {
            params,
            where_clause,
            ..
        },
        supertraits,
        items,
        ..
    } = item;
    let parameters = params.iter().map(strip_default).collect::<Vec<_>>();
    let parameter_names = params
        .iter()
        .map(|parameter| match parameter {
            GenericParam::Lifetime(LifetimeParam { lifetime, .. }) => quote!(#lifetime),
            GenericParam::Type(TypeParam { ident, .. }) => quote!(#ident),
            GenericParam::Const(ConstParam { ident, .. }) => quote!(#ident),
        })
        .collect::<Vec<_>>();
    let associates = items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Type(TraitItemType {
                ident,
                generics: Generics { params, .. },
                ..
            }) if params.is_empty() => Some(ident),
            _ => None,
        })
        .collect::<Vec<_>>();
    let variables = associates
        .iter()
        .map(|associate| format_ident!("__{}__", associate))
        .collect::<Vec<_>>();
    let supers = supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(TraitBound {
                modifier: TraitBoundModifier::None,
                path,
                ..
            }) if !is_marker(path) => Some(path),
            _ => None,
        })
        .collect::<Vec<_>>();

    let mut sets: Vec<Set> = Vec::new();
    for upcast in upcasts {
        for markers in upcast.marker_sets() {
            let key = markers
                .iter()
                .map(|marker| string(*marker))
                .collect::<BTreeSet<_>>();
            if sets.iter().all(|set| set.key != key) {
                sets.push(Set {
                    span: upcast.span,
                    key,
                    markers,
                });
            }
        }
    }
    let dynamic = upcasts.iter().any(|upcast| upcast.dynamic);
    let (sets, supers) = (&sets, &supers);

    let concretes = sets.iter().map(|Set { span, markers, .. }| {
        quote_spanned!(*span =>
            #[automatically_derived]
            unsafe impl<'__life__, #(#parameters,)* __TConcrete__: #ident<#(#parameter_names,)*> #(+ #markers)* + '__life__> ::observer_ptr::Supertype<__TConcrete__> for dyn #ident<#(#parameter_names,)* #(#associates = __TConcrete__::#associates,)*> #(+ #markers)* + '__life__ #where_clause {
                #[inline(always)]
                fn upcast(from: ::core::ptr::NonNull<__TConcrete__>) -> ::core::ptr::NonNull<Self> {
                    from
                }
            }
        )
    });
    let source = |markers: &[&ExprPath]| {
        quote!(dyn #ident<#(#parameter_names,)* #(#associates = #variables,)*> #(+ #markers)* + '__life__)
    };
    let drops = sets
        .iter()
        .flat_map(move |from| sets.iter().map(move |to| (from, to)))
        .filter(|(from, to)| {
            dynamic && to.key.len() < from.key.len() && to.key.is_subset(&from.key)
        })
        .map(|(from, to)| {
            let span = to.span;
            let from = source(&from.markers);
            let to = source(&to.markers);
            quote_spanned!(span =>
                #[automatically_derived]
                #[allow(non_camel_case_types)]
                unsafe impl<'__life__, #(#parameters,)* #(#variables,)*> ::observer_ptr::Supertype<#from> for #to #where_clause {
                    #[inline(always)]
                    fn upcast(from: ::core::ptr::NonNull<#from>) -> ::core::ptr::NonNull<Self> {
                        from
                    }
                }
            )
        });
    let supertypes = sets
        .iter()
        .filter(|_| dynamic && UPCAST)
        .flat_map(move |set| supers.iter().map(move |path| (set, path)))
        .map(|(Set { span, markers, .. }, path)| {
            let from = source(markers);
            quote_spanned!(*span =>
                #[automatically_derived]
                #[allow(non_camel_case_types)]
                unsafe impl<'__life__, #(#parameters,)* #(#variables,)*> ::observer_ptr::Supertype<#from> for dyn #path #(+ #markers)* + '__life__ #where_clause {
                    #[inline(always)]
                    fn upcast(from: ::core::ptr::NonNull<#from>) -> ::core::ptr::NonNull<Self> {
                        from
                    }
                }
            )
        });
    quote! { #(#concretes)* #(#drops)* #(#supertypes)* }
}

fn strip_default(parameter: &GenericParam) -> GenericParam {
    let mut parameter = parameter.clone();
    match &mut parameter {
        GenericParam::Type(parameter) => {
            parameter.eq_token = None;
            parameter.default = None;
        }
        GenericParam::Const(parameter) => {
            parameter.eq_token = None;
            parameter.default = None;
        }
        GenericParam::Lifetime(_) => {}
    }
    parameter
}

fn is_marker(path: &Path) -> bool {
    path.segments
        .last()
        .is_some_and(|segment| MARKERS.iter().any(|marker| segment.ident == marker))
}

#[cfg(test)]
fn expand(item: ItemTrait, upcast: Upcast) -> String {
    implement(&item, &[upcast]).to_string()
}

#[test]
fn implements_one_set_without_arguments() {
    let output = expand(
        syn::parse_quote!(
            trait Shape {}
        ),
        Upcast::new(Span::call_site()),
    );
    assert_eq!(output.matches("unsafe impl").count(), 1);
    assert!(output.contains("Supertype < __TConcrete__ > for dyn Shape < > + '__life__"));
}

#[test]
fn implements_every_marker_combination() {
    let output = expand(
        syn::parse_quote!(
            trait Shape {}
        ),
        syn::parse_quote!(Send, Sync, ..),
    );
    assert_eq!(output.matches("unsafe impl").count(), 4);
    assert!(output.contains("for dyn Shape < > + Send + Sync + '__life__"));
}

#[test]
fn implements_marker_drops_when_dynamic() {
    let output = expand(
        syn::parse_quote!(
            trait Shape {}
        ),
        syn::parse_quote!(Send, Sync, .., dyn),
    );
    // 4 sets and 5 strict subset pairs.
    assert_eq!(output.matches("unsafe impl").count(), 9);
}

#[test]
fn binds_associated_types() {
    let output = expand(
        syn::parse_quote!(
            trait Source<T = u8> {
                type Item;
            }
        ),
        syn::parse_quote!(Send, dyn),
    );
    assert!(output.contains("Item = __TConcrete__ :: Item"));
    assert!(!output.contains("= u8"));
}

#[test]
fn ignores_marker_supertraits() {
    let item: ItemTrait = syn::parse_quote!(
        trait Shape: Send + Sync + core::fmt::Debug {}
    );
    let output = expand(item, syn::parse_quote!(dyn));
    let supers = if UPCAST { 1 } else { 0 };
    assert_eq!(output.matches("unsafe impl").count(), 1 + supers);
    assert_eq!(output.contains("for dyn core :: fmt :: Debug"), UPCAST);
}

#[test]
fn deduplicates_marker_sets() {
    let item: ItemTrait = syn::parse_quote!(
        trait Shape {}
    );
    let first: Upcast = syn::parse_quote!(Send, Sync);
    let second: Upcast = syn::parse_quote!(Sync, Send);
    let output = implement(&item, &[first, second]).to_string();
    assert_eq!(output.matches("unsafe impl").count(), 1);
}
