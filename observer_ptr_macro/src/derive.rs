use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    parse_quote, Data, DataEnum, DataStruct, DataUnion, DeriveInput, Error, Field, Fields, Ident,
    Index, Member,
};

/// The crate trait being derived.
#[derive(Clone, Copy)]
pub enum Surface {
    Address,
    Arrow,
}

impl Surface {
    fn names(self) -> (Ident, Ident) {
        let (name, method) = match self {
            Surface::Address => ("Address", "address"),
            Surface::Arrow => ("Arrow", "arrow"),
        };
        (
            Ident::new(name, Span::call_site()),
            Ident::new(method, Span::call_site()),
        )
    }
}

/// Implements `Surface<P>` for the input by delegating to its pointer field,
/// for every `P` that the field itself supports.
pub fn derive(input: &DeriveInput, surface: Surface) -> syn::Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = input;
    let fields = match data {
        Data::Struct(DataStruct { fields, .. }) => fields,
        Data::Enum(DataEnum { enum_token, .. }) => {
            return Err(Error::new_spanned(enum_token, "expected a struct"));
        }
        Data::Union(DataUnion { union_token, .. }) => {
            return Err(Error::new_spanned(union_token, "expected a struct"));
        }
    };
    let (member, Field { ty, .. }) = pointer_field(ident, fields)?;
    let (name, method) = surface.names();
    let pointee = Ident::new("__Pointee__", Span::call_site());

    let mut extended = generics.clone();
    extended.params.push(parse_quote!(#pointee: ?Sized));
    extended
        .make_where_clause()
        .predicates
        .push(parse_quote!(#ty: ::observer_ptr::#name<#pointee>));
    let (implement, _, where_clause) = extended.split_for_impl();
    let (_, arguments, _) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #implement ::observer_ptr::#name<#pointee> for #ident #arguments #where_clause {
            #[inline(always)]
            fn #method(&self) -> *const #pointee {
                ::observer_ptr::#name::<#pointee>::#method(&self.#member)
            }
        }
    })
}

fn pointer_field<'a>(ident: &Ident, fields: &'a Fields) -> syn::Result<(Member, &'a Field)> {
    let member = |index: usize, field: &Field| match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(Index::from(index)),
    };
    let marked = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| {
            field
                .attrs
                .iter()
                .any(|attribute| attribute.path().is_ident("pointer"))
        })
        .collect::<Vec<_>>();

    match (marked.as_slice(), fields.len()) {
        ([(index, field)], _) => Ok((member(*index, field), field)),
        ([], 1) => {
            let field = fields.iter().next().ok_or_else(|| missing(ident))?;
            Ok((member(0, field), field))
        }
        ([], _) => Err(missing(ident)),
        ([_, (_, field), ..], _) => Err(Error::new_spanned(
            field,
            "only one field can be marked with `#[pointer]`",
        )),
    }
}

fn missing(ident: &Ident) -> Error {
    Error::new_spanned(
        ident,
        format!("`{ident}` must have a single field or a field marked with `#[pointer]`"),
    )
}

#[test]
fn delegates_to_the_only_field() {
    let input: DeriveInput = parse_quote!(
        struct Shared<T>(Rc<T>);
    );
    let output = derive(&input, Surface::Address).map(|tokens| tokens.to_string());
    let output = output.unwrap_or_default();
    assert!(output.contains("Address < __Pointee__ > for Shared < T >"));
    assert!(output.contains("Rc < T > : :: observer_ptr :: Address < __Pointee__ >"));
    assert!(output.contains("(& self . 0)"));
}

#[test]
fn delegates_to_the_marked_field() {
    let input: DeriveInput = parse_quote!(
        struct Tagged<'a, T: ?Sized> {
            tag: u8,
            #[pointer]
            value: &'a T,
        }
    );
    let output = derive(&input, Surface::Arrow).map(|tokens| tokens.to_string());
    let output = output.unwrap_or_default();
    assert!(output.contains("fn arrow (& self) -> * const __Pointee__"));
    assert!(output.contains("(& self . value)"));
}

#[test]
fn rejects_ambiguous_fields() {
    let input: DeriveInput = parse_quote!(
        struct Pair(Box<u8>, Box<u8>);
    );
    assert!(derive(&input, Surface::Address).is_err());
    let input: DeriveInput = parse_quote!(
        struct Pair(#[pointer] Box<u8>, #[pointer] Box<u8>);
    );
    assert!(derive(&input, Surface::Address).is_err());
}

#[test]
fn rejects_enums() {
    let input: DeriveInput = parse_quote!(
        enum Either {
            Left(Box<u8>),
        }
    );
    assert!(derive(&input, Surface::Arrow).is_err());
}
