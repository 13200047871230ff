use core::mem::replace;
use proc_macro2::Span;
use quote::ToTokens;
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    token::Comma,
    Attribute, Error, Expr, ExprPath, ExprRange, Ident, Meta, Path, PathSegment, RangeLimits, Token,
};

/// The arguments of one `#[upcast(...)]` attribute.
#[derive(Clone)]
pub struct Upcast {
    pub span: Span,
    pub dynamic: bool,
    pub combine: bool,
    pub markers: Vec<ExprPath>,
}

impl Parse for Upcast {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        const DYNAMIC: [&str; 2] = ["self", "Self"];
        let mut upcast = Upcast::new(input.span());
        while !input.is_empty() {
            if input.peek(Token![dyn]) {
                input.parse::<Token![dyn]>()?;
                upcast.dynamic = true;
            } else {
                match input.parse::<Expr>()? {
                    Expr::Path(ExprPath { path, .. })
                        if DYNAMIC.iter().any(|name| path.is_ident(name)) =>
                    {
                        upcast.dynamic = true;
                    }
                    Expr::Range(ExprRange {
                        start: None,
                        end: None,
                        limits: RangeLimits::HalfOpen(_),
                        ..
                    }) => upcast.combine = true,
                    Expr::Path(path) => upcast.markers.push(path),
                    expression => {
                        return Err(error(expression, |key| {
                            format!("invalid argument '{key}'\nexpected a marker trait, `dyn` or `..`")
                        }));
                    }
                }
            }
            if !input.is_empty() {
                input.parse::<Comma>()?;
            }
        }
        Ok(upcast)
    }
}

impl Upcast {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            dynamic: false,
            combine: false,
            markers: Vec::new(),
        }
    }

    /// The marker sets requested by this attribute: every subset of the
    /// markers with `..`, the markers as a single set otherwise.
    pub fn marker_sets(&self) -> Vec<Vec<&ExprPath>> {
        if self.combine {
            subsets(&self.markers)
        } else {
            vec![self.markers.iter().collect()]
        }
    }

    pub fn try_from(value: &Attribute) -> Result<Self, Error> {
        const PATHS: [&[&str]; 2] = [&["observer_ptr", "upcast"], &["upcast"]];

        let path = value.path();
        if PATHS.into_iter().any(|legal| idents(path).eq(legal)) {
            if matches!(value.meta, Meta::Path(_)) {
                Ok(Upcast::new(value.span()))
            } else {
                value.meta.require_list()?.parse_args()
            }
        } else {
            Err(error(path, |path| {
                let paths = PATHS.into_iter().map(|path| join("::", path));
                format!(
                    "invalid attribute path '{path}'\nmust be one of [{}]",
                    join(", ", paths)
                )
            }))
        }
    }
}

pub fn string<T: ToTokens>(tokens: &T) -> String {
    tokens.to_token_stream().to_string()
}

pub fn error<T: ToTokens>(tokens: T, format: impl FnOnce(String) -> String) -> Error {
    let message = format(string(&tokens));
    Error::new_spanned(tokens, message)
}

fn idents(path: &Path) -> impl Iterator<Item = &Ident> {
    path.segments.iter().map(|PathSegment { ident, .. }| ident)
}

fn join<S: AsRef<str>, I: AsRef<str>>(separator: S, items: impl IntoIterator<Item = I>) -> String {
    let mut buffer = String::new();
    let mut join = false;
    let separator = separator.as_ref();
    for item in items {
        if replace(&mut join, true) {
            buffer.push_str(separator);
        }
        buffer.push_str(item.as_ref());
    }
    buffer
}

/// Every subset of `items`, ordered by size then by position.
pub fn subsets<T>(items: &[T]) -> Vec<Vec<&T>> {
    let mut groups = (0u32..1 << items.len())
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << index) != 0)
                .map(|(_, item)| item)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    groups.sort_by_key(Vec::len);
    groups
}

#[test]
fn produces_all_subsets() {
    assert_eq!(subsets::<usize>(&[]), vec![vec![&0usize; 0]]);
    assert_eq!(subsets(&['a']), vec![vec![], vec![&'a']]);
    assert_eq!(
        subsets(&['a', 'b']),
        vec![vec![], vec![&'a'], vec![&'b'], vec![&'a', &'b']]
    );
    assert_eq!(
        subsets(&['a', 'b', 'c']),
        vec![
            vec![],
            vec![&'a'],
            vec![&'b'],
            vec![&'c'],
            vec![&'a', &'b'],
            vec![&'a', &'c'],
            vec![&'b', &'c'],
            vec![&'a', &'b', &'c'],
        ]
    );
}

#[test]
fn parses_markers_and_flags() {
    let upcast: Upcast = syn::parse_quote!(Send, dyn, Sync, ..);
    assert!(upcast.dynamic);
    assert!(upcast.combine);
    assert_eq!(
        upcast.markers.iter().map(string).collect::<Vec<_>>(),
        ["Send", "Sync"]
    );
    assert_eq!(upcast.marker_sets().len(), 4);
}

#[test]
fn rejects_invalid_arguments() {
    assert!(syn::parse_str::<Upcast>("Send, 1 + 2").is_err());
}

#[test]
fn rejects_unknown_attribute_paths() {
    let attribute: Attribute = syn::parse_quote!(#[other(Send)]);
    assert!(Upcast::try_from(&attribute).is_err());
    let attribute: Attribute = syn::parse_quote!(#[observer_ptr::upcast(Send)]);
    assert!(Upcast::try_from(&attribute).is_ok());
}
