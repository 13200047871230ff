//! The [`Supertype<T>`] relation and the provided upcasts for common `core`
//! and `std` traits.
//!
//! Rust has no inheritance, so a pointer to a "derived" type converts to a
//! pointer to a "base" type only through unsizing. [`Supertype<T>`] names the
//! conversions an [`Observer<T>`](crate::Observer) is allowed to make:
//! - every type is a supertype of itself;
//! - `dyn Trait` is a supertype of every `T: Trait`;
//! - `dyn Trait` is a supertype of `dyn Trait + Send` (and of any other
//!   marker combination that includes its own markers);
//! - with the `#[upcast(dyn)]` attribute, `dyn Super` is a supertype of `dyn
//!   Trait` for each supertrait `Super` of `Trait`.
//!
//! ```
//! use core::fmt::Debug;
//! use observer_ptr::Observer;
//!
//! let value = 7u8;
//! let observer = Observer::new(&value).upcast::<dyn Debug>();
//! assert_eq!(format!("{:?}", unsafe { observer.borrow() }), "7");
//! ```

use core::ptr::NonNull;

/// A type that a pointer to `T` can be converted to without a cast.
///
/// # Safety
/// [`Supertype::upcast`] must return a pointer to the same object that it was
/// given, with metadata valid for `Self`. The implementations provided by
/// this crate and by the `#[upcast]` attribute are plain unsizing
/// coercions.
pub unsafe trait Supertype<T: ?Sized> {
    fn upcast(from: NonNull<T>) -> NonNull<Self>;
}

unsafe impl<T: ?Sized> Supertype<T> for T {
    #[inline(always)]
    fn upcast(from: NonNull<T>) -> NonNull<Self> {
        from
    }
}

mod implement {
    use super::Supertype;
    use core::ptr::NonNull;

    macro_rules! upcast_ty {
        (use: $use: path, trait: $trait: ident, generics: ($($generic: ident),*), associates: ($($associate: ident),*)) => {
            const _: () = {
                use $use;

                upcast_ty!(@CONCRETE { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), markers: () });
                upcast_ty!(@CONCRETE { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), markers: (Send) });
                upcast_ty!(@CONCRETE { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), markers: (Sync) });
                upcast_ty!(@CONCRETE { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), markers: (Send, Sync) });
                upcast_ty!(@DYNAMIC { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), from: (Send), to: () });
                upcast_ty!(@DYNAMIC { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), from: (Sync), to: () });
                upcast_ty!(@DYNAMIC { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), from: (Send, Sync), to: () });
                upcast_ty!(@DYNAMIC { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), from: (Send, Sync), to: (Send) });
                upcast_ty!(@DYNAMIC { trait: $trait, generics: ($($generic),*), associates: ($($associate),*), from: (Send, Sync), to: (Sync) });
            };
        };
        (@CONCRETE { trait: $trait: ident, generics: ($($generic: ident),*), associates: ($($associate: ident),*), markers: ($($marker: path),*) }) => {
            #[automatically_derived]
            #[allow(unused_parens)]
            unsafe impl<'life, $($generic: ?Sized,)* TConcrete: $trait<$($generic),*> $(+ $marker)* + 'life> Supertype<TConcrete>
                for dyn $trait<$($generic,)* $($associate = TConcrete::$associate,)*> $(+ $marker)* + 'life
            {
                #[inline(always)]
                fn upcast(from: NonNull<TConcrete>) -> NonNull<Self> {
                    from
                }
            }
        };
        (@DYNAMIC { trait: $trait: ident, generics: ($($generic: ident),*), associates: ($($associate: ident),*), from: ($($from: path),*), to: ($($to: path),*) }) => {
            #[automatically_derived]
            #[allow(non_camel_case_types, unused_parens)]
            unsafe impl<'life, $($generic: ?Sized,)* $($associate,)*> Supertype<dyn $trait<$($generic,)* $($associate = $associate,)*> $(+ $from)* + 'life>
                for dyn $trait<$($generic,)* $($associate = $associate,)*> $(+ $to)* + 'life
            {
                #[inline(always)]
                fn upcast(from: NonNull<dyn $trait<$($generic,)* $($associate = $associate,)*> $(+ $from)* + 'life>) -> NonNull<Self> {
                    from
                }
            }
        };
    }

    macro_rules! upcast_fn {
        ($function: ident($(,)?) -> $return: ident) => {
            upcast_fn!(@ARITY { function: $function, parameters: (), return: $return });
        };
        ($function: ident($parameter: ident $(, $parameters: ident)* $(,)?) -> $return: ident) => {
            upcast_fn!($function($($parameters),*) -> $return);
            upcast_fn!(@ARITY { function: $function, parameters: ($parameter $(, $parameters)*), return: $return });
        };
        (@ARITY { function: $function: ident, parameters: $parameters: tt, return: $return: ident }) => {
            upcast_fn!(@CONCRETE { function: $function, parameters: $parameters, return: $return, markers: () });
            upcast_fn!(@CONCRETE { function: $function, parameters: $parameters, return: $return, markers: (Send) });
            upcast_fn!(@CONCRETE { function: $function, parameters: $parameters, return: $return, markers: (Sync) });
            upcast_fn!(@CONCRETE { function: $function, parameters: $parameters, return: $return, markers: (Send, Sync) });
            upcast_fn!(@DYNAMIC { function: $function, parameters: $parameters, return: $return, from: (Send), to: () });
            upcast_fn!(@DYNAMIC { function: $function, parameters: $parameters, return: $return, from: (Sync), to: () });
            upcast_fn!(@DYNAMIC { function: $function, parameters: $parameters, return: $return, from: (Send, Sync), to: () });
            upcast_fn!(@DYNAMIC { function: $function, parameters: $parameters, return: $return, from: (Send, Sync), to: (Send) });
            upcast_fn!(@DYNAMIC { function: $function, parameters: $parameters, return: $return, from: (Send, Sync), to: (Sync) });
        };
        (@CONCRETE { function: $function: ident, parameters: ($($parameter: ident),*), return: $return: ident, markers: ($($marker: path),*) }) => {
            #[automatically_derived]
            #[allow(unused_parens)]
            unsafe impl<'life, $($parameter,)* $return, TConcrete: $function($($parameter),*) -> $return $(+ $marker)* + 'life> Supertype<TConcrete>
                for dyn $function($($parameter),*) -> $return $(+ $marker)* + 'life
            {
                #[inline(always)]
                fn upcast(from: NonNull<TConcrete>) -> NonNull<Self> {
                    from
                }
            }
        };
        (@DYNAMIC { function: $function: ident, parameters: ($($parameter: ident),*), return: $return: ident, from: ($($from: path),*), to: ($($to: path),*) }) => {
            #[automatically_derived]
            #[allow(unused_parens)]
            unsafe impl<'life, $($parameter,)* $return> Supertype<dyn $function($($parameter),*) -> $return $(+ $from)* + 'life>
                for dyn $function($($parameter),*) -> $return $(+ $to)* + 'life
            {
                #[inline(always)]
                fn upcast(from: NonNull<dyn $function($($parameter),*) -> $return $(+ $from)* + 'life>) -> NonNull<Self> {
                    from
                }
            }
        };
    }

    upcast_ty! { use: ::core::borrow::Borrow, trait: Borrow, generics: (T), associates: () }
    upcast_ty! { use: ::core::convert::AsRef, trait: AsRef, generics: (T), associates: () }
    upcast_ty! { use: ::core::future::Future, trait: Future, generics: (), associates: (Output) }
    upcast_ty! { use: ::core::hash::Hasher, trait: Hasher, generics: (), associates: () }
    upcast_ty! { use: ::core::iter::Iterator, trait: Iterator, generics: (), associates: (Item) }
    upcast_ty! { use: ::core::iter::DoubleEndedIterator, trait: DoubleEndedIterator, generics: (), associates: (Item) }
    upcast_ty! { use: ::core::iter::ExactSizeIterator, trait: ExactSizeIterator, generics: (), associates: (Item) }

    #[rustversion::since(1.81.0)]
    upcast_ty! { use: ::core::error::Error, trait: Error, generics: (), associates: () }

    #[cfg(feature = "std")]
    #[rustversion::before(1.81.0)]
    upcast_ty! { use: ::std::error::Error, trait: Error, generics: (), associates: () }

    upcast_ty! { use: ::core::fmt::Debug, trait: Debug, generics: (), associates: () }
    upcast_ty! { use: ::core::fmt::Display, trait: Display, generics: (), associates: () }
    upcast_ty! { use: ::core::fmt::Write, trait: Write, generics: (), associates: () }

    #[cfg(feature = "std")]
    const _: () = {
        upcast_ty! { use: ::std::io::Read, trait: Read, generics: (), associates: () }
        upcast_ty! { use: ::std::io::Write, trait: Write, generics: (), associates: () }
        upcast_ty! { use: ::std::string::ToString, trait: ToString, generics: (), associates: () }
    };

    // `dyn Any` can not be shortened below `'static`.
    const _: () = {
        use core::any::Any;

        macro_rules! upcast_any {
            ($($marker: path),*) => {
                #[allow(unused_parens)]
                unsafe impl<TConcrete: Any $(+ $marker)*> Supertype<TConcrete> for dyn Any $(+ $marker)* {
                    #[inline(always)]
                    fn upcast(from: NonNull<TConcrete>) -> NonNull<Self> {
                        from
                    }
                }
            };
            ($($from: path),* => $($to: path),*) => {
                #[allow(unused_parens)]
                unsafe impl Supertype<dyn Any $(+ $from)*> for dyn Any $(+ $to)* {
                    #[inline(always)]
                    fn upcast(from: NonNull<dyn Any $(+ $from)*>) -> NonNull<Self> {
                        from
                    }
                }
            };
        }

        upcast_any!();
        upcast_any!(Send);
        upcast_any!(Sync);
        upcast_any!(Send, Sync);
        upcast_any!(Send =>);
        upcast_any!(Sync =>);
        upcast_any!(Send, Sync =>);
        upcast_any!(Send, Sync => Send);
        upcast_any!(Send, Sync => Sync);
    };

    upcast_fn!(Fn(T0, T1, T2, T3, T4, T5) -> T);
    upcast_fn!(FnMut(T0, T1, T2, T3, T4, T5) -> T);
    upcast_fn!(FnOnce(T0, T1, T2, T3, T4, T5) -> T);
}
