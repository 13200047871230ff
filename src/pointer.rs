//! The pointer-like surface that an [`Observer<T>`](crate::Observer) can be
//! built from.
//!
//! A type is pointer-like when it exposes three operations that all agree on
//! the same pointee `T`:
//! - an address accessor, [`Address<T>`];
//! - a dereference, [`Deref<Target = T>`](Deref);
//! - an arrow-style member access, [`Arrow<T>`].
//!
//! The [`Pointer`] trait is implemented for every type that has all three
//! in agreement and for no other type. Exposing only some of them, or
//! exposing them for different pointees, is not enough.
//!
//! The surface is already provided for references, [`Ref`], [`RefMut`] and,
//! with the `std` feature, for [`Box`], [`Rc`] and [`Arc`]. [`Pin`] is covered
//! for each of these pointers whose dereference can not fail; a pinned custom
//! pointer is not, since reaching its address would go through `Deref`.
//! Custom pointer types can use `#[derive(Address, Arrow)]` to delegate to
//! a wrapped pointer.
//!
//! [`Box`]: std::boxed::Box
//! [`Rc`]: std::rc::Rc
//! [`Arc`]: std::sync::Arc

use core::{
    cell::{Ref, RefMut},
    ops::Deref,
    pin::Pin,
};

/// The address accessor of a pointer-like type.
///
/// The returned location may be null for pointer types that have an empty
/// state.
pub trait Address<T: ?Sized> {
    fn address(&self) -> *const T;
}

/// The arrow-style member access of a pointer-like type.
///
/// Must return the same location as [`Address::address`] for the same
/// pointee, null included.
pub trait Arrow<T: ?Sized> {
    fn arrow(&self) -> *const T;
}

/// A type whose [`Address`], [`Deref`] and [`Arrow`] operations exist and all
/// refer to `Self::Target`.
///
/// This trait can not be implemented manually; it holds exactly when the
/// three operations are consistent.
pub trait Pointer: Deref + Address<<Self as Deref>::Target> + Arrow<<Self as Deref>::Target> {}

impl<P> Pointer for P where P: Deref + Address<P::Target> + Arrow<P::Target> + ?Sized {}

macro_rules! surface {
    ($([$($generics: tt)*] $type: ty => $target: ty, |$this: ident| $address: expr;)*) => {
        $(
            impl<$($generics)*> Address<$target> for $type {
                #[inline(always)]
                fn address(&self) -> *const $target {
                    let $this = self;
                    $address
                }
            }

            impl<$($generics)*> Arrow<$target> for $type {
                #[inline(always)]
                fn arrow(&self) -> *const $target {
                    let $this = self;
                    $address
                }
            }
        )*
    };
}

surface! {
    ['a, T: ?Sized] &'a T => T, |this| *this;
    ['a, T: ?Sized] &'a mut T => T, |this| &**this;
    ['a, T: ?Sized] Ref<'a, T> => T, |this| &**this;
    ['a, T: ?Sized] RefMut<'a, T> => T, |this| &**this;
    ['a, T: ?Sized] Pin<&'a T> => T, |this| &**this;
    ['a, T: ?Sized] Pin<&'a mut T> => T, |this| &**this;
}

#[cfg(feature = "std")]
surface! {
    [T: ?Sized] std::boxed::Box<T> => T, |this| &**this;
    [T: ?Sized] std::rc::Rc<T> => T, |this| std::rc::Rc::as_ptr(this);
    [T: ?Sized] std::sync::Arc<T> => T, |this| std::sync::Arc::as_ptr(this);
    [T: ?Sized] Pin<std::boxed::Box<T>> => T, |this| &**this;
    [T: ?Sized] Pin<std::rc::Rc<T>> => T, |this| &**this;
    [T: ?Sized] Pin<std::sync::Arc<T>> => T, |this| &**this;
}
