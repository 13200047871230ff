//! Compile-time boolean queries over arbitrary types.
//!
//! [`satisfies!`](crate::satisfies) and [`convertible!`](crate::convertible)
//! turn the [`Pointer`] and [`Supertype`] bounds into `const bool` values.
//! They can be asked about any concrete type, including primitives, unsized
//! types and types with no trait implementations at all: an unsatisfied bound
//! evaluates to `false` instead of failing to compile.
//!
//! The inherent constants of [`Probe`] only exist when their bounds hold;
//! otherwise name resolution falls back to the constants of [`Fallback`].
//! This resolution happens where the macro is expanded, so the queries answer
//! for the concrete type written at the call site; inside a generic function,
//! a type parameter is only seen through its declared bounds.

use crate::{pointer::Pointer, upcast::Supertype};
use core::marker::PhantomData;

#[doc(hidden)]
pub struct Probe<P: ?Sized, T: ?Sized = P>(PhantomData<(*const P, *const T)>);

#[doc(hidden)]
pub trait Fallback {
    const POINTER: bool = false;
    const CONVERTIBLE: bool = false;
}

impl<P: ?Sized, T: ?Sized> Fallback for Probe<P, T> {}

impl<P: Pointer + ?Sized, T: ?Sized> Probe<P, T> {
    pub const POINTER: bool = true;
}

impl<P: Pointer + ?Sized, T: Supertype<P::Target> + ?Sized> Probe<P, T> {
    pub const CONVERTIBLE: bool = true;
}

/// Evaluates to `true` if the type exposes a consistent pointer-like surface
/// (see [`Pointer`](crate::Pointer)), `false` otherwise.
///
/// ```
/// use core::mem::ManuallyDrop;
/// use observer_ptr::satisfies;
/// use std::rc::Rc;
///
/// const _: () = assert!(satisfies!(Rc<u8>));
/// const _: () = assert!(satisfies!(&str));
/// const _: () = assert!(!satisfies!(u8));
/// const _: () = assert!(!satisfies!(ManuallyDrop<Box<u8>>));
/// ```
#[macro_export]
macro_rules! satisfies {
    ($type: ty) => {{
        #[allow(unused_imports)]
        use $crate::probe::Fallback as _;
        <$crate::probe::Probe<$type>>::POINTER
    }};
}

/// Evaluates to `true` if an [`Observer<T>`](crate::Observer) can be built
/// from a reference to the pointer type, `false` otherwise.
///
/// ```
/// use core::fmt::Debug;
/// use observer_ptr::convertible;
///
/// const _: () = assert!(convertible!(Box<u8> => u8));
/// const _: () = assert!(convertible!(Box<u8> => dyn Debug));
/// const _: () = assert!(!convertible!(Box<u8> => u16));
/// const _: () = assert!(!convertible!(u8 => u8));
/// ```
#[macro_export]
macro_rules! convertible {
    ($pointer: ty => $target: ty) => {{
        #[allow(unused_imports)]
        use $crate::probe::Fallback as _;
        <$crate::probe::Probe<$pointer, $target>>::CONVERTIBLE
    }};
}
