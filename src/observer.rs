//! The non-owning [`Observer<T>`] handle.

use crate::{
    pointer::{Address, Arrow, Pointer},
    upcast::Supertype,
};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    mem,
    ptr::{self, NonNull},
};

/// A copyable, comparable and hashable address of a `T` that never owns it.
///
/// An [`Observer<T>`] is a zero-cost stand-in for a raw pointer parameter: it
/// is either empty or holds the address of a `T` whose lifetime is managed
/// elsewhere. It can be built from a raw address, a reference, another
/// observer of a subtype (see [`Observer::upcast`]) or from any type whose
/// [`Address`], [`Deref`](core::ops::Deref) and [`Arrow`] operations agree on
/// a pointee (see [`Pointer`]).
///
/// Equality, ordering and hashing only consider the data address; pointer
/// metadata (slice length, vtable) is ignored.
///
/// ```
/// use observer_ptr::Observer;
/// use std::rc::Rc;
///
/// fn show(observer: impl Into<Observer<i32>>) -> String {
///     let observer = observer.into();
///     if observer.is_null() {
///         "(null)".into()
///     } else {
///         unsafe { observer.borrow() }.to_string()
///     }
/// }
///
/// let value = 42;
/// let shared = Rc::new(123);
/// let unique = Box::new(456);
/// assert_eq!(show(Observer::null()), "(null)");
/// assert_eq!(show(&value as *const i32), "42");
/// assert_eq!(show(&shared), "123");
/// assert_eq!(show(&unique), "456");
/// ```
#[repr(transparent)]
pub struct Observer<T: ?Sized>(Option<NonNull<T>>);

unsafe impl<T: ?Sized + Sync> Send for Observer<T> {}
unsafe impl<T: ?Sized + Sync> Sync for Observer<T> {}

impl<T: ?Sized> Observer<T> {
    /// An empty observer.
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub const fn new(value: &T) -> Self {
        // # Safety
        // The pointer is trivially non-null as per rust's reference guarantees.
        Self(Some(unsafe {
            NonNull::new_unchecked(value as *const T as *mut T)
        }))
    }

    /// Observes the pointee of any pointer-like type.
    ///
    /// The only work done is reading [`Address::address`]; the pointee is
    /// neither validated nor dereferenced. A null address yields an empty
    /// observer.
    #[inline]
    pub fn of<P: Pointer + ?Sized>(pointer: &P) -> Self
    where
        T: Supertype<P::Target>,
    {
        Observer::from_ptr(pointer.address()).upcast()
    }

    #[inline]
    pub fn from_ptr(pointer: *const T) -> Self {
        Self(NonNull::new(pointer.cast_mut()))
    }

    #[inline]
    pub const fn from_non_null(pointer: Option<NonNull<T>>) -> Self {
        Self(pointer)
    }

    /// Returns the stored address, [`None`] if this observer is empty.
    #[inline]
    pub const fn get(&self) -> Option<NonNull<T>> {
        self.0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the stored address for member access.
    ///
    /// # Panics
    /// Panics if this observer is empty.
    #[inline]
    #[track_caller]
    pub fn pointee(&self) -> NonNull<T> {
        match self.0 {
            Some(pointer) => pointer,
            None => empty_panic(),
        }
    }

    /// # Safety
    /// The caller must ensure that the observed `T` is still alive and that
    /// it is not mutated for the lifetime of the returned reference. The
    /// [`Observer<T>`] does not track the pointee's lifetime; dereferencing
    /// a dangling observer is undefined behavior.
    ///
    /// # Panics
    /// Panics if this observer is empty.
    #[inline]
    #[track_caller]
    pub unsafe fn borrow(&self) -> &T {
        unsafe { self.pointee().as_ref() }
    }

    /// # Safety
    /// In addition to the requirements of [`Observer::borrow`], the observed
    /// address must have been obtained from a mutable access (`&mut T`,
    /// `*mut T` or an owner), and no other reference to the `T` may be alive
    /// for the lifetime of the returned reference, including those obtained
    /// through copies of this observer.
    ///
    /// # Panics
    /// Panics if this observer is empty.
    #[inline]
    #[track_caller]
    pub unsafe fn borrow_mut(&mut self) -> &mut T {
        unsafe { self.pointee().as_mut() }
    }

    /// Empties this observer. The previously observed `T` is not affected.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// Observes the address of `observer` instead and returns the previous
    /// observer.
    #[inline]
    pub fn replace(&mut self, observer: impl Into<Self>) -> Self {
        mem::replace(self, observer.into())
    }

    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other)
    }

    /// Converts to an observer of a supertype while keeping the same
    /// address.
    ///
    /// ```
    /// use core::fmt::Display;
    /// use observer_ptr::Observer;
    ///
    /// static VALUE: char = 'a';
    ///
    /// let narrow = Observer::new(&VALUE);
    /// let wide = narrow.upcast::<dyn Display>();
    /// assert_eq!(wide, Observer::new(&VALUE as &dyn Display));
    /// assert_eq!(unsafe { wide.borrow() }.to_string(), "a");
    /// ```
    #[inline]
    pub fn upcast<S: Supertype<T> + ?Sized>(self) -> Observer<S> {
        Observer(self.0.map(S::upcast))
    }

    #[inline]
    fn thin(&self) -> *const () {
        match self.0 {
            Some(pointer) => pointer.as_ptr() as *const (),
            None => ptr::null(),
        }
    }
}

impl<T> Observer<T> {
    /// Returns the stored address, null if this observer is empty.
    #[inline]
    pub const fn as_ptr(&self) -> *const T {
        match self.0 {
            Some(pointer) => pointer.as_ptr().cast_const(),
            None => ptr::null(),
        }
    }

    /// Returns the stored address, null if this observer is empty.
    #[inline]
    pub const fn as_mut_ptr(&self) -> *mut T {
        match self.0 {
            Some(pointer) => pointer.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

#[cold]
#[track_caller]
fn empty_panic() -> ! {
    panic!("an empty `Observer<T>` can not be dereferenced")
}

impl<T: ?Sized> Clone for Observer<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Observer<T> {}

impl<T: ?Sized> Default for Observer<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> PartialEq for Observer<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.thin() == other.thin()
    }
}

impl<T: ?Sized> Eq for Observer<T> {}

impl<T: ?Sized> PartialOrd for Observer<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for Observer<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.thin().cmp(&other.thin())
    }
}

impl<T: ?Sized> Hash for Observer<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.thin().hash(state)
    }
}

impl<T: ?Sized> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observer").field(&self.thin()).finish()
    }
}

impl<T: ?Sized> fmt::Pointer for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.thin(), f)
    }
}

impl<T: Sized> Address<T> for Observer<T> {
    #[inline(always)]
    fn address(&self) -> *const T {
        self.as_ptr()
    }
}

impl<T: Sized> Arrow<T> for Observer<T> {
    #[inline(always)]
    fn arrow(&self) -> *const T {
        self.as_ptr()
    }
}

impl<'a, T: ?Sized, P: Pointer + ?Sized> From<&'a P> for Observer<T>
where
    T: Supertype<P::Target>,
{
    #[inline]
    fn from(pointer: &'a P) -> Self {
        Self::of(pointer)
    }
}

impl<T: ?Sized> From<*const T> for Observer<T> {
    #[inline]
    fn from(pointer: *const T) -> Self {
        Self::from_ptr(pointer)
    }
}

impl<T: ?Sized> From<*mut T> for Observer<T> {
    #[inline]
    fn from(pointer: *mut T) -> Self {
        Self(NonNull::new(pointer))
    }
}

impl<T: ?Sized> From<NonNull<T>> for Observer<T> {
    #[inline]
    fn from(pointer: NonNull<T>) -> Self {
        Self(Some(pointer))
    }
}

impl<T: ?Sized> From<Option<NonNull<T>>> for Observer<T> {
    #[inline]
    fn from(pointer: Option<NonNull<T>>) -> Self {
        Self(pointer)
    }
}

impl<T: ?Sized> From<Observer<T>> for Option<NonNull<T>> {
    #[inline]
    fn from(observer: Observer<T>) -> Self {
        observer.0
    }
}

impl<T> From<Observer<T>> for *const T {
    #[inline]
    fn from(observer: Observer<T>) -> Self {
        observer.as_ptr()
    }
}

impl<T> From<Observer<T>> for *mut T {
    #[inline]
    fn from(observer: Observer<T>) -> Self {
        observer.as_mut_ptr()
    }
}
