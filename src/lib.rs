#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate self as observer_ptr;

pub mod observer;
pub mod pointer;
#[doc(hidden)]
pub mod probe;
pub mod upcast;

pub use observer::Observer;
#[cfg(feature = "derive")]
pub use observer_ptr_macro::{upcast, Address, Arrow};
pub use pointer::{Address, Arrow, Pointer};
pub use upcast::Supertype;

#[allow(dead_code)]
mod fails {
    macro_rules! fail {
        ($function: ident, $block: block) => {
            #[doc = concat!("```compile_fail\n", stringify!($block), "\n```")]
            const fn $function() {}
        };
    }

    fail!(can_not_observe_a_value_without_pointer_surface, {
        use observer_ptr::Observer;

        let value = 1u8;
        let _: Observer<u8> = Observer::from(&value);
    });

    fail!(can_not_observe_through_a_container, {
        use observer_ptr::Observer;

        let text = String::from("text");
        let _: Observer<str> = Observer::of(&text);
    });

    fail!(can_not_observe_with_address_and_arrow_only, {
        use observer_ptr::{Address, Arrow, Observer};

        struct Handle(*const u8);
        impl Address<u8> for Handle {
            fn address(&self) -> *const u8 {
                self.0
            }
        }
        impl Arrow<u8> for Handle {
            fn arrow(&self) -> *const u8 {
                self.0
            }
        }

        let _: Observer<u8> = Observer::of(&Handle(core::ptr::null()));
    });

    fail!(can_not_observe_with_mismatched_pointee, {
        use core::ops::Deref;
        use observer_ptr::{Address, Arrow, Observer};

        struct Handle(u8, u16);
        impl Address<u16> for Handle {
            fn address(&self) -> *const u16 {
                &self.1
            }
        }
        impl Arrow<u16> for Handle {
            fn arrow(&self) -> *const u16 {
                &self.1
            }
        }
        impl Deref for Handle {
            type Target = u8;
            fn deref(&self) -> &u8 {
                &self.0
            }
        }

        let _: Observer<u8> = Observer::of(&Handle(1, 2));
    });

    fail!(can_not_convert_to_an_unrelated_pointee, {
        use observer_ptr::Observer;
        use std::rc::Rc;

        let shared = Rc::new(1u8);
        let _: Observer<u16> = Observer::from(&shared);
    });

    fail!(can_not_upcast_to_an_unimplemented_trait, {
        use core::fmt::Display;
        use observer_ptr::Observer;

        struct Opaque;
        let _ = Observer::new(&Opaque).upcast::<dyn Display>();
    });

    fail!(can_not_upcast_by_adding_markers, {
        use core::fmt::Debug;
        use observer_ptr::Observer;

        let observer = Observer::<dyn Debug>::null();
        let _ = observer.upcast::<dyn Debug + Send>();
    });

    fail!(can_not_implicitly_convert_to_raw_pointer, {
        use observer_ptr::Observer;

        let value = 1u8;
        let pointer: *const u8 = Observer::new(&value);
    });

    fail!(can_not_send_observer_of_unsync_to_thread, {
        use core::cell::Cell;
        use observer_ptr::Observer;
        use std::thread::spawn;

        let cell = Cell::new(1u8);
        let observer = Observer::new(&cell);
        spawn(move || observer.is_null());
    });

    fail!(can_not_observe_a_pinned_custom_pointer, {
        use core::{ops::Deref, pin::Pin};
        use observer_ptr::{Address, Arrow, Observer};

        struct Nullable(Option<Box<u8>>);
        impl Address<u8> for Nullable {
            fn address(&self) -> *const u8 {
                self.0.as_deref().map_or(core::ptr::null(), |value| value as *const u8)
            }
        }
        impl Arrow<u8> for Nullable {
            fn arrow(&self) -> *const u8 {
                self.address()
            }
        }
        impl Deref for Nullable {
            type Target = u8;
            fn deref(&self) -> &u8 {
                self.0.as_deref().unwrap()
            }
        }

        let pinned = unsafe { Pin::new_unchecked(Nullable(None)) };
        let _ = Observer::<u8>::from(&pinned);
    });

    fail!(can_not_implement_pointer_manually, {
        use core::ops::Deref;
        use observer_ptr::Pointer;

        struct Handle(u8);
        impl Deref for Handle {
            type Target = u8;
            fn deref(&self) -> &u8 {
                &self.0
            }
        }
        impl Pointer for Handle {}
    });
}
